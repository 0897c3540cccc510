use anyhow::Result;
use async_trait::async_trait;
use busy_bot::config::Settings;
use busy_bot::controller::ConfirmRequest;
use busy_bot::{
    Answer, BotController, BotError, BotState, Command, ControlSurface, RunCounters, Runner,
    SimulatedDesktop,
};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::{sleep, sleep_until, Instant};

// Scripted control surface

#[derive(Debug, Clone, PartialEq)]
enum Event {
    State(BotState, RunCounters),
    Prompt(String),
    Error(String, String),
}

/// Replays commands at fixed offsets from its creation and answers prompts
/// from a queue.
struct ScriptedSurface {
    start: Instant,
    commands: VecDeque<(Duration, Command)>,
    answers: VecDeque<(Duration, Answer)>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl ScriptedSurface {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            commands: VecDeque::new(),
            answers: VecDeque::new(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn command_at(mut self, offset_ms: u64, command: Command) -> Self {
        self.commands.push_back((Duration::from_millis(offset_ms), command));
        self
    }

    fn answer(mut self, after_ms: u64, answer: Answer) -> Self {
        self.answers.push_back((Duration::from_millis(after_ms), answer));
        self
    }

    fn events(&self) -> Arc<Mutex<Vec<Event>>> {
        self.events.clone()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ControlSurface for ScriptedSurface {
    async fn next_command(&mut self) -> Option<Command> {
        let (offset, command) = *self.commands.front()?;
        sleep_until(self.start + offset).await;
        self.commands.pop_front();
        Some(command)
    }

    async fn confirm(&mut self, request: &ConfirmRequest) -> Answer {
        self.record(Event::Prompt(request.question.to_string()));
        let (delay, answer) = self
            .answers
            .pop_front()
            .unwrap_or((Duration::ZERO, Answer::Cancel));
        sleep(delay).await;
        answer
    }

    fn show_state(&mut self, state: BotState, counters: RunCounters) {
        self.record(Event::State(state, counters));
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.record(Event::Error(title.to_string(), message.to_string()));
    }
}

fn calc_bot(desktop: &SimulatedDesktop) -> BotController<SimulatedDesktop> {
    BotController::new(Settings::new("00:00:01", "Calc", "hi", 3), desktop.clone()).unwrap()
}

fn prompts(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Prompt(question) => Some(question.clone()),
            _ => None,
        })
        .collect()
}

// Dispatcher tests

#[tokio::test(start_paused = true)]
async fn test_first_block_is_typed() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(3_500, Command::Quit);
    let events = surface.events();

    let summary = Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(
        desktop.transcript(),
        "1 - hi{TAB}1 - hi{TAB}1 - hi{HOME}{ENTER}"
    );
    assert_eq!(summary.state, BotState::Running);
    assert_eq!(summary.counters, RunCounters { line: 0, execution: 2 });
    assert_eq!(summary.lines_typed, 3);

    let events = events.lock().unwrap();
    assert_eq!(events[0], Event::State(BotState::Stopped, RunCounters::default()));
    assert_eq!(prompts(&events), vec!["Do you wish to start?"]);
    assert!(events.contains(&Event::State(BotState::Running, RunCounters::default())));
}

#[tokio::test(start_paused = true)]
async fn test_nothing_is_typed_without_confirmation() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Cancel)
        .command_at(100, Command::Toggle)
        .answer(0, Answer::No)
        .command_at(5_000, Command::Quit);

    let summary = Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(summary.state, BotState::Stopped);
    assert_eq!(summary.lines_typed, 0);
    assert!(desktop.sent().is_empty());
    assert_eq!(desktop.activations(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_held_while_confirming() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        // Ticks at 1s and 2s, then the stop prompt stays open for 10s.
        .command_at(2_500, Command::Toggle)
        .answer(10_000, Answer::No)
        // Resumed at 12.5s, next tick a full interval later at 13.5s.
        .command_at(14_000, Command::Quit);
    let events = surface.events();

    let summary = Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(summary.state, BotState::Running);
    assert_eq!(summary.lines_typed, 3);
    assert_eq!(
        prompts(&events.lock().unwrap()),
        vec!["Do you wish to start?", "Do you wish to halt?"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_ticks() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(2_500, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(10_000, Command::Quit);
    let events = surface.events();

    let summary = Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(summary.state, BotState::Stopped);
    assert_eq!(summary.lines_typed, 2);
    assert_eq!(summary.counters, RunCounters { line: 2, execution: 1 });
    assert_eq!(desktop.transcript(), "1 - hi{TAB}1 - hi{TAB}");
    assert!(events
        .lock()
        .unwrap()
        .contains(&Event::State(BotState::Stopped, RunCounters { line: 2, execution: 1 })));
}

#[tokio::test(start_paused = true)]
async fn test_vanished_window_faults_the_run() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let closer = desktop.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(2_500)).await;
        closer.close_window("Calc");
    });

    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(5_500, Command::Toggle)
        .command_at(10_000, Command::Quit);
    let events = surface.events();

    let summary = Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(summary.state, BotState::Faulted);
    assert_eq!(summary.lines_typed, 2);
    assert_eq!(desktop.transcript(), "1 - hi{TAB}1 - hi{TAB}");
    // One lookup at startup and one per tick; none after the fault.
    assert_eq!(desktop.lookups(), 4);

    let events = events.lock().unwrap();
    assert!(events.contains(&Event::State(
        BotState::Faulted,
        RunCounters { line: 2, execution: 1 }
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Error(title, message)
            if title == "Configuration Error" && message.contains("class Calc")
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::Error(title, _) if title == "Control Disabled")));
    // The toggle after the fault never prompts.
    assert_eq!(prompts(&events), vec!["Do you wish to start?"]);
}

#[tokio::test(start_paused = true)]
async fn test_injection_failure_ends_the_run() {
    let desktop = SimulatedDesktop::with_window("Calc");
    desktop.refuse_input(true);
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(5_000, Command::Quit);

    let result = Runner::new(calc_bot(&desktop), surface).run().await;
    assert!(matches!(result, Err(BotError::KeySendFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_closed_input_ends_the_run() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let summary = Runner::new(calc_bot(&desktop), ScriptedSurface::new())
        .run()
        .await
        .unwrap();
    assert_eq!(summary.state, BotState::Stopped);
    assert_eq!(summary.lines_typed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_counters() {
    let desktop = SimulatedDesktop::with_window("Calc");
    let surface = ScriptedSurface::new()
        .command_at(0, Command::Toggle)
        .answer(0, Answer::Yes)
        .command_at(1_500, Command::Status)
        .command_at(1_600, Command::Quit);
    let events = surface.events();

    Runner::new(calc_bot(&desktop), surface).run().await.unwrap();

    assert_eq!(
        events.lock().unwrap().last(),
        Some(&Event::State(BotState::Running, RunCounters { line: 1, execution: 1 }))
    );
}

// Settings file tests

#[test]
fn test_settings_file_operations() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    let json_content = r#"
    {
        "Interval": "00:00:01",
        "FindClass": "Calc",
        "Message": "hi",
        "LinesToWrite": 3,
        "Logging": { "Level": "Debug" }
    }
    "#;
    temp_file.write_all(json_content.as_bytes())?;

    let settings = Settings::from_file(temp_file.path())?;

    assert_eq!(settings, Settings::new("00:00:01", "Calc", "hi", 3));
    assert_eq!(settings.parsed_interval()?, Duration::from_secs(1));
    Ok(())
}

#[test]
fn test_partial_settings_file_uses_defaults() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(br#"{ "FindClass": "Calc", "LinesToWrite": "lots" }"#)?;

    let settings = Settings::from_file(temp_file.path())?;

    assert_eq!(settings.find_class, "Calc");
    assert_eq!(settings.interval, "00:00:10");
    assert_eq!(settings.message, "None");
    assert_eq!(settings.lines_to_write.get(), 10);
    Ok(())
}

#[test]
fn test_unreadable_settings_file() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let missing = temp_dir.path().join("appsettings.json");
    assert!(matches!(
        Settings::from_file(&missing),
        Err(BotError::ConfigLoad { .. })
    ));

    let mut not_json = NamedTempFile::new()?;
    not_json.write_all(b"Interval=00:00:10")?;
    assert!(matches!(
        Settings::from_file(not_json.path()),
        Err(BotError::ConfigLoad { .. })
    ));

    let mut not_object = NamedTempFile::new()?;
    not_object.write_all(b"[1, 2, 3]")?;
    assert!(matches!(
        Settings::from_file(not_object.path()),
        Err(BotError::ConfigLoad { .. })
    ));
    Ok(())
}

#[test]
fn test_settings_save_load_roundtrip() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("appsettings.json");

    let original = Settings::new("01:00:00", "Notepad++", "still here", 7);
    original.save_to_file(&config_path)?;
    let loaded = Settings::from_file(&config_path)?;

    assert_eq!(loaded, original);
    Ok(())
}

// Startup validation

#[test]
fn test_startup_validation_scenarios() {
    let desktop = SimulatedDesktop::with_window("Notepad");

    let err = BotController::new(Settings::new("00:00:01", "Calc", "hi", 3), desktop.clone())
        .err()
        .unwrap();
    assert!(err.is_startup_validation());
    assert!(err.to_string().contains("Calc"));

    let err = BotController::new(Settings::new("bogus", "Notepad", "hi", 3), desktop.clone())
        .err()
        .unwrap();
    assert!(err.is_startup_validation());
    assert!(err.to_string().contains("bogus"));

    assert_eq!(desktop.activations(), 0);
    assert!(desktop.sent().is_empty());
}
