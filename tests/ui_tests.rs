//! UI automation tests using egui_kittest and AccessKit
//!
//! Components are rendered in a harness and found through the labels they
//! publish to the accessibility tree.

use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use jarvis::config::AssistantConfig;
use jarvis::session::{SessionController, SessionFactory, SessionParts};
use jarvis::ui::components::{Controls, ControlsAction, LogView, StatusLight, STOP_LABEL};
use jarvis::ui::{
    ControlsState, IndicatorCommand, JarvisApp, StatusIndicator, SurfaceState, Theme,
};
use jarvis::utils::{ui_channel, UiEvent};
use jarvis::{JarvisError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct ControlsApp {
    state: ControlsState,
    theme: Theme,
    clicked: Vec<ControlsAction>,
}

impl ControlsApp {
    fn new(state: ControlsState) -> Self {
        Self {
            state,
            theme: Theme::dark(),
            clicked: Vec::new(),
        }
    }
}

fn controls_harness(state: ControlsState) -> Harness<'static, ControlsApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(500.0, 120.0))
        .build_state(
            |ctx, app: &mut ControlsApp| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if let Some(action) = Controls::new(app.state, &app.theme).show(ui) {
                        app.clicked.push(action);
                    }
                });
            },
            ControlsApp::new(state),
        )
}

#[test]
fn test_idle_controls_labels() {
    let mut harness = controls_harness(ControlsState::Idle);
    harness.run();

    let _start = harness.get_by_label("Start Listening");
    let _stop = harness.get_by_label(STOP_LABEL);
}

#[test]
fn test_running_controls_show_initializing() {
    let mut harness = controls_harness(ControlsState::Running);
    harness.run();

    let _start = harness.get_by_label("Initializing...");
    assert!(harness.query_by_label("Start Listening").is_none());
}

#[test]
fn test_click_start_reports_action() {
    let mut harness = controls_harness(ControlsState::Idle);
    harness.run();

    harness.get_by_label("Start Listening").click();
    harness.run();

    assert_eq!(harness.state().clicked, vec![ControlsAction::Start]);
}

#[test]
fn test_disabled_stop_ignores_click() {
    let mut harness = controls_harness(ControlsState::Idle);
    harness.run();

    harness.get_by_label(STOP_LABEL).click();
    harness.run();

    assert!(harness.state().clicked.is_empty());
}

#[test]
fn test_click_stop_while_running() {
    let mut harness = controls_harness(ControlsState::Running);
    harness.run();

    harness.get_by_label(STOP_LABEL).click();
    harness.run();

    assert_eq!(harness.state().clicked, vec![ControlsAction::Stop]);
}

struct LightApp {
    indicator: StatusIndicator,
    theme: Theme,
}

#[test]
fn test_status_light_follows_phase() {
    let app = LightApp {
        indicator: StatusIndicator::new(),
        theme: Theme::dark(),
    };
    let mut harness = Harness::builder()
        .with_size(egui::Vec2::new(200.0, 100.0))
        .build_state(
            |ctx, app: &mut LightApp| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    StatusLight::new(&app.indicator, &app.theme).show(ui);
                });
            },
            app,
        );
    harness.run();
    let _off = harness.get_by_label("Status: off");

    harness
        .state_mut()
        .indicator
        .apply(IndicatorCommand::Listening, Instant::now());
    harness.run();
    let _listening = harness.get_by_label("Status: listening");
}

struct LogApp {
    lines: VecDeque<String>,
    theme: Theme,
}

fn log_harness(lines: &[&str]) -> Harness<'static, LogApp> {
    let app = LogApp {
        lines: lines.iter().map(|l| l.to_string()).collect(),
        theme: Theme::dark(),
    };
    Harness::builder()
        .with_size(egui::Vec2::new(600.0, 400.0))
        .build_state(
            |ctx, app: &mut LogApp| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    LogView::new(&app.lines, &app.theme).show(ui);
                });
            },
            app,
        )
}

#[test]
fn test_log_lines_rendered() {
    let mut harness = log_harness(&["Listening on device 0...", "You said: what time is it"]);
    harness.run();

    let _first = harness.get_by_label("Log: Listening on device 0...");
    let _second = harness.get_by_label("Log: You said: what time is it");
}

#[test]
fn test_empty_log_shows_hint() {
    let mut harness = log_harness(&[]);
    harness.run();

    let _hint = harness.get_by_label("Press Start Listening to begin.");
}

/// Fails every build so a start returns straight to idle
struct NoModelFactory;

impl SessionFactory for NoModelFactory {
    fn build(&self, _config: &AssistantConfig) -> Result<SessionParts> {
        Err(JarvisError::ConfigError("no model".into()))
    }
}

fn app_harness() -> Harness<'static, JarvisApp> {
    let (ui, events) = ui_channel();
    let controller = Arc::new(SessionController::new(
        Arc::new(AssistantConfig::default().without_speech()),
        Arc::new(NoModelFactory),
        None,
        ui,
    ));
    let app = JarvisApp::with_theme(controller, events, Theme::dark());
    Harness::builder()
        .with_size(egui::Vec2::new(900.0, 700.0))
        .build_state(|ctx, app: &mut JarvisApp| app.frame(ctx), app)
}

fn frames_until(
    harness: &mut Harness<'static, JarvisApp>,
    done: impl Fn(&SurfaceState) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        harness.run();
        if done(harness.state().surface()) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_window_starts_idle() {
    let mut harness = app_harness();
    harness.run();

    let _title = harness.get_by_label("AI Voice Assistant");
    let _start = harness.get_by_label("Start Listening");
    let _light = harness.get_by_label("Status: off");
    assert!(!harness.state().controller().is_running());
}

#[test]
fn test_start_failure_is_logged_and_returns_to_idle() {
    let mut harness = app_harness();
    harness.run();

    harness.get_by_label("Start Listening").click();
    assert!(frames_until(&mut harness, |surface| surface.sessions_ended == 1));

    let surface = harness.state().surface();
    assert_eq!(surface.controls, ControlsState::Idle);
    assert!(surface
        .log
        .contains(&"Failed to start Jarvis: Configuration error: no model".to_string()));

    harness.run();
    let _line = harness.get_by_label("Log: Failed to start Jarvis: Configuration error: no model");
    let _start = harness.get_by_label("Start Listening");
}

#[test]
fn test_events_reach_the_surface() {
    let (ui, events) = ui_channel();
    let controller = Arc::new(SessionController::new(
        Arc::new(AssistantConfig::default().without_speech()),
        Arc::new(NoModelFactory),
        None,
        ui.clone(),
    ));
    let app = JarvisApp::with_theme(controller, events, Theme::dark());
    let mut harness = Harness::builder()
        .with_size(egui::Vec2::new(900.0, 700.0))
        .build_state(|ctx, app: &mut JarvisApp| app.frame(ctx), app);

    ui.controls(ControlsState::Running);
    ui.indicator(IndicatorCommand::Listening);
    ui.send(UiEvent::Log("Listening on device 0...".into()));
    harness.run();

    let _initializing = harness.get_by_label("Initializing...");
    let _light = harness.get_by_label("Status: listening");
    let _line = harness.get_by_label("Log: Listening on device 0...");
}
