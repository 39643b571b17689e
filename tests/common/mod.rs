//! Scripted collaborators for driving a whole session without hardware

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use crossbeam_channel::Receiver;
use jarvis::audio::{AudioSource, Microphone};
use jarvis::config::AssistantConfig;
use jarvis::handlers::{
    AppLauncher, Browser, ChatModel, Clock, Encyclopedia, Handlers, JokeSource, NewsSource,
    VolumeAction, VolumeControl,
};
use jarvis::session::{SessionController, SessionFactory, SessionParts};
use jarvis::speech::{Playback, Synthesizer, Transcriber, VoiceProfile};
use jarvis::utils::{ui_channel, CancelToken, UiEvent};
use jarvis::{CaptureFailure, JarvisError, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const RATE: u32 = 16000;
const BLOCK: usize = (RATE / 10) as usize;

/// What the next microphone open produces
#[derive(Clone, Debug)]
pub enum Take {
    /// A phrase the transcriber will return as this text
    Say(&'static str),
    /// A phrase whose recognition fails with a network error
    Unreachable(&'static str),
    DeviceError,
}

/// Constant-amplitude blocks followed by endless silence
struct ToneSource {
    blocks: VecDeque<Vec<f32>>,
}

impl ToneSource {
    fn new(segments: &[(f32, f32)]) -> Self {
        let mut blocks = VecDeque::new();
        for &(secs, amp) in segments {
            for i in 0..(secs * 10.0).round() as usize {
                let value = if i % 2 == 0 { amp } else { -amp };
                blocks.push_back(vec![value; BLOCK]);
            }
        }
        Self { blocks }
    }

    fn phrase() -> Self {
        Self::new(&[(1.0, 0.0), (0.5, 0.3)])
    }

    fn silence() -> Self {
        Self::new(&[])
    }
}

impl AudioSource for ToneSource {
    fn sample_rate(&self) -> u32 {
        RATE
    }

    fn next_chunk(&mut self, _timeout: Duration) -> std::result::Result<Option<Vec<f32>>, CaptureFailure> {
        Ok(Some(self.blocks.pop_front().unwrap_or_else(|| vec![0.0; BLOCK])))
    }
}

enum Heard {
    Text(String),
    Unreachable(String),
}

pub struct ScriptedMic {
    script: Mutex<VecDeque<Take>>,
    heard: Arc<Mutex<VecDeque<Heard>>>,
    pub opens: Mutex<usize>,
}

impl Microphone for ScriptedMic {
    fn open(&self, device_index: usize) -> std::result::Result<Box<dyn AudioSource>, CaptureFailure> {
        *self.opens.lock() += 1;
        match self.script.lock().pop_front() {
            Some(Take::Say(text)) => {
                self.heard.lock().push_back(Heard::Text(text.to_string()));
                Ok(Box::new(ToneSource::phrase()))
            }
            Some(Take::Unreachable(detail)) => {
                self.heard
                    .lock()
                    .push_back(Heard::Unreachable(detail.to_string()));
                Ok(Box::new(ToneSource::phrase()))
            }
            Some(Take::DeviceError) => Err(CaptureFailure::DeviceError(format!(
                "Microphone index {} is incorrect",
                device_index
            ))),
            None => {
                // Script exhausted: idle in short timeouts
                thread::sleep(Duration::from_millis(20));
                Ok(Box::new(ToneSource::silence()))
            }
        }
    }
}

pub struct ScriptedTranscriber {
    heard: Arc<Mutex<VecDeque<Heard>>>,
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> Result<String> {
        match self.heard.lock().pop_front() {
            Some(Heard::Text(text)) => Ok(text),
            Some(Heard::Unreachable(detail)) => Err(JarvisError::NetworkError(detail)),
            None => Ok(String::new()),
        }
    }
}

/// Plays every utterance for a fixed time, honouring cancel
pub struct TimedSynth {
    duration: Duration,
    pub started: Mutex<Vec<(String, VoiceProfile)>>,
    pub completed: Mutex<Vec<String>>,
}

impl TimedSynth {
    pub fn new(duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            duration,
            started: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        })
    }
}

impl Synthesizer for TimedSynth {
    fn id(&self) -> &str {
        "timed"
    }

    fn speak(&self, text: &str, profile: VoiceProfile, cancel: &CancelToken) -> Result<Playback> {
        self.started.lock().push((text.to_string(), profile));
        let start = Instant::now();
        while start.elapsed() < self.duration {
            if cancel.is_cancelled() {
                return Ok(Playback::Interrupted);
            }
            thread::sleep(Duration::from_millis(2));
        }
        self.completed.lock().push(text.to_string());
        Ok(Playback::Completed)
    }
}

pub type Journal = Arc<Mutex<Vec<String>>>;

struct Recorder(Journal);

impl Recorder {
    fn note(&self, entry: String) {
        self.0.lock().push(entry);
    }
}

impl VolumeControl for Recorder {
    fn apply(&mut self, action: VolumeAction) -> Result<()> {
        self.note(format!("volume {:?}", action));
        Ok(())
    }
}

struct RecordingBrowser {
    journal: Journal,
    session: bool,
}

impl Browser for RecordingBrowser {
    fn open_url(&mut self, url: &str) -> Result<()> {
        self.journal.lock().push(format!("open {}", url));
        Ok(())
    }

    fn has_session(&self) -> bool {
        self.session
    }

    fn start_session(&mut self) -> Result<()> {
        self.session = true;
        Ok(())
    }

    fn search(&mut self, query: &str) -> Result<()> {
        self.journal.lock().push(format!("search {}", query));
        Ok(())
    }

    fn close_session(&mut self) -> Result<()> {
        self.session = false;
        self.journal.lock().push("browser closed".into());
        Ok(())
    }
}

impl NewsSource for Recorder {
    fn is_configured(&self) -> bool {
        false
    }

    fn top_headlines(&mut self, _limit: usize) -> Result<Vec<String>> {
        self.note("news".into());
        Ok(Vec::new())
    }
}

impl Encyclopedia for Recorder {
    fn summary(&mut self, topic: &str, _sentences: usize) -> Result<Option<String>> {
        self.note(format!("wiki {}", topic));
        Ok(None)
    }
}

impl ChatModel for Recorder {
    fn is_configured(&self) -> bool {
        true
    }

    fn reply(&mut self, prompt: &str) -> Result<String> {
        self.note(format!("chat {}", prompt));
        Ok("Happy to help.".into())
    }
}

impl AppLauncher for Recorder {
    fn launch(&mut self, path: &Path) -> Result<()> {
        self.note(format!("launch {}", path.display()));
        Ok(())
    }
}

impl JokeSource for Recorder {
    fn joke(&mut self) -> String {
        self.note("joke".into());
        "Why did the robot cross the road?".into()
    }
}

/// Always 15:07 on 2024-03-01
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(15, 7, 0))
            .unwrap_or_default()
    }
}

pub const GREETING: &str = "Good Afternoon sir! I am Jarvis. How can I assist you today?";

pub struct ScriptedFactory {
    script: Mutex<Option<Vec<Take>>>,
    pub journal: Journal,
    pub mic: Mutex<Option<Arc<ScriptedMic>>>,
}

impl ScriptedFactory {
    pub fn new(script: Vec<Take>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Some(script)),
            journal: Arc::default(),
            mic: Mutex::new(None),
        })
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

impl SessionFactory for ScriptedFactory {
    fn build(&self, config: &AssistantConfig) -> Result<SessionParts> {
        let script = self.script.lock().take().unwrap_or_default();
        let heard = Arc::new(Mutex::new(VecDeque::new()));
        let mic = Arc::new(ScriptedMic {
            script: Mutex::new(script.into()),
            heard: Arc::clone(&heard),
            opens: Mutex::new(0),
        });
        *self.mic.lock() = Some(Arc::clone(&mic));

        let recorder = || Box::new(Recorder(Arc::clone(&self.journal)));
        let software_paths: BTreeMap<String, PathBuf> = config.software_paths.clone();
        Ok(SessionParts {
            microphone: mic,
            transcriber: Arc::new(ScriptedTranscriber { heard }),
            handlers: Handlers {
                volume: recorder(),
                browser: Box::new(RecordingBrowser {
                    journal: Arc::clone(&self.journal),
                    session: false,
                }),
                news: recorder(),
                encyclopedia: recorder(),
                chat: recorder(),
                launcher: recorder(),
                jokes: recorder(),
                clock: Box::new(FixedClock),
                software_paths,
            },
        })
    }
}

pub fn test_config() -> AssistantConfig {
    let mut config = AssistantConfig::default();
    config.software_paths.clear();
    config.speech.stop_timeout_ms = 200;
    config
}

pub struct Rig {
    pub controller: SessionController,
    pub factory: Arc<ScriptedFactory>,
    pub synth: Arc<TimedSynth>,
    pub events: Receiver<UiEvent>,
}

impl Rig {
    pub fn new(config: AssistantConfig, script: Vec<Take>) -> Self {
        Self::with_voice(config, script, Duration::from_millis(20))
    }

    /// Like [`Rig::new`] with every utterance lasting `duration`
    pub fn with_voice(config: AssistantConfig, script: Vec<Take>, duration: Duration) -> Self {
        let factory = ScriptedFactory::new(script);
        let synth = TimedSynth::new(duration);
        let (ui, events) = ui_channel();
        let controller = SessionController::new(
            Arc::new(config),
            Arc::clone(&factory) as Arc<dyn SessionFactory>,
            Some(Arc::clone(&synth) as Arc<dyn Synthesizer>),
            ui,
        );
        Self {
            controller,
            factory,
            synth,
            events,
        }
    }

    /// Collect events until the session ends or `timeout` passes
    pub fn run_to_end(&self, timeout: Duration) -> Vec<UiEvent> {
        collect_until(&self.events, timeout, |e| *e == UiEvent::SessionEnded)
    }

    pub fn mic_opens(&self) -> usize {
        self.factory
            .mic
            .lock()
            .as_ref()
            .map_or(0, |mic| *mic.opens.lock())
    }
}

pub fn collect_until(
    events: &Receiver<UiEvent>,
    timeout: Duration,
    done: impl Fn(&UiEvent) -> bool,
) -> Vec<UiEvent> {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(left) {
            Ok(event) => {
                let finished = done(&event);
                seen.push(event);
                if finished {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    seen
}

pub fn logs(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Log(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

pub fn wait_for(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
