//! Action handlers
//!
//! The dispatcher reaches every side effect through one of these traits, so
//! a session can run against real services or scripted fakes. Each method
//! blocks the worker thread; none of them touch the UI.

pub mod fun;
pub mod gemini;
pub mod news;
pub mod system;
pub mod wikipedia;

use crate::config::AssistantConfig;
use crate::Result;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use fun::{BuiltinJokes, SystemClock};
pub use gemini::GeminiClient;
pub use news::NewsApiClient;
pub use system::{KeyboardVolume, ProcessLauncher, SystemBrowser};
pub use wikipedia::WikipediaClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeAction {
    Up,
    Down,
    Mute,
    Unmute,
}

impl VolumeAction {
    pub fn announcement(&self) -> &'static str {
        match self {
            VolumeAction::Up => "Turning up the volume.",
            VolumeAction::Down => "Turning down the volume.",
            VolumeAction::Mute => "Muting the system.",
            VolumeAction::Unmute => "Unmuting the system.",
        }
    }

    /// Media key presses the action takes
    pub fn key_presses(&self) -> usize {
        match self {
            VolumeAction::Up | VolumeAction::Down => 5,
            VolumeAction::Mute | VolumeAction::Unmute => 1,
        }
    }
}

pub trait VolumeControl: Send {
    fn apply(&mut self, action: VolumeAction) -> Result<()>;
}

/// Web browser with an optional long-lived search session
pub trait Browser: Send {
    fn open_url(&mut self, url: &str) -> Result<()>;

    fn has_session(&self) -> bool;

    fn start_session(&mut self) -> Result<()>;

    fn search(&mut self, query: &str) -> Result<()>;

    fn close_session(&mut self) -> Result<()>;
}

pub trait NewsSource: Send {
    fn is_configured(&self) -> bool;

    fn top_headlines(&mut self, limit: usize) -> Result<Vec<String>>;
}

pub trait Encyclopedia: Send {
    /// First `sentences` sentences about `topic`, or `None` if nothing matches
    fn summary(&mut self, topic: &str, sentences: usize) -> Result<Option<String>>;
}

pub trait ChatModel: Send {
    fn is_configured(&self) -> bool;

    fn reply(&mut self, prompt: &str) -> Result<String>;
}

pub trait AppLauncher: Send {
    fn launch(&mut self, path: &Path) -> Result<()>;
}

pub trait JokeSource: Send {
    fn joke(&mut self) -> String;
}

pub trait Clock: Send {
    fn now(&self) -> NaiveDateTime;
}

/// Everything the dispatcher can act through
pub struct Handlers {
    pub volume: Box<dyn VolumeControl>,
    pub browser: Box<dyn Browser>,
    pub news: Box<dyn NewsSource>,
    pub encyclopedia: Box<dyn Encyclopedia>,
    pub chat: Box<dyn ChatModel>,
    pub launcher: Box<dyn AppLauncher>,
    pub jokes: Box<dyn JokeSource>,
    pub clock: Box<dyn Clock>,
    /// Lower-cased application name -> executable
    pub software_paths: BTreeMap<String, PathBuf>,
}

impl Handlers {
    /// Real adapters configured from `config`
    pub fn from_config(config: &AssistantConfig) -> Self {
        let services = &config.services;
        let client = http_client(services.request_timeout());

        Self {
            volume: Box::new(KeyboardVolume::new()),
            browser: Box::new(SystemBrowser::new()),
            news: Box::new(NewsApiClient::new(client.clone(), services)),
            encyclopedia: Box::new(WikipediaClient::new(client.clone(), services)),
            chat: Box::new(GeminiClient::new(client, services)),
            launcher: Box::new(ProcessLauncher::new()),
            jokes: Box::new(BuiltinJokes::new()),
            clock: Box::new(SystemClock),
            software_paths: config
                .software_paths
                .iter()
                .map(|(name, path)| (name.to_lowercase(), path.clone()))
                .collect(),
        }
    }

    pub fn software_path(&self, name: &str) -> Option<&PathBuf> {
        self.software_paths.get(&name.trim().to_lowercase())
    }
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}
