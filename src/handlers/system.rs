//! Desktop side effects: media keys, browser, process launch

use super::{AppLauncher, Browser, VolumeAction, VolumeControl};
use crate::{JarvisError, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Volume through the keyboard's media keys
#[derive(Debug, Default)]
pub struct KeyboardVolume;

impl KeyboardVolume {
    pub fn new() -> Self {
        Self
    }

    fn key_for(action: VolumeAction) -> Key {
        match action {
            VolumeAction::Up => Key::VolumeUp,
            VolumeAction::Down => Key::VolumeDown,
            // Mute is a toggle
            VolumeAction::Mute | VolumeAction::Unmute => Key::VolumeMute,
        }
    }
}

impl VolumeControl for KeyboardVolume {
    fn apply(&mut self, action: VolumeAction) -> Result<()> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| JarvisError::HandlerError(format!("Failed to create Enigo: {:?}", e)))?;
        let key = Self::key_for(action);
        for _ in 0..action.key_presses() {
            enigo
                .key(key, Direction::Click)
                .map_err(|e| JarvisError::HandlerError(format!("{:?}", e)))?;
        }
        debug!("Volume {:?}: {} key press(es)", action, action.key_presses());
        Ok(())
    }
}

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Build the search URL for `query`
pub fn google_search_url(query: &str) -> Result<String> {
    reqwest::Url::parse_with_params(GOOGLE_SEARCH_URL, &[("q", query)])
        .map(|url| url.to_string())
        .map_err(|e| JarvisError::HandlerError(format!("Invalid search URL: {}", e)))
}

/// The desktop's default browser.
///
/// There is no driver to hold, so the session is a flag that controls the
/// "opening" and "closing" announcements.
#[derive(Debug, Default)]
pub struct SystemBrowser {
    session: bool,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Browser for SystemBrowser {
    fn open_url(&mut self, url: &str) -> Result<()> {
        webbrowser::open(url)
            .map_err(|e| JarvisError::HandlerError(format!("Failed to open {}: {}", url, e)))?;
        info!("Opened {}", url);
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
        let url = google_search_url(query)?;
        self.open_url(&url)
    }

    fn close_session(&mut self) -> Result<()> {
        self.session = false;
        Ok(())
    }
}

/// Starts applications as detached child processes
///
/// Each child gets a reaper thread that waits on it, so exited applications
/// never linger as zombies.
#[derive(Debug, Default)]
pub struct ProcessLauncher {
    running: Arc<AtomicUsize>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launched children that have not exited yet
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    fn reap(&self, mut child: Child, name: String) {
        let running = Arc::clone(&self.running);
        running.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("jarvis-reaper".into())
            .spawn(move || {
                match child.wait() {
                    Ok(status) => debug!("{} exited with {}", name, status),
                    Err(e) => warn!("Failed to wait on {}: {}", name, e),
                }
                running.fetch_sub(1, Ordering::SeqCst);
            });
        if let Err(e) = spawned {
            self.running.fetch_sub(1, Ordering::SeqCst);
            warn!("Could not start reaper thread: {}", e);
        }
    }
}

impl AppLauncher for ProcessLauncher {
    fn launch(&mut self, path: &Path) -> Result<()> {
        let child = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| JarvisError::LaunchError(format!("{}: {}", path.display(), e)))?;
        info!("Launched {} (pid {})", path.display(), child.id());
        self.reap(child, path.display().to_string());
        Ok(())
    }
}
