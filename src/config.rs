//! Assistant configuration
//!
//! Built once at startup from an optional TOML file, then environment
//! overrides (`.env` is loaded by the binary). The resulting value is passed
//! into the session by `Arc`; nothing reads configuration from globals.

use crate::audio::{CaptureSettings, ListenSettings};
use crate::speech::VoiceBaseline;
use crate::{JarvisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrophoneConfig {
    /// Input device index as listed by `--list-devices`
    pub device_index: usize,
    pub timeout_secs: f32,
    pub phrase_limit_secs: f32,
    pub calibration_secs: f32,
    pub pause_threshold_secs: f32,
    /// Starting RMS threshold for speech onset
    pub energy_threshold: f32,
    pub dynamic_energy: bool,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            timeout_secs: 5.0,
            phrase_limit_secs: 10.0,
            calibration_secs: 1.0,
            pause_threshold_secs: 1.0,
            energy_threshold: 0.01,
            dynamic_energy: true,
        }
    }
}

impl MicrophoneConfig {
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            device_index: self.device_index,
            listen: ListenSettings {
                timeout: secs(self.timeout_secs),
                phrase_limit: secs(self.phrase_limit_secs),
                pause_threshold: secs(self.pause_threshold_secs),
                calibration: secs(self.calibration_secs),
                energy_threshold: self.energy_threshold,
                dynamic_energy: self.dynamic_energy,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("timeout_secs", self.timeout_secs),
            ("phrase_limit_secs", self.phrase_limit_secs),
            ("calibration_secs", self.calibration_secs),
            ("pause_threshold_secs", self.pause_threshold_secs),
            ("energy_threshold", self.energy_threshold),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(JarvisError::ConfigError(format!(
                "microphone.{} must be a finite number, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }
}

/// Longest wait any listen setting may ask for
const MAX_LISTEN_SECS: f32 = 3600.0;

fn secs(value: f32) -> Duration {
    if value.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(value.clamp(0.0, MAX_LISTEN_SECS))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Disable to run in log-only mode
    pub enabled: bool,
    pub program: String,
    pub voice: Option<String>,
    pub base_rate: i32,
    pub base_volume: f32,
    /// How long `stop` waits for playback to end
    pub stop_timeout_ms: u64,
    /// How long a reply may keep playing before the next capture cuts it
    pub reply_grace_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak-ng".to_string(),
            voice: None,
            base_rate: 180,
            base_volume: 1.0,
            stop_timeout_ms: 100,
            reply_grace_ms: 30_000,
        }
    }
}

impl SpeechConfig {
    pub fn baseline(&self) -> VoiceBaseline {
        VoiceBaseline {
            rate: self.base_rate,
            volume: self.base_volume,
        }
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn reply_grace(&self) -> Duration {
        Duration::from_millis(self.reply_grace_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    pub model_path: PathBuf,
    pub language: String,
    pub n_threads: i32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            language: "en".to_string(),
            n_threads: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub news_country: String,
    pub wikipedia_api_url: String,
    /// Name the conversational model addresses the user by
    pub user_name: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            news_api_key: None,
            news_api_url: "https://newsapi.org/v2/top-headlines".to_string(),
            news_country: "us".to_string(),
            wikipedia_api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_name: None,
            request_timeout_secs: 10,
        }
    }
}

impl ServicesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub microphone: MicrophoneConfig,
    pub speech: SpeechConfig,
    pub stt: SttConfig,
    pub services: ServicesConfig,
    /// Spoken application name -> executable
    pub software_paths: BTreeMap<String, PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            microphone: MicrophoneConfig::default(),
            speech: SpeechConfig::default(),
            stt: SttConfig::default(),
            services: ServicesConfig::default(),
            software_paths: default_software_paths(),
        }
    }
}

#[cfg(windows)]
fn default_software_paths() -> BTreeMap<String, PathBuf> {
    let code = r"C:\Users\YourUsername\AppData\Local\Programs\Microsoft VS Code\Code.exe";
    [
        ("visual studio code", code),
        ("vscode", code),
        ("notepad", r"C:\Windows\System32\notepad.exe"),
        ("chrome", r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
    .collect()
}

#[cfg(not(windows))]
fn default_software_paths() -> BTreeMap<String, PathBuf> {
    [
        ("visual studio code", "/usr/bin/code"),
        ("vscode", "/usr/bin/code"),
        ("notepad", "/usr/bin/gedit"),
        ("chrome", "/usr/bin/google-chrome"),
        ("terminal", "/usr/bin/x-terminal-emulator"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
    .collect()
}

impl AssistantConfig {
    /// `<config_dir>/jarvis/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jarvis").join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    info!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path).map_err(|e| {
            JarvisError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            JarvisError::ConfigError(msg) => {
                JarvisError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| JarvisError::ConfigError(e.to_string()))?;
        config.microphone.validate()?;
        Ok(config)
    }

    /// Apply process environment overrides
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.services.gemini_api_key = Some(key);
        }
        if let Some(key) = get("NEWS_API_KEY") {
            self.services.news_api_key = Some(key);
        }
        if let Some(url) = get("NEWS_API_URL") {
            self.services.news_api_url = url;
        }
        if let Some(index) = get("JARVIS_MIC_INDEX") {
            match index.trim().parse() {
                Ok(index) => self.microphone.device_index = index,
                Err(_) => warn!("Ignoring JARVIS_MIC_INDEX={:?}: not a number", index),
            }
        }
    }

    /// Log handlers that will run degraded
    pub fn report_missing(&self) {
        if self.services.gemini_api_key.is_none() {
            error!("GEMINI_API_KEY not found. AI chat will not work.");
        }
        if self.services.news_api_key.is_none() {
            warn!("NEWS_API_KEY not found. News functionality will be disabled.");
        }
    }

    pub fn with_device_index(mut self, index: usize) -> Self {
        self.microphone.device_index = index;
        self
    }

    pub fn with_software_path(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.software_paths
            .insert(name.into().to_lowercase(), path.into());
        self
    }

    /// Log-only speech output
    pub fn without_speech(mut self) -> Self {
        self.speech.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();
        assert_eq!(config.microphone.device_index, 0);
        assert_eq!(config.speech.base_rate, 180);
        assert_eq!(config.services.gemini_model, "gemini-1.5-flash");
        assert!(config.software_paths.contains_key("notepad"));

        let capture = config.microphone.capture_settings();
        assert_eq!(capture.listen.timeout, Duration::from_secs(5));
        assert_eq!(capture.listen.phrase_limit, Duration::from_secs(10));
    }

    #[test]
    fn test_non_finite_seconds_rejected() {
        let result = AssistantConfig::from_toml_str("[microphone]\ntimeout_secs = inf\n");
        match result {
            Err(JarvisError::ConfigError(msg)) => assert!(msg.contains("timeout_secs")),
            other => panic!("expected a config error, got {:?}", other),
        }
        assert!(AssistantConfig::from_toml_str("[microphone]\npause_threshold_secs = nan\n").is_err());
    }

    #[test]
    fn test_listen_settings_are_clamped() {
        let microphone = MicrophoneConfig {
            timeout_secs: 1.0e30,
            phrase_limit_secs: f32::INFINITY,
            calibration_secs: -2.0,
            pause_threshold_secs: f32::NAN,
            ..MicrophoneConfig::default()
        };
        let listen = microphone.capture_settings().listen;
        assert_eq!(listen.timeout, Duration::from_secs(3600));
        assert_eq!(listen.phrase_limit, Duration::from_secs(3600));
        assert_eq!(listen.calibration, Duration::ZERO);
        assert_eq!(listen.pause_threshold, Duration::ZERO);
    }

    #[test]
    fn test_partial_toml() {
        let config = AssistantConfig::from_toml_str(
            r#"
            [microphone]
            device_index = 2

            [services]
            user_name = "Sam"

            [software_paths]
            editor = "/usr/bin/vim"
            "#,
        )
        .unwrap();

        assert_eq!(config.microphone.device_index, 2);
        assert_eq!(config.microphone.timeout_secs, 5.0);
        assert_eq!(config.services.user_name.as_deref(), Some("Sam"));
        assert_eq!(
            config.software_paths.get("editor"),
            Some(&PathBuf::from("/usr/bin/vim"))
        );
        // A table in the file replaces the defaults
        assert!(!config.software_paths.contains_key("notepad"));
    }

    #[test]
    fn test_invalid_toml() {
        let result = AssistantConfig::from_toml_str("[microphone]\ndevice_index = \"two\"");
        assert!(matches!(result, Err(JarvisError::ConfigError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "g-key"),
            ("NEWS_API_KEY", ""),
            ("JARVIS_MIC_INDEX", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AssistantConfig::default();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.services.gemini_api_key.as_deref(), Some("g-key"));
        assert!(config.services.news_api_key.is_none());
        assert_eq!(config.microphone.device_index, 3);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = AssistantConfig::load(Some(Path::new("/nonexistent/jarvis.toml")));
        assert!(matches!(result, Err(JarvisError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[speech]\nenabled = false\n").unwrap();

        let config = AssistantConfig::load(Some(&path)).unwrap();
        assert!(!config.speech.enabled);
    }
}
