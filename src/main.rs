use anyhow::{Context, Result};
use clap::Parser;
use jarvis::config::AssistantConfig;
use jarvis::session::{SessionController, SystemFactory};
use jarvis::speech::{EspeakSynthesizer, Synthesizer};
use jarvis::ui;
use jarvis::utils::ui_channel;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Voice assistant with spoken replies and keyword commands
#[derive(Parser, Debug)]
#[command(name = "jarvis", version, about)]
struct Args {
    /// Config file (defaults to <config_dir>/jarvis/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without a window and start listening immediately
    #[arg(long)]
    headless: bool,

    /// Microphone device index
    #[arg(short, long)]
    device: Option<usize>,

    /// Print input devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jarvis=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.list_devices {
        list_devices();
        return Ok(());
    }

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded: {}", e);
    }

    let mut config = AssistantConfig::load(args.config.as_deref()).context("loading config")?;
    config.apply_env();
    if let Some(index) = args.device {
        config = config.with_device_index(index);
    }
    config.report_missing();

    info!("Starting Jarvis voice assistant");
    let synth = probe_speech(&config);
    let config = Arc::new(config);
    let factory = Arc::new(SystemFactory::new());

    if args.headless {
        let (ui, events) = ui_channel();
        let controller = SessionController::new(config, factory, synth, ui);
        ui::run_headless(&controller, &events);
        controller.shutdown(ui::CLOSE_GRACE);
        return Ok(());
    }

    ui::run(config, factory, synth).map_err(|e| anyhow::anyhow!("window failed: {}", e))
}

fn probe_speech(config: &AssistantConfig) -> Option<Arc<dyn Synthesizer>> {
    if !config.speech.enabled {
        info!("Speech output disabled in config");
        return None;
    }
    let synth = EspeakSynthesizer::new(&config.speech);
    match synth.probe() {
        Ok(()) => Some(Arc::new(synth)),
        Err(e) => {
            warn!("Speech engine unavailable ({}), falling back to log-only output", e);
            None
        }
    }
}

#[cfg(feature = "audio-io")]
fn list_devices() {
    let devices = jarvis::audio::list_input_devices();
    if devices.is_empty() {
        println!("No input devices found");
    }
    for device in devices {
        let marker = if device.is_default { " (default)" } else { "" };
        println!("{}: {}{}", device.index, device.name, marker);
    }
}

#[cfg(not(feature = "audio-io"))]
fn list_devices() {
    println!("Built without audio input support");
}
