// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use kidsynth::audio::output::{default_device_name, list_devices, supported_sample_rates};
use kidsynth::audio::{NullEmitter, SynthEmitter, ToneEmitter};
use kidsynth::config::Settings;
use kidsynth::logging::{self, DEFAULT_LOG_FILE};
use kidsynth::timing::bar_duration;
use kidsynth::ui::App;
use kidsynth::{Engine, Intent, Runtime};
use tracing::info;

/// Bars played by `--headless` without a count
const DEFAULT_HEADLESS_BARS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Interactive,
    Headless(usize),
    ListAudio,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    mode: Mode,
    config: Option<PathBuf>,
    log: PathBuf,
    mute: bool,
}

fn print_usage() {
    println!("kidsynth - 16 bar step sequencer");
    println!();
    println!("Usage: kidsynth [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>      Load settings from a YAML file");
    println!("  --headless [BARS]    Play the start-up pattern without the UI (default {} bars)", DEFAULT_HEADLESS_BARS);
    println!("  --list-audio         List available audio output devices");
    println!("  --log <PATH>         Log file (default {})", DEFAULT_LOG_FILE);
    println!("  --mute               Run without opening an audio device");
    println!("  --help               Show this help message");
    println!();
    println!("Set KIDSYNTH_LOG (e.g. debug) to change the log level.");
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        mode: Mode::Interactive,
        config: None,
        log: PathBuf::from(DEFAULT_LOG_FILE),
        mute: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                options.config = Some(PathBuf::from(path));
                i += 1;
            }
            "--log" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--log requires a path"))?;
                options.log = PathBuf::from(path);
                i += 1;
            }
            "--headless" => {
                let bars = match args.get(i + 1) {
                    Some(next) if !next.starts_with("--") => {
                        i += 1;
                        next.parse()
                            .map_err(|_| anyhow!("Invalid bar count: {}", next))?
                    }
                    _ => DEFAULT_HEADLESS_BARS,
                };
                options.mode = Mode::Headless(bars);
            }
            "--list-audio" => options.mode = Mode::ListAudio,
            "--mute" => options.mute = true,
            "--help" | "-h" => options.mode = Mode::Help,
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(options)
}

fn print_audio_devices() {
    let devices = list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
        return;
    }
    let default = default_device_name();
    println!("Audio output devices:");
    for (i, name) in devices.iter().enumerate() {
        let marker = if default.as_deref() == Some(name.as_str()) { " (default)" } else { "" };
        println!("  {}: {}{}", i, name, marker);
    }
    let rates = supported_sample_rates();
    if !rates.is_empty() {
        println!("Default device sample rates: {:?}", rates);
    }
}

fn load_settings(options: &Options) -> Result<Settings> {
    match &options.config {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

fn emitter(settings: &Settings, mute: bool) -> Arc<dyn ToneEmitter> {
    if mute {
        Arc::new(NullEmitter::default())
    } else {
        Arc::new(SynthEmitter::new(settings.audio.clone()))
    }
}

async fn run_headless(settings: Settings, bars: usize, mute: bool) -> Result<()> {
    let engine = Engine::from_settings(&settings)?;
    let (runtime, handle) = Runtime::new(engine, emitter(&settings, mute));
    let task = tokio::spawn(runtime.run());

    println!(
        "Playing {} bars at {:.0} BPM (preset: {})",
        bars, settings.tempo, settings.preset
    );
    let mut snapshots = handle.subscribe();
    handle.send(Intent::PressPlay).await;

    let mut last_bar = None;
    let mut last_notice = None;
    let deadline = tokio::time::sleep(bar_duration(settings.tempo) * bars as u32);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if last_bar != Some(snapshot.current_bar) {
                    println!("Bar {}", snapshot.current_bar + 1);
                    last_bar = Some(snapshot.current_bar);
                }
                if snapshot.notice.is_some() && snapshot.notice != last_notice {
                    println!("  {}", snapshot.notice.as_deref().unwrap_or_default());
                }
                last_notice = snapshot.notice;
            }
        }
    }

    handle.send(Intent::Quit).await;
    let engine = task.await.context("runtime task failed")?;
    info!(bar = engine.clock().current_bar(), "headless run finished");
    println!("Done");
    Ok(())
}

async fn run_interactive(settings: Settings, mute: bool) -> Result<()> {
    let engine = Engine::from_settings(&settings)?;
    let (runtime, handle) = Runtime::new(engine, emitter(&settings, mute));
    let task = tokio::spawn(runtime.run());

    let app = App::new().context("Failed to set up terminal")?;
    let result = app.run(handle.clone()).await;

    handle.send(Intent::Quit).await;
    task.await.context("runtime task failed")?;
    result.context("terminal UI failed")
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match options.mode {
        Mode::Help => {
            print_usage();
            return Ok(());
        }
        Mode::ListAudio => {
            print_audio_devices();
            return Ok(());
        }
        Mode::Interactive | Mode::Headless(_) => {}
    }

    let settings = load_settings(&options)?;
    logging::init(&options.log)?;
    info!(?options, "kidsynth starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        match options.mode {
            Mode::Headless(bars) => run_headless(settings, bars, options.mute).await,
            _ => run_interactive(settings, options.mute).await,
        }
    })
}
