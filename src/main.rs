use clap::{Parser, Subcommand};
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

use driftmap::geo::LatLng;
use driftmap::render::{CommandRecorder, WebMercator};
use driftmap::view::{Config, InboundEvent, MapView, OutboundEvent};
use driftmap::water::{self, MarkerLayer};

#[derive(Parser)]
#[command(name = "driftmap")]
#[command(about = "Current-vector map rendering")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a water dataset and summarize it
    Inspect {
        data: PathBuf,
        #[arg(long, default_value_t = 14.0)]
        zoom: f64,
    },
    /// Print the draw calls for a water dataset as JSON
    Render {
        data: PathBuf,
        #[arg(long, default_value_t = 14.0)]
        zoom: f64,
        /// Map centre as `lat,lon`
        #[arg(long, value_parser = parse_center)]
        center: Option<LatLng>,
        #[arg(long, default_value_t = 1024.0)]
        width: f64,
        #[arg(long, default_value_t = 768.0)]
        height: f64,
    },
    /// Feed a YAML event script to a map view and print what it pushes back
    Replay { script: PathBuf },
}

/// One step of a replay script.
#[derive(Debug, Deserialize)]
struct ReplayStep {
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
    /// Binary dataset to send as `water_data`.
    #[serde(default)]
    water_file: Option<PathBuf>,
    /// Wait this long before sending, e.g. `"2s"`.
    #[serde(default)]
    after: Option<String>,
}

fn parse_center(s: &str) -> Result<LatLng, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon, got {:?}", s))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lon = lon.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(LatLng::new(lat, lon))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Inspect { data, zoom } => inspect(&config, &data, zoom),
        Commands::Render {
            data,
            zoom,
            center,
            width,
            height,
        } => render(&config, &data, zoom, center, width, height),
        Commands::Replay { script } => replay(config, &script).await,
    }
}

fn load_layer(config: &Config, path: &Path) -> Option<MarkerLayer> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return None;
        }
    };
    match water::decode(&bytes) {
        Ok(dataset) => Some(MarkerLayer::new(
            dataset,
            config.markers,
            config.map.visibility_filter(),
        )),
        Err(e) => {
            eprintln!("Decode error: {}", e);
            None
        }
    }
}

fn inspect(config: &Config, path: &Path, zoom: f64) -> ExitCode {
    let Some(layer) = load_layer(config, path) else {
        return ExitCode::FAILURE;
    };

    let dataset = layer.dataset();
    println!("{} readings", dataset.len());
    if let Some((min, max)) = dataset.magnitude_range() {
        println!("  magnitude {:.3} .. {:.3}", min, max);
    }
    let counts = layer.variant_counts(zoom);
    println!("  at zoom {}:", zoom);
    println!("    glyphs:     {}", counts.oriented_glyph);
    println!("    dots:       {}", counts.simple_dot);
    println!("    suppressed: {}", counts.suppressed);
    ExitCode::SUCCESS
}

fn render(
    config: &Config,
    path: &Path,
    zoom: f64,
    center: Option<LatLng>,
    width: f64,
    height: f64,
) -> ExitCode {
    let Some(layer) = load_layer(config, path) else {
        return ExitCode::FAILURE;
    };

    let center = center.unwrap_or_else(|| config.map.center());
    let projection = WebMercator::new(center, zoom, width, height);
    let mut recorder = CommandRecorder::new();
    let drawn = layer.repaint(&mut recorder, &projection, zoom);
    info!("{} markers drawn", drawn);

    match serde_json::to_string_pretty(&recorder.into_commands()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing draw calls: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn replay(config: Config, path: &Path) -> ExitCode {
    let yaml = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let steps: Vec<ReplayStep> = match serde_yaml::from_str(&yaml) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (tx, mut rx) = unbounded_channel::<OutboundEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Error serializing {}: {}", event.name(), e),
            }
        }
    });

    let mut view = match MapView::new(config, Arc::new(tx)) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut status = ExitCode::SUCCESS;
    for (i, step) in steps.into_iter().enumerate() {
        if let Some(after) = &step.after {
            match humantime::parse_duration(after) {
                Ok(d) => tokio::time::sleep(d).await,
                Err(e) => {
                    eprintln!("Step {}: bad delay {:?}: {}", i + 1, after, e);
                    status = ExitCode::FAILURE;
                    break;
                }
            }
        }

        let event = match step.water_file {
            Some(file) => match fs::read(&file) {
                Ok(water_data) => Ok(InboundEvent::AddWaterMarkers { water_data }),
                Err(e) => {
                    eprintln!("Step {}: error reading {}: {}", i + 1, file.display(), e);
                    status = ExitCode::FAILURE;
                    break;
                }
            },
            None => InboundEvent::from_named(&step.event, step.payload),
        };

        let result = match event {
            Ok(event) => view.handle(event).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            eprintln!("Step {} ({}): {}", i + 1, step.event, e);
            status = ExitCode::FAILURE;
        }
    }

    view.shutdown().await;
    drop(view);
    let _ = printer.await;
    status
}
