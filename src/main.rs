// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use beatscope::config::{Config, ConfigStore, Key, Settings};
use beatscope::engine::get_engine;
use beatscope::grid::GridLayout;
use beatscope::notation;
use beatscope::render::{PixelCanvas, RenderLoop, Timing};
use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A beat-locked waveform visualizer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compiles a rhythm pattern and prints its notes as JSON.
    Compile {
        /// The pattern, e.g. "3:2|2" or "[!1@kick ~1 1 1]".
        pattern: String,
    },
    /// Maps a beat to its pixel position on the grid.
    Map {
        /// The beat position.
        #[arg(allow_negative_numbers = true)]
        beat: f64,
        /// Beats per row, comma separated.
        #[arg(short, long, default_value = "2,2")]
        rows: String,
        /// Beats of overlap drawn into neighboring rows.
        #[arg(short, long, default_value_t = 0.11)]
        margin: f64,
        /// Canvas width in pixels.
        #[arg(short, long, default_value_t = 2000)]
        width: u32,
        /// Canvas height in pixels.
        #[arg(long, default_value_t = 1000)]
        height: u32,
        /// Map onto a neighboring row instead of the home row.
        #[arg(short = 'o', long, default_value_t = 0, allow_negative_numbers = true)]
        row_offset: i32,
    },
    /// Lists every config key with its partition, kind and default value.
    Keys {},
    /// Runs the visualizer headless for a while and writes the last frame.
    Run {
        /// The path to a settings file.
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// How long to run for.
        #[arg(short, long, default_value = "5s")]
        duration: String,
        /// Where to write the final frame, as a PPM image.
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
        /// Overrides a config value. Should be in the form <KEY>=<VALUE>.
        #[arg(long = "set")]
        values: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { pattern } => {
            let compiled = notation::compile(&pattern)?;
            println!("{}", serde_json::to_string_pretty(&compiled)?);
        }
        Commands::Map {
            beat,
            rows,
            margin,
            width,
            height,
            row_offset,
        } => {
            let rows = rows
                .split(',')
                .map(|row| row.trim().parse::<u32>())
                .collect::<Result<Vec<u32>, _>>()?;
            let layout = GridLayout::new(&rows, margin, width, height)?;
            let position = layout.map_beat_with_offset(beat, row_offset);
            println!("x: {}, row: {}", position.x, position.row);
        }
        Commands::Keys {} => {
            let config = Config::default();
            println!("Keys (count: {}):", Key::ALL.len());
            for key in Key::ALL {
                println!(
                    "- {} ({:?}, {}): {}",
                    key.name(),
                    key.partition(),
                    key.kind(),
                    config.value(*key)
                );
            }
        }
        Commands::Run {
            settings,
            duration,
            output,
            values,
        } => {
            let mut settings = match settings {
                Some(path) => Settings::deserialize(&path)?,
                None => Settings::default(),
            };
            for value in values.iter() {
                let Some((key, text)) = value.split_once('=') else {
                    return Err(format!("malformed config value '{}'", value).into());
                };
                settings.insert_value(key, text);
            }
            let duration: Duration = DurationString::from_string(duration)?.into();

            let engine = get_engine(settings.engine())?;
            let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
            let mut store = ConfigStore::new(Config::default(), outbox_tx)?;
            settings.apply(&mut store)?;
            store.push();

            let render_loop = RenderLoop::new(
                store,
                engine,
                outbox_rx,
                PixelCanvas::new(1, 1),
                Timing::from_settings(&settings)?,
            );
            let handle = render_loop.mount();
            tokio::time::sleep(duration).await;
            let render_loop = handle.unmount().await?;

            let stats = render_loop.stats();
            let mut writer = BufWriter::new(File::create(&output)?);
            render_loop.surface().write_ppm(&mut writer)?;
            info!(output = output.display().to_string(), "Wrote final frame.");

            println!("Frames: {}", stats.frames);
            println!("Polls: {}", stats.polls);
            println!("Samples: {}", stats.samples);
            println!("Bars: {}", stats.bars);
            println!("Dropped samples: {}", stats.dropped);
            println!("Engine errors: {}", stats.engine_errors);
        }
    }

    Ok(())
}
