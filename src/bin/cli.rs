//! TileVault CLI
//!
//! Inspect tile archives: header fields, metadata, individual tiles.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tilevault::archive::zxy_to_tile_id;
use tilevault::viewport::BoundingBox;
use tilevault::{Config, Engine};

/// TileVault CLI
#[derive(Parser, Debug)]
#[command(name = "tilevault-cli")]
#[command(about = "Inspect TileVault tile archives")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the archive header
    Info {
        /// Path to the archive
        archive: PathBuf,

        /// Emit the header as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the archive's JSON metadata block
    Metadata {
        /// Path to the archive
        archive: PathBuf,
    },

    /// Decode one tile and summarize its layers
    Tile {
        /// Path to the archive
        archive: PathBuf,

        /// Zoom level
        z: u8,

        /// Tile column
        x: u32,

        /// Tile row
        y: u32,
    },

    /// Enumerate the tiles a viewport would fetch
    Plan {
        /// Path to the archive
        archive: PathBuf,

        /// Viewport in world pixels: min_x min_y max_x max_y
        #[arg(num_args = 4)]
        view: Vec<f64>,

        /// Fractional display zoom
        zoom: f64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Commands::Info { archive, json } => {
            let engine = open(&archive)?;
            let header = engine.header();
            if json {
                println!("{}", serde_json::to_string_pretty(header)?);
            } else {
                println!("spec version:   {}", header.spec_version);
                println!("tile type:      {}", header.tile_type);
                println!("zoom range:     {}..={}", header.min_zoom, header.max_zoom);
                println!(
                    "bounds:         [{:.5}, {:.5}] – [{:.5}, {:.5}]",
                    header.bounds.min_lon,
                    header.bounds.min_lat,
                    header.bounds.max_lon,
                    header.bounds.max_lat
                );
                println!("addressed:      {} tiles", header.addressed_tiles);
                println!("entries:        {}", header.tile_entries);
                println!("contents:       {}", header.tile_contents);
                println!("clustered:      {}", header.clustered);
                println!("tile codec:     {:?}", header.tile_compression);
                println!("internal codec: {:?}", header.internal_compression);
            }
        }
        Commands::Metadata { archive } => {
            let engine = open(&archive)?;
            println!("{}", serde_json::to_string_pretty(&engine.metadata()?)?);
        }
        Commands::Tile { archive, z, x, y } => {
            let engine = open(&archive)?;
            let tile_id = zxy_to_tile_id(z, x, y)?;
            match engine.tile(z, x, y)? {
                None => println!("no tile at z={z} x={x} y={y} (id {tile_id})"),
                Some(tile) => {
                    println!("tile z={z} x={x} y={y} (id {tile_id}): {} layers", tile.layers.len());
                    for layer in &tile.layers {
                        println!(
                            "  layer {:?}: extent {}, {} features",
                            layer.name,
                            layer.extent,
                            layer.features.len()
                        );
                    }
                }
            }
        }
        Commands::Plan {
            archive,
            view,
            zoom,
        } => {
            let engine = open(&archive)?;
            let view_bb = BoundingBox::new(view[0], view[1], view[2], view[3]);
            let plan = engine.plan_viewport(view_bb, zoom);
            println!("epoch {}: {} tiles", plan.epoch, plan.queries.len());
            for q in &plan.queries {
                let mask = engine.visible_sectors(q);
                println!("  z={} x={} y={} sectors {:#018x}", q.zoom, q.x, q.y, mask);
            }
        }
    }
    Ok(())
}

fn open(path: &PathBuf) -> Result<Engine, Box<dyn std::error::Error>> {
    Engine::open(path, Config::default())?
        .ok_or_else(|| format!("archive not found: {}", path.display()).into())
}
