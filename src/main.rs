//! Dungeon generator command line
//!
//! Prints generated layouts as ASCII maps or bridge JSON, and runs
//! multi-seed surveys.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use dungeon_core::bridge::DungeonLayoutResponse;
use dungeon_core::config::DungeonConfig;
use dungeon_core::generation::{DungeonLayout, DungeonSeed, Point};
use dungeon_core::logging::{self, LogLevel, TracingConfig};
use dungeon_core::survey::{self, SurveyConfig};
use dungeon_core::visualization;

/// Quad-tree dungeon layout generator
#[derive(Parser, Debug)]
#[command(name = "dungeon-gen")]
#[command(author, version, about = "Generate quad-tree dungeon layouts", long_about = None)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one dungeon and print it
    Generate {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Root seed
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,

        /// Use the derived seed of this campaign level
        #[arg(short = 'l', long = "level")]
        level: Option<u32>,

        /// Print bridge JSON instead of the map
        #[arg(long = "json")]
        json: bool,
    },
    /// Generate many dungeons and print statistics as JSON
    Survey {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Number of layouts
        #[arg(short = 'n', long = "count")]
        count: Option<u64>,

        /// Base seed the per-layout seeds derive from
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,
    },
}

/// Generation parameters: a config file, then individual overrides
#[derive(clap::Args, Debug)]
struct LayoutArgs {
    /// RON or JSON config file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[arg(long = "width")]
    width: Option<i32>,

    #[arg(long = "height")]
    height: Option<i32>,

    /// Minimum room size
    #[arg(long = "min-room", num_args = 2, value_names = ["W", "H"])]
    min_room: Option<Vec<i32>>,

    #[arg(long = "path-width")]
    path_width: Option<i32>,

    /// Partition depth
    #[arg(short = 'd', long = "depth")]
    depth: Option<u32>,
}

impl LayoutArgs {
    fn resolve(&self) -> Result<DungeonConfig> {
        let mut config = match &self.config {
            Some(path) => DungeonConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DungeonConfig::default(),
        };
        if let Some(width) = self.width {
            config.dungeon_size.x = width;
        }
        if let Some(height) = self.height {
            config.dungeon_size.y = height;
        }
        if let Some(size) = &self.min_room {
            let [w, h] = size.as_slice() else {
                bail!("--min-room takes a width and a height");
            };
            config.minimum_room_size = Point::new(*w, *h);
        }
        if let Some(path_width) = self.path_width {
            config.path_width = path_width;
        }
        if let Some(depth) = self.depth {
            config.partition_depth = depth;
        }
        config.validate().context("invalid generation parameters")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    logging::init_tracing(&TracingConfig::with_level(level));

    match cli.command {
        Command::Generate {
            layout,
            seed,
            level,
            json,
        } => {
            let mut config = layout.resolve()?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(level) = level {
                config.seed = DungeonSeed::new(config.seed).level_seed(level);
            }
            generate(config, json)
        }
        Command::Survey {
            layout,
            count,
            seed,
        } => {
            let defaults = SurveyConfig::default();
            let survey = SurveyConfig {
                layout_count: count.unwrap_or(defaults.layout_count),
                base_seed: seed.unwrap_or(defaults.base_seed),
                dungeon: layout.resolve()?,
            };
            let report = survey::run_survey(&survey);
            println!("{}", report.to_json());
            Ok(())
        }
    }
}

fn generate(config: DungeonConfig, json: bool) -> Result<()> {
    let seed = config.seed;
    let mut layout = DungeonLayout::new(config);
    layout
        .generate_dungeon_layout()
        .with_context(|| format!("generating dungeon for seed {seed}"))?;

    if json {
        let response = DungeonLayoutResponse::from(&layout);
        println!("{}", serde_json::to_string(&response)?);
    } else {
        print!("{}", visualization::render_layout(&layout));
    }
    Ok(())
}
