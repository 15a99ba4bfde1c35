//! FlightReplay CLI
//!
//! Inspect, sample and play back recorded drone flight bundles.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use flightreplay_core::{Query, TemporalSampler, VelocityScaler};
use flightreplay_player::demo;
use flightreplay_player::{
    JsonExporter, MultiSink, PlaybackConfig, PlaybackExport, PlaybackMode, PlaybackOverrides,
    RerunSink, SummarySink, Timeline,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// FlightReplay - drone trajectory playback
#[derive(Parser, Debug)]
#[command(name = "flightreplay")]
#[command(about = "Replay recorded drone flights from .npz bundles", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a bundle
    Info {
        bundle: PathBuf,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Play a bundle through the timeline
    Play(PlayArgs),

    /// Print the interpolated pose at one query value
    Sample {
        bundle: PathBuf,

        /// Simulation time in seconds
        #[arg(long, conflicts_with = "progress", required_unless_present = "progress")]
        time: Option<f64>,

        /// Progress fraction in [0, 1]
        #[arg(long)]
        progress: Option<f64>,
    },

    /// Write a synthetic helix bundle
    Demo {
        output: PathBuf,

        /// Number of samples
        #[arg(long, default_value = "240")]
        samples: usize,

        /// Flight duration in seconds
        #[arg(long, default_value = "8.0")]
        duration: f64,
    },
}

#[derive(ClapArgs, Debug)]
struct PlayArgs {
    bundle: PathBuf,

    /// JSON playback config (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query style (time, progress)
    #[arg(short, long)]
    mode: Option<PlaybackMode>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Animation length in seconds
    #[arg(long)]
    run_time: Option<f64>,

    /// Hide the velocity arrow
    #[arg(long)]
    no_velocity: bool,

    /// Arrow length of the fastest sample
    #[arg(long)]
    arrow_length: Option<f64>,

    /// Disable ambient camera rotation
    #[arg(long)]
    no_rotation: bool,

    /// Export sampled frames to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Stream to a spawned Rerun viewer
    #[arg(long)]
    rerun: bool,

    /// Record the Rerun stream to an .rrd file
    #[arg(long)]
    save_rrd: Option<String>,
}

impl PlayArgs {
    fn overrides(&self) -> PlaybackOverrides {
        PlaybackOverrides {
            mode: self.mode,
            fps: self.fps,
            run_time_secs: self.run_time,
            arrow_length: self.arrow_length,
            hide_velocity: self.no_velocity,
            disable_rotation: self.no_rotation,
        }
    }

    fn playback_config(&self) -> Result<PlaybackConfig> {
        let mut config = match &self.config {
            Some(path) => PlaybackConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => PlaybackConfig::default(),
        };
        config.apply_overrides(&self.overrides());
        config.validate()?;
        Ok(config)
    }
}

fn bundle_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "flight".to_string())
}

fn load(path: &Path) -> Result<flightreplay_core::TrajectoryStore> {
    flightreplay_core::load(path)
        .with_context(|| format!("Failed to load bundle {}", path.display()))
}

fn run_info(bundle: &Path, json: bool) -> Result<()> {
    let store = load(bundle)?;
    let summary = store.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    info!("Bundle: {}", bundle.display());
    info!("  samples:     {}", summary.samples);
    info!(
        "  time:        {:.3}s .. {:.3}s ({:.3}s)",
        summary.start_time, summary.end_time, summary.duration
    );
    info!("  path length: {:.3}", summary.path_length);
    info!("  max speed:   {:.3}", summary.max_speed);
    info!(
        "  bounds:      ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
        summary.bounds_min[0],
        summary.bounds_min[1],
        summary.bounds_min[2],
        summary.bounds_max[0],
        summary.bounds_max[1],
        summary.bounds_max[2]
    );
    info!("  obstacles:   {}", summary.obstacles);
    info!(
        "  goal:        {}",
        if summary.static_goal { "static" } else { "moving" }
    );
    Ok(())
}

fn run_sample(bundle: &Path, time: Option<f64>, progress: Option<f64>) -> Result<()> {
    let store = load(bundle)?;
    let sampler = TemporalSampler::new(&store);
    let query = match (time, progress) {
        (Some(t), _) => Query::Time(t),
        (None, Some(alpha)) => Query::Progress(alpha),
        (None, None) => anyhow::bail!("Either --time or --progress is required"),
    };

    let pose = sampler.pose(query);
    let scaler = VelocityScaler::for_store(&store);
    let output = serde_json::json!({
        "query": query,
        "scene_time": sampler.scene_time(query),
        "position": pose.position,
        "velocity": pose.velocity,
        "goal": pose.goal,
        "arrow": scaler.arrow(&pose.position, &pose.velocity),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_play(args: &PlayArgs) -> Result<()> {
    let config = args.playback_config()?;
    let store = load(&args.bundle)?;
    let name = bundle_name(&args.bundle);
    let timeline = Timeline::new(&store, &config)?;

    let mut summary = SummarySink::new();
    let mut exporter = args.export.as_ref().map(|path| {
        JsonExporter::new(path, PlaybackExport::new(&name, config.mode, config.fps))
    });
    let mut viewer = if let Some(path) = &args.save_rrd {
        Some(RerunSink::to_file(&name, path)?)
    } else if args.rerun {
        Some(RerunSink::spawn(&name))
    } else {
        None
    };

    let stats = {
        let mut sinks = MultiSink::new();
        sinks.push(&mut summary);
        if let Some(exporter) = exporter.as_mut() {
            sinks.push(exporter);
        }
        if let Some(viewer) = viewer.as_mut() {
            if viewer.is_enabled() {
                sinks.push(viewer);
            }
        }
        timeline.run(&mut sinks)?
    };

    let summary = summary.summary();
    info!(
        "Played {} frames over {:.2}s ({:?} mode)",
        stats.frames, stats.run_time, config.mode
    );
    info!("  distance traveled: {:.3}", summary.distance_traveled);
    if let Some(d) = summary.closest_goal_distance {
        info!("  closest to goal:   {:.3}", d);
    }
    Ok(())
}

fn run_demo(output: &Path, samples: usize, duration: f64) -> Result<()> {
    let store = demo::helix_store(samples, duration).context("Failed to build demo flight")?;
    flightreplay_core::save(&store, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} samples to {}", store.sample_count(), output.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &args.command {
        Command::Info { bundle, json } => run_info(bundle, *json),
        Command::Play(play) => run_play(play),
        Command::Sample {
            bundle,
            time,
            progress,
        } => run_sample(bundle, *time, *progress),
        Command::Demo {
            output,
            samples,
            duration,
        } => run_demo(output, *samples, *duration),
    }
}
