use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use polysweep_core::{
    CopyLayout, EngineConfig, LayerDescriptor, PolygonSpec, RotationState, SweepClock,
    TriggerEngine,
};
use tracing_subscriber::EnvFilter;

fn main() -> polysweep_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::live_defaults(),
    };

    match cli.command {
        Commands::Inspect { layer } => run_inspect(config, &layer),
        Commands::Simulate {
            layer,
            bpm,
            seconds,
            fps,
            json,
        } => run_simulate(config, &layer, bpm, seconds, fps, json),
    }
}

fn run_inspect(config: EngineConfig, layer: &LayerArgs) -> polysweep_core::Result<()> {
    let layer = layer.descriptor()?;
    tracing::info!(layer = %layer.name, polygon = ?layer.polygon, "inspecting layer");

    let mut engine = TriggerEngine::new(config, layer.polygon, layer.copies())?;
    engine.set_group_rotation(layer.group_rotation);
    let candidates = engine.rebuild(0.0);

    let stats = engine.stats();
    println!(
        "{} candidates: {} vertices, {} self-intersections, {} pairwise",
        stats.total(),
        stats.vertices,
        stats.self_intersections,
        stats.pairwise_intersections
    );
    for candidate in candidates.iter() {
        println!(
            "{:>22} x={:+.5} y={:+.5} angle={:.3}°",
            format!("{:?}", candidate.kind),
            candidate.position.x,
            candidate.position.y,
            candidate.angle.to_degrees()
        );
    }
    Ok(())
}

fn run_simulate(
    config: EngineConfig,
    layer: &LayerArgs,
    bpm: f64,
    seconds: f64,
    fps: u32,
    json: bool,
) -> polysweep_core::Result<()> {
    if fps == 0 {
        return Err("fps must be at least 1".into());
    }
    let layer = layer.descriptor()?;
    tracing::info!(bpm, seconds, fps, layer = %layer.name, "starting simulation");

    let mut engine = TriggerEngine::new(config, layer.polygon, layer.copies())?;
    engine.set_group_rotation(layer.group_rotation);
    let mut clock = SweepClock::new(bpm);
    let dt = 1.0 / fps as f64;
    let frames = (seconds * fps as f64).ceil() as u64;

    let mut fired = 0usize;
    engine.tick(0.0, RotationState::at(clock.angle));
    for _ in 0..frames {
        let rotation = clock.advance(dt);
        let output = engine.tick(clock.time_seconds, rotation);
        for trigger in &output.triggers {
            fired += 1;
            if json {
                println!("{}", serde_json::to_string(trigger)?);
            } else {
                println!(
                    "t={:>8.4}s {:>20} freq={:>8.2}Hz pan={:+.3}",
                    trigger.time,
                    format!("{:?}", trigger.source_kind),
                    trigger.frequency,
                    trigger.pan
                );
            }
        }
    }

    tracing::info!(
        fired,
        candidates = engine.candidates().len(),
        live_markers = engine.markers().len(),
        "simulation finished"
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Rotating polygon trigger engine", long_about = None)]
struct Cli {
    /// Optional JSON engine configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every candidate point of a layer.
    Inspect {
        #[command(flatten)]
        layer: LayerArgs,
    },
    /// Sweep a layer at a fixed frame rate and print the triggers it fires.
    Simulate {
        #[command(flatten)]
        layer: LayerArgs,
        /// Tempo of the sweep; four beats make one revolution. Negative
        /// values sweep backwards.
        #[arg(long, default_value_t = 120.0, allow_negative_numbers = true)]
        bpm: f64,
        /// Length of the simulation.
        #[arg(long, default_value_t = 4.0)]
        seconds: f64,
        /// Frames per second of the simulated scheduler.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Emit triggers as JSON lines.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct LayerArgs {
    /// Number of polygon vertices.
    #[arg(short = 'n', long, default_value_t = 5)]
    sides: u32,
    /// Star skip value; 1 draws a regular polygon.
    #[arg(short = 'k', long, default_value_t = 2, allow_negative_numbers = true)]
    skip: i32,
    #[arg(short, long, default_value_t = 1.0)]
    radius: f64,
    /// Number of rotated, scaled copies.
    #[arg(long, default_value_t = 1)]
    copies: u32,
    /// Extra scale added per copy.
    #[arg(long, default_value_t = 0.25)]
    scale_step: f64,
    /// Extra rotation per copy, in degrees.
    #[arg(long, default_value_t = 18.0)]
    rotation_step: f64,
}

impl LayerArgs {
    fn descriptor(&self) -> polysweep_core::Result<LayerDescriptor> {
        let polygon = PolygonSpec::new(self.sides, self.skip, self.radius)?;
        let layout = CopyLayout::new(self.copies, self.scale_step, self.rotation_step.to_radians());
        LayerDescriptor::new(format!("{{{}/{}}}", self.sides, self.skip), polygon, layout)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_tempo_parses() {
        let cli = Cli::try_parse_from(["polysweep-app", "simulate", "--bpm", "-120", "-k", "-2"])
            .unwrap();
        match cli.command {
            Commands::Simulate { bpm, layer, .. } => {
                assert_eq!(bpm, -120.0);
                assert_eq!(layer.skip, -2);
            }
            Commands::Inspect { .. } => panic!("parsed the wrong subcommand"),
        }
    }
}
