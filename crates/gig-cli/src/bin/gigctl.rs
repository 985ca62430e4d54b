use anyhow::Result;
use clap::{Parser, Subcommand};
use gig_cli::{parse_coordinate, Snapshot};
use gig_core::{ConflictResolver, DistanceEngine, SchedulingRules};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Nominal walking speed in km/h
    #[arg(long, global = true)]
    speed_kmh: Option<f64>,

    /// Campus friction multiplier
    #[arg(long, global = true)]
    campus_factor: Option<f64>,

    /// Safety buffer in minutes added to walking time
    #[arg(long, global = true)]
    buffer_minutes: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walking time between two coordinates
    WalkingTime {
        /// Origin as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        from: String,
        /// Destination as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },
    /// Evaluate a candidate booking from a JSON snapshot
    Evaluate {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let defaults = SchedulingRules::default();
    let rules = SchedulingRules {
        walking_speed_kmh: args.speed_kmh.unwrap_or(defaults.walking_speed_kmh),
        campus_factor: args.campus_factor.unwrap_or(defaults.campus_factor),
        travel_buffer_minutes: args.buffer_minutes.unwrap_or(defaults.travel_buffer_minutes),
        ..defaults
    };

    match args.command {
        Command::WalkingTime { from, to } => {
            let engine = DistanceEngine::new(&rules);
            let (a, b) = (parse_coordinate(&from)?, parse_coordinate(&to)?);
            let minutes = engine.estimate_travel_minutes(a, b);
            println!("Walking time: {} min", minutes);
            println!("With buffer:  {} min", engine.required_minutes(a, b));
        }
        Command::Evaluate { snapshot } => {
            let snapshot = Snapshot::load(&snapshot)?;
            let verdict = snapshot.evaluate(&ConflictResolver::new(&rules));
            println!("{}", verdict.to_json()?);
            std::process::exit(verdict.exit_code());
        }
    }

    Ok(())
}
