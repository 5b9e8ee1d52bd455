use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use traffic_ca::simulation::{
    Position, Session, SimConfig, SimulationState, Topology, DEFAULT_BREAKDOWN_PROBABILITY,
    DEFAULT_REPAIR_DURATION, EMPTY, OFF_ROAD,
};

#[derive(Parser)]
#[command(name = "traffic_ca")]
#[command(about = "Rule 184 traffic simulation in the terminal")]
struct Cli {
    /// Road layout: single-lane, two-way or intersection
    #[arg(long, default_value = "single-lane")]
    topology: String,

    /// Grid width in cells
    #[arg(long, default_value = "60")]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value = "20")]
    height: usize,

    /// Fraction of road cells that start with a vehicle
    #[arg(long, default_value = "0.3")]
    density: f64,

    /// Number of generations to run
    #[arg(long, default_value = "100")]
    steps: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Chance per step that a running vehicle breaks down
    #[arg(long, default_value_t = DEFAULT_BREAKDOWN_PROBABILITY)]
    breakdown_probability: f64,

    /// Steps a broken vehicle needs to be repaired
    #[arg(long, default_value_t = DEFAULT_REPAIR_DURATION)]
    repair_duration: u32,

    /// Only print the final map and statistics
    #[arg(long)]
    quiet: bool,

    /// Pause between printed generations, in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in the terminal, drawing each generation
fn run_headless(cli: &Cli) -> Result<()> {
    let topology: Topology = cli
        .topology
        .parse()
        .context("Failed to select topology")?;
    let config = SimConfig {
        breakdown_probability: cli.breakdown_probability,
        repair_duration: cli.repair_duration,
        ..SimConfig::default()
    };

    let mut session =
        Session::with_config(topology, cli.width, cli.height, cli.density, config, cli.seed)
            .context("Failed to create simulation")?;

    println!("Initial state:");
    draw_map(session.state());

    for _ in 0..cli.steps {
        session.step();
        if !cli.quiet {
            draw_map(session.state());
            if cli.delay_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(cli.delay_ms));
            }
        }
    }

    println!("=== Final State ===");
    draw_map(session.state());

    let state = session.state();
    let stats = session.stats();
    info!("=== SIMULATION COMPLETE ===");
    info!("Topology: {}", state.topology());
    info!("Steps run: {}", stats.steps);
    info!("Vehicles: {}", state.vehicle_count());
    info!("Broken vehicles: {}", state.broken().len());
    info!("Total moves: {}", stats.total_moves);
    info!("Average flow: {:.3}", stats.average_flow());
    info!("Breakdowns: {}", stats.total_breakdowns);
    info!("Repairs: {}", stats.total_repairs);
    if topology == Topology::TwoWay {
        info!("Lane changes: {}", stats.total_lane_changes);
    }
    if topology == Topology::Intersection {
        info!("Turns: {}", stats.total_turns);
        info!("Light flips: {}", stats.light_flips);
    }
    Ok(())
}

/// Draw the grid as text: ' ' off-road, '.' empty road, class digit for a vehicle, 'X' broken
fn draw_map(state: &SimulationState) {
    println!("--- Generation {} ---", state.generation());
    if let Some(lights) = state.traffic_lights() {
        println!(
            "Lights: horizontal={:?} vertical={:?} (flip in {})",
            lights.horizontal(),
            lights.vertical(),
            lights.timer()
        );
    }
    for (y, row) in state.grid().rows().iter().enumerate() {
        let line: String = row
            .iter()
            .enumerate()
            .map(|(x, &cell)| match cell {
                OFF_ROAD => ' ',
                EMPTY => '.',
                _ if state.is_broken(Position::new(y, x)) => 'X',
                class => char::from_digit(class.clamp(1, 9) as u32, 10).unwrap_or('#'),
            })
            .collect();
        println!("{}", line.trim_end());
    }
    println!();
}
