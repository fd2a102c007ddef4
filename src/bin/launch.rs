use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rust_orbit_sim::config::SimulationConfig;
use rust_orbit_sim::logging;
use rust_orbit_sim::model::{LaunchParams, Simulation, Tick};

/// Launches one satellite without a window and prints its orbit.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value = "Satellite")]
    name: String,
    /// Degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    longitude: f64,
    /// Degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    latitude: f64,
    /// Degrees clockwise from north
    #[arg(long, default_value_t = 90.0)]
    azimuth: f64,
    /// Kilometers above the surface
    #[arg(long, default_value_t = 200.0)]
    altitude: f64,
    /// Meters per second
    #[arg(long, default_value_t = 7784.34)]
    velocity: f64,
    /// Degrees above the horizon
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    flight_path_angle: f64,
    #[arg(long, default_value = "Earth")]
    parent: String,
    /// Also print the state this many seconds after launch
    #[arg(long)]
    elapsed: Option<f64>,
    /// Scene to launch into; the default scene otherwise
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init("warn");

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path),
        None => Ok(SimulationConfig::default()),
    };
    let simulation = config
        .map_err(|e| e.to_string())
        .and_then(|config| Simulation::from_config(&config).map_err(|e| e.to_string()));
    let mut simulation = match simulation {
        Ok(simulation) => simulation,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let params = LaunchParams::from_degrees(
        args.name.clone(),
        args.longitude,
        args.latitude,
        args.azimuth,
        args.altitude,
        args.velocity,
        args.flight_path_angle,
    )
    .with_parent(args.parent.clone());
    if let Err(e) = simulation.add_satellite(&params) {
        log::error!("Launch failed: {}", e);
        return ExitCode::FAILURE;
    }
    print_satellite(&simulation, &args.name);

    if let Some(elapsed) = args.elapsed {
        let tick = Tick {
            sim_time: simulation.sim_time() + elapsed,
            sim_dt: elapsed,
        };
        if let Some(failure) = simulation.physics_tick(tick).first() {
            log::error!("Couldn't propagate: {}", failure.error);
            return ExitCode::FAILURE;
        }
        println!("After {} s:", elapsed);
        print_satellite(&simulation, &args.name);
    }
    ExitCode::SUCCESS
}

fn print_satellite(simulation: &Simulation, name: &str) {
    let satellite = match simulation.satellites().get(name) {
        Some(s) => s,
        None => return,
    };
    let elements = satellite.elements();
    let info = satellite.info();

    println!("Orbital characteristics for {}", info.name);
    println!("- Semi-major axis: {}", elements.semi_major_axis());
    println!("- Orbital eccentricity: {}", elements.eccentricity());
    println!(
        "- Orbital inclination: {}",
        elements.inclination().to_degrees()
    );
    println!(
        "- Argument of periapsis: {}",
        elements.arg_periapsis().to_degrees()
    );
    println!("- LAN: {}", elements.long_asc_node().to_degrees());
    println!("- Period: {}", elements.period());
    println!("- Time of periapsis: {}", elements.time_of_periapsis());
    println!("- Apoapsis altitude: {}", info.apoapsis);
    println!("- Periapsis altitude: {}", info.periapsis);
    println!("- Altitude: {}", info.altitude);
    println!("- Speed: {}", info.velocity);
    println!(
        "- Flight path angle: {}",
        info.flight_path_angle.to_degrees()
    );
    println!(
        "- True anomaly: {}",
        satellite.true_anomaly().to_degrees()
    );
    println!();
}
