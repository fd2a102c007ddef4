use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use kiss3d::window::Window;

use rust_orbit_sim::cli::CliArgs;
use rust_orbit_sim::config::{SimulationConfig, DEFAULT_CONFIG_FILE};
use rust_orbit_sim::gui::App;
use rust_orbit_sim::logging;
use rust_orbit_sim::model::Simulation;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // An explicit --config has to exist; the default file is optional
    let loaded = match &args.config {
        Some(path) => SimulationConfig::load(path),
        None => SimulationConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            log::error!("Couldn't load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&args);
    logging::init(&config.log_level);

    let simulation = match Simulation::from_config(&config) {
        Ok(simulation) => simulation,
        Err(e) => {
            log::error!("Couldn't set up the scene: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Starting with {} bodies and {} satellites",
        simulation.bodies().len(),
        simulation.satellites().len()
    );

    let mut window = Window::new("Orbit Simulator");
    window.set_framerate_limit(Some(60));

    let app = App::new(simulation, &mut window);
    window.render_loop(app);
    ExitCode::SUCCESS
}
