//! Scene and clock settings, persisted as RON.

use std::path::Path;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::consts::{
    EARTH_ATMOSPHERE_HEIGHT, EARTH_AXIAL_TILT_DEGREES, EARTH_DAY_LENGTH, EARTH_MASS, EARTH_RADIUS,
    SUN_DISTANCE, SUN_MASS, SUN_RADIUS,
};
use crate::error::ConfigError;
use crate::model::{LaunchParams, LightSource, ParentBody};

pub const DEFAULT_CONFIG_FILE: &str = "orbit-sim.ron";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub clock: ClockConfig,
    pub scene: SceneConfig,
    /// Number of segments in each trajectory polyline.
    pub trajectory_segments: usize,
    /// Satellites put into orbit at startup.
    pub launches: Vec<LaunchConfig>,
    /// Default log filter; `RUST_LOG` wins if set.
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one physics step, in wall-clock seconds.
    pub delta_time: f64,
    pub initial_sim_rate: f64,
    pub start_paused: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub bodies: Vec<BodyConfig>,
    pub light: LightConfig,
}

/// A parent body. The axial tilt is about the world +X axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    pub position: [f64; 3],
    pub axial_tilt_deg: f64,
    pub day_length: f64,
    pub atmosphere_height: f64,
    pub colour: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub name: String,
    pub position: [f64; 3],
    pub radius: f64,
    pub mass: f64,
    pub colour: [f32; 3],
}

/// A launch, in launch panel units: degrees and kilometers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LaunchConfig {
    pub name: String,
    pub dry_mass: f64,
    pub fuel_mass: f64,
    pub colour: [f32; 3],
    pub parent: String,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub azimuth_deg: f64,
    pub altitude_km: f64,
    pub velocity: f64,
    pub flight_path_angle_deg: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            scene: SceneConfig::default(),
            trajectory_segments: crate::astro::DEFAULT_ORBIT_SEGMENTS,
            launches: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            delta_time: 1.0 / 1000.0,
            initial_sim_rate: 1.0,
            start_paused: false,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            bodies: vec![BodyConfig::default()],
            light: LightConfig::default(),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "Earth".to_string(),
            mass: EARTH_MASS,
            radius: EARTH_RADIUS,
            position: [0.0; 3],
            axial_tilt_deg: EARTH_AXIAL_TILT_DEGREES,
            day_length: EARTH_DAY_LENGTH,
            atmosphere_height: EARTH_ATMOSPHERE_HEIGHT,
            colour: [0.2, 0.4, 1.0],
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: "Sun".to_string(),
            position: [0.0, -SUN_DISTANCE, 0.0],
            radius: SUN_RADIUS,
            mass: SUN_MASS,
            colour: [1.0, 1.0, 0.9],
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let params = LaunchParams::default();
        Self {
            name: params.name,
            dry_mass: params.dry_mass,
            fuel_mass: params.fuel_mass,
            colour: params.colour,
            parent: params.parent,
            longitude_deg: params.longitude.to_degrees(),
            latitude_deg: params.latitude.to_degrees(),
            azimuth_deg: params.azimuth.to_degrees(),
            altitude_km: params.altitude / 1000.0,
            velocity: params.velocity,
            flight_path_angle_deg: params.flight_path_angle.to_degrees(),
        }
    }
}

impl BodyConfig {
    pub fn to_body(&self) -> ParentBody {
        let tilt =
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.axial_tilt_deg.to_radians());
        ParentBody::new(self.name.clone(), self.mass, self.radius)
            .with_position(Point3::from(self.position))
            .with_rotation(tilt)
            .with_day_length(self.day_length)
            .with_atmosphere_height(self.atmosphere_height)
            .with_colour(Point3::from(self.colour))
    }
}

impl LightConfig {
    pub fn to_light(&self) -> LightSource {
        LightSource {
            name: self.name.clone(),
            position: Point3::from(self.position),
            radius: self.radius,
            mass: self.mass,
            colour: Point3::from(self.colour),
        }
    }
}

impl LaunchConfig {
    pub fn to_params(&self) -> LaunchParams {
        LaunchParams::from_degrees(
            self.name.clone(),
            self.longitude_deg,
            self.latitude_deg,
            self.azimuth_deg,
            self.altitude_km,
            self.velocity,
            self.flight_path_angle_deg,
        )
        .with_masses(self.dry_mass, self.fuel_mass)
        .with_colour(self.colour)
        .with_parent(self.parent.clone())
    }
}

// --- Load / Save ---

impl SimulationConfig {
    /// Reads a config file. It's an error for the file not to exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: SimulationConfig = ron::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [load](Self::load), but falls back to the defaults if there's no
    /// file.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(ConfigError::Write)?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }

    /// Catches the settings that would otherwise only blow up at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let clock = &self.clock;
        if !(clock.delta_time.is_finite() && clock.delta_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "delta_time must be positive, got {}",
                clock.delta_time
            )));
        }
        if !(clock.initial_sim_rate.is_finite() && clock.initial_sim_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_sim_rate must not be negative, got {}",
                clock.initial_sim_rate
            )));
        }
        if self.scene.bodies.is_empty() {
            return Err(ConfigError::Invalid("scene has no bodies".to_string()));
        }
        for body in &self.scene.bodies {
            if !(body.mass > 0.0 && body.radius > 0.0 && body.day_length > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "body {:?} needs a positive mass, radius and day length",
                    body.name
                )));
            }
        }
        Ok(())
    }
}
