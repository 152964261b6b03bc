// Topics, default geometry, parameter loading
use std::f64::consts::PI;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::motor::kinematics::{GeometryError, RobotGeometry, Wheel};

// Zenoh topics
pub const TOPIC_CMD_VEL: &str = "cmd_vel"; // body velocity commands
pub const DRIVER_PREFIX: &str = "roboteq_driver"; // per-wheel driver namespace

// Default base geometry (meters)
pub const DEFAULT_ALPHA: f64 = 0.31; // centroid -> wheel axis, along x
pub const DEFAULT_BETA: f64 = 0.30; // centroid -> wheel radial median, along y
pub const DEFAULT_WHEEL_RADIUS: f64 = 0.075;

// Default dynamic limits
pub const DEFAULT_MAX_LINEAR_VEL: f64 = 1.0; // m/s
pub const DEFAULT_ANGULAR_VEL_DIV: f64 = 6.0; // max yaw rate = PI / div
pub const DEFAULT_GEARBOX_RATIO: f64 = 15.0;

/// Errors raised while loading parameters. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read parameter file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse parameter file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("angular_vel_div must be a finite value greater than zero, got {0}")]
    AngularDivisor(f64),

    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Runtime parameters, as read from a JSON parameter file
///
/// Absent keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub alpha: f64,
    pub beta: f64,
    pub wheel_radius: f64,
    pub max_linear_vel: f64,
    pub angular_vel_div: f64,
    pub gearbox_ratio: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            wheel_radius: DEFAULT_WHEEL_RADIUS,
            max_linear_vel: DEFAULT_MAX_LINEAR_VEL,
            angular_vel_div: DEFAULT_ANGULAR_VEL_DIV,
            gearbox_ratio: DEFAULT_GEARBOX_RATIO,
        }
    }
}

impl Params {
    /// Load parameters from a JSON file, or defaults if no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No parameter file given, using defaults");
            return Ok(Self::default());
        };

        info!("Loading parameters from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Max yaw rate in rad/s
    pub fn max_angular_vel(&self) -> f64 {
        PI / self.angular_vel_div
    }

    /// Validate and build the immutable robot geometry
    pub fn geometry(&self) -> Result<RobotGeometry, ConfigError> {
        if !(self.angular_vel_div.is_finite() && self.angular_vel_div > 0.0) {
            return Err(ConfigError::AngularDivisor(self.angular_vel_div));
        }

        let geometry = RobotGeometry::new(
            self.alpha,
            self.beta,
            self.wheel_radius,
            self.gearbox_ratio,
            self.max_linear_vel,
            self.max_angular_vel(),
        )?;
        Ok(geometry)
    }
}

/// Topic for a wheel's driver, e.g. `roboteq_driver_FLW/cmd`
pub fn wheel_topic(prefix: &str, wheel: Wheel, leaf: &str) -> String {
    format!("{}_{}/{}", prefix, wheel.tag(), leaf)
}
