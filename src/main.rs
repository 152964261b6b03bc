use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use mecanum_cmd_runtime::config::{DRIVER_PREFIX, Params, TOPIC_CMD_VEL};
use mecanum_cmd_runtime::motor::Transform;
use mecanum_cmd_runtime::runtime::{self, RuntimeOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Publish motor setpoints on <prefix>_<wheel>/cmd
    Command,
    /// Publish expected wheel speeds on <prefix>_<wheel>/feedback
    Feedback,
}

impl From<Mode> for Transform {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Command => Transform::Command,
            Mode::Feedback => Transform::Feedback,
        }
    }
}

/// Mecanum base converter: cmd_vel in, four wheel setpoints out
#[derive(Parser, Debug)]
#[command(name = "mecanum-cmd-runtime", version)]
struct Args {
    /// JSON parameter file; flags below override its values
    #[arg(long)]
    params: Option<PathBuf>,

    /// Centroid to wheel axis distance (m)
    #[arg(long)]
    alpha: Option<f64>,

    /// Centroid to wheel radial median distance (m)
    #[arg(long)]
    beta: Option<f64>,

    /// Wheel radius (m)
    #[arg(long)]
    wheel_radius: Option<f64>,

    /// Max linear velocity (m/s)
    #[arg(long)]
    max_linear_vel: Option<f64>,

    /// Max angular velocity is PI / this divisor (rad/s)
    #[arg(long)]
    angular_vel_div: Option<f64>,

    /// Gearbox ratio
    #[arg(long)]
    gearbox_ratio: Option<f64>,

    /// Velocity command topic
    #[arg(long, default_value = TOPIC_CMD_VEL)]
    cmd_topic: String,

    /// Per-wheel driver topic prefix
    #[arg(long, default_value = DRIVER_PREFIX)]
    driver_prefix: String,

    /// Which wheel-speed transform to publish
    #[arg(long, value_enum, default_value_t = Mode::Command)]
    mode: Mode,
}

impl Args {
    fn apply_overrides(&self, params: &mut Params) {
        let overrides = [
            (&mut params.alpha, self.alpha),
            (&mut params.beta, self.beta),
            (&mut params.wheel_radius, self.wheel_radius),
            (&mut params.max_linear_vel, self.max_linear_vel),
            (&mut params.angular_vel_div, self.angular_vel_div),
            (&mut params.gearbox_ratio, self.gearbox_ratio),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    // Invalid geometry is fatal before any command is accepted
    let geometry = match Params::load(args.params.as_deref()).and_then(|mut params| {
        args.apply_overrides(&mut params);
        params.geometry()
    }) {
        Ok(geometry) => geometry,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let options = RuntimeOptions {
        cmd_topic: args.cmd_topic.clone(),
        driver_prefix: args.driver_prefix.clone(),
        transform: args.mode.into(),
    };

    if let Err(e) = runtime::run(geometry, options).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
