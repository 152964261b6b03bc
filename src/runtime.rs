// Callback-driven converter: one cmd_vel sample in, four wheel messages out
// Each sample is processed to completion before the next one is awaited.

use tracing::{debug, error, info, warn};

use crate::messages::Twist;
use crate::motor::kinematics::{BodyVelocity, RobotGeometry, Transform, WheelSpeeds};
use crate::motor::{DriverError, MotorDriver};

/// Why an incoming payload was dropped
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid twist payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime wiring, usually built from the command line
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub cmd_topic: String,
    pub driver_prefix: String,
    pub transform: Transform,
}

/// Stateless converter: holds only the immutable geometry and the selected transform
pub struct Converter {
    geometry: RobotGeometry,
    transform: Transform,
}

impl Converter {
    pub fn new(geometry: RobotGeometry, transform: Transform) -> Self {
        Self {
            geometry,
            transform,
        }
    }

    /// Decode a JSON twist into a body velocity
    pub fn decode(payload: &[u8]) -> Result<BodyVelocity, DecodeError> {
        let twist: Twist = serde_json::from_slice(payload)?;
        Ok(BodyVelocity::from(&twist))
    }

    /// Clamp and transform a body velocity
    pub fn convert(&self, cmd: &BodyVelocity) -> WheelSpeeds {
        self.transform.apply(cmd, &self.geometry)
    }

    /// Process incoming payload
    pub fn on_payload(&self, payload: &[u8]) -> Result<WheelSpeeds, DecodeError> {
        let cmd = Self::decode(payload)?;
        let speeds = self.convert(&cmd);
        debug!("Converted {:?} -> {:?}", cmd, speeds);
        Ok(speeds)
    }
}

pub async fn run(
    geometry: RobotGeometry,
    options: RuntimeOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(options.cmd_topic.clone()).await?;
    let driver = MotorDriver::declare(&session, &options.driver_prefix, options.transform).await?;

    let converter = Converter::new(geometry, options.transform);

    info!(
        "Converter started: {:?} transform, alpha={} beta={} radius={} gearbox={} max_linear={} max_angular={:.4}",
        options.transform,
        geometry.alpha(),
        geometry.beta(),
        geometry.wheel_radius(),
        geometry.gearbox_ratio(),
        geometry.max_linear_speed(),
        geometry.max_angular_speed()
    );
    info!("Subscribed to: {}", options.cmd_topic);
    info!("Publishing to: {}", driver.topics().join(", "));

    let outcome = async {
        loop {
            tokio::select! {
                sample = subscriber.recv_async() => {
                    let sample = match sample {
                        Ok(sample) => sample,
                        Err(e) => {
                            warn!("Subscriber closed: {}", e);
                            break;
                        }
                    };

                    let payload = sample.payload().to_bytes();
                    match converter.on_payload(&payload) {
                        Ok(speeds) => driver.set_wheel_speeds(&speeds).await?,
                        Err(e) => warn!("Dropping command: {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }
        Ok::<(), DriverError>(())
    }
    .await;

    shut_down(&driver, outcome).await?;
    Ok(())
}

/// Stop every wheel however the loop ended, then report how it ended
///
/// A failed stop is logged; the loop's own error takes precedence.
pub async fn shut_down(
    driver: &MotorDriver,
    outcome: Result<(), DriverError>,
) -> Result<(), DriverError> {
    if let Err(e) = outcome.as_ref() {
        error!("Converter loop failed: {}", e);
    }
    if let Err(e) = driver.stop().await {
        warn!("Failed to stop motors: {}", e);
    }
    outcome
}
