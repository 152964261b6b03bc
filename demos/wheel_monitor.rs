// Wheel monitor: READ-ONLY view of the four per-wheel driver topics
//
// Usage: cargo run --example wheel_monitor -- [cmd|feedback] [prefix]
// Example: cargo run --example wheel_monitor -- cmd roboteq_driver

use mecanum_cmd_runtime::config::{DRIVER_PREFIX, wheel_topic};
use mecanum_cmd_runtime::messages::{MotorCommand, MotorFeedback};
use mecanum_cmd_runtime::motor::Wheel;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let leaf = std::env::args().nth(1).unwrap_or_else(|| "cmd".to_string());
    let prefix = std::env::args()
        .nth(2)
        .unwrap_or_else(|| DRIVER_PREFIX.to_string());

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(Wheel, Vec<u8>)>(32);
    for wheel in Wheel::ALL {
        let topic = wheel_topic(&prefix, wheel, &leaf);
        let subscriber = session.declare_subscriber(topic.clone()).await?;
        info!("Subscribed to: {}", topic);

        let tx = tx.clone();
        tokio::spawn(async move {
            while let Ok(sample) = subscriber.recv_async().await {
                let payload = sample.payload().to_bytes().into_owned();
                if tx.send((wheel, payload)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    while let Some((wheel, payload)) = rx.recv().await {
        if let Ok(cmd) = serde_json::from_slice::<MotorCommand>(&payload) {
            info!("{}: mode={:?} setpoint={:+.3} rad/s", wheel.tag(), cmd.mode, cmd.setpoint);
        } else if let Ok(fb) = serde_json::from_slice::<MotorFeedback>(&payload) {
            info!("{}: measured={:+.3} rad/s", wheel.tag(), fb.measured_velocity);
        } else {
            warn!("{}: undecodable payload ({} bytes)", wheel.tag(), payload.len());
        }
    }

    Ok(())
}
