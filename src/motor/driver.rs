// Per-wheel motor driver output for the mecanum base
//
// Publishes one message per wheel on four independent zenoh topics,
// following the roboteq driver naming (roboteq_driver_FLW/cmd, ...).

use tracing::{debug, info};
use zenoh::Session;
use zenoh::pubsub::Publisher;

use super::kinematics::{Transform, Wheel, WheelSpeeds};
use crate::config::wheel_topic;
use crate::messages::{MotorCommand, MotorFeedback};

/// Error types for driver output
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Failed to declare publisher on {topic}: {reason}")]
    Declare { topic: String, reason: String },

    #[error("Failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Topic leaf each transform publishes under
pub fn topic_leaf(output: Transform) -> &'static str {
    match output {
        Transform::Command => "cmd",
        Transform::Feedback => "feedback",
    }
}

/// JSON payload for one wheel
///
/// Command output is a velocity-mode setpoint, feedback output a measured velocity.
pub fn encode_wheel(output: Transform, speed: f64) -> Result<String, serde_json::Error> {
    // -0.0 + 0.0 == +0.0, keeps "-0.0" off the wire
    let speed = speed + 0.0;
    match output {
        Transform::Command => serde_json::to_string(&MotorCommand::velocity(speed)),
        Transform::Feedback => serde_json::to_string(&MotorFeedback {
            measured_velocity: speed,
        }),
    }
}

fn encode_stop(output: Transform) -> Result<String, serde_json::Error> {
    match output {
        Transform::Command => serde_json::to_string(&MotorCommand::stopped()),
        Transform::Feedback => serde_json::to_string(&MotorFeedback::default()),
    }
}

/// Driver topics in matrix order: FL, FR, RL, RR
pub fn wheel_topics(prefix: &str, output: Transform) -> Vec<(Wheel, String)> {
    Wheel::ALL
        .into_iter()
        .map(|wheel| (wheel, wheel_topic(prefix, wheel, topic_leaf(output))))
        .collect()
}

/// One payload per wheel, in matrix order
pub fn wheel_payloads(
    output: Transform,
    speeds: &WheelSpeeds,
) -> Result<Vec<(Wheel, String)>, serde_json::Error> {
    Wheel::ALL
        .into_iter()
        .map(|wheel| encode_wheel(output, speeds[wheel]).map(|payload| (wheel, payload)))
        .collect()
}

struct WheelOutput {
    topic: String,
    publisher: Publisher<'static>,
}

/// Motor driver output for the four mecanum wheels
pub struct MotorDriver {
    outputs: Vec<WheelOutput>, // indexed by Wheel::index
    output: Transform,
}

impl MotorDriver {
    /// Declare one publisher per wheel under `<prefix>_<TAG>/<leaf>`
    pub async fn declare(
        session: &Session,
        prefix: &str,
        output: Transform,
    ) -> Result<Self, DriverError> {
        let mut outputs = Vec::with_capacity(Wheel::ALL.len());

        for (wheel, topic) in wheel_topics(prefix, output) {
            let publisher = session
                .declare_publisher(topic.clone())
                .await
                .map_err(|e| DriverError::Declare {
                    topic: topic.clone(),
                    reason: e.to_string(),
                })?;
            info!("Publishing {:?} to: {}", wheel, topic);
            outputs.push(WheelOutput {
                topic,
                publisher,
            });
        }

        Ok(Self { outputs, output })
    }

    /// Send one message per wheel
    pub async fn set_wheel_speeds(&self, speeds: &WheelSpeeds) -> Result<(), DriverError> {
        debug!(
            "Setting wheel speeds: fl={:.3}, fr={:.3}, rl={:.3}, rr={:.3}",
            speeds.front_left, speeds.front_right, speeds.rear_left, speeds.rear_right
        );

        for (wheel, payload) in wheel_payloads(self.output, speeds)? {
            self.put(&self.outputs[wheel.index()], payload).await?;
        }
        Ok(())
    }

    /// Stop all motors
    pub async fn stop(&self) -> Result<(), DriverError> {
        info!("Stopping all motors");
        let payload = encode_stop(self.output)?;
        for out in &self.outputs {
            self.put(out, payload.clone()).await?;
        }
        Ok(())
    }

    /// Topics in matrix order
    pub fn topics(&self) -> Vec<&str> {
        self.outputs.iter().map(|out| out.topic.as_str()).collect()
    }

    async fn put(&self, out: &WheelOutput, payload: String) -> Result<(), DriverError> {
        out.publisher
            .put(payload)
            .await
            .map_err(|e| DriverError::Publish {
                topic: out.topic.clone(),
                reason: e.to_string(),
            })
    }
}
