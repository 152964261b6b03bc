// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::motor::kinematics::BodyVelocity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// Velocity command from teleop/planners -> runtime (cmd_vel)
// Missing components deserialize as zero
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl Twist {
    /// Planar twist: only the components the base can follow
    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            linear: Vector3 { x, y, z: 0.0 },
            angular: Vector3 { x: 0.0, y: 0.0, z: yaw },
        }
    }
}

// Keeps linear.x, linear.y and angular.z, drops the rest
impl From<&Twist> for BodyVelocity {
    fn from(twist: &Twist) -> Self {
        Self {
            x: twist.linear.x,
            y: twist.linear.y,
            yaw: twist.angular.z,
        }
    }
}

/// Motor controller operating mode, encoded on the wire as the driver's integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum CommandMode {
    Stopped,
    Velocity,
    Position,
}

impl From<CommandMode> for i8 {
    fn from(mode: CommandMode) -> Self {
        match mode {
            CommandMode::Stopped => -1,
            CommandMode::Velocity => 0,
            CommandMode::Position => 1,
        }
    }
}

impl TryFrom<i8> for CommandMode {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(CommandMode::Stopped),
            0 => Ok(CommandMode::Velocity),
            1 => Ok(CommandMode::Position),
            other => Err(format!("unknown command mode {}", other)),
        }
    }
}

// Setpoint runtime -> motor driver, one per wheel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MotorCommand {
    pub mode: CommandMode,
    pub setpoint: f64, // rad/s in velocity mode
}

impl MotorCommand {
    pub fn velocity(setpoint: f64) -> Self {
        Self {
            mode: CommandMode::Velocity,
            setpoint,
        }
    }

    pub fn stopped() -> Self {
        Self {
            mode: CommandMode::Stopped,
            setpoint: 0.0,
        }
    }
}

// Simulated encoder reading runtime -> feedback consumers, one per wheel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct MotorFeedback {
    pub measured_velocity: f64, // rad/s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twist_partial_payload() {
        let twist: Twist = serde_json::from_str(r#"{"linear":{"x":0.5},"angular":{"z":-0.2}}"#)
            .unwrap();
        assert_eq!(twist, Twist::planar(0.5, 0.0, -0.2));

        let empty: Twist = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Twist::default());
    }

    #[test]
    fn test_twist_to_body_velocity() {
        let mut twist = Twist::planar(0.1, -0.2, 0.3);
        twist.linear.z = 9.0;
        twist.angular.x = 9.0;
        assert_eq!(BodyVelocity::from(&twist), BodyVelocity::new(0.1, -0.2, 0.3));
    }

    #[test]
    fn test_motor_command_wire_format() {
        let json = serde_json::to_value(MotorCommand::velocity(12.5)).unwrap();
        assert_eq!(json, serde_json::json!({"mode": 0, "setpoint": 12.5}));

        let json = serde_json::to_value(MotorCommand::stopped()).unwrap();
        assert_eq!(json, serde_json::json!({"mode": -1, "setpoint": 0.0}));

        let cmd: MotorCommand = serde_json::from_str(r#"{"mode":1,"setpoint":2.0}"#).unwrap();
        assert_eq!(cmd.mode, CommandMode::Position);
        assert!(serde_json::from_str::<MotorCommand>(r#"{"mode":7,"setpoint":2.0}"#).is_err());
    }

    #[test]
    fn test_motor_feedback_wire_format() {
        let json = serde_json::to_string(&MotorFeedback { measured_velocity: -3.0 }).unwrap();
        assert_eq!(json, r#"{"measured_velocity":-3.0}"#);
    }
}
