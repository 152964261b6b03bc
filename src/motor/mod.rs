// Motor control module for the mecanum base
//
// Provides:
// - Mecanum inverse kinematics (body velocity -> wheel angular velocities)
// - Per-wheel driver output over zenoh

mod driver;
pub mod kinematics;

pub use driver::{
    DriverError, MotorDriver, encode_wheel, topic_leaf, wheel_payloads, wheel_topics,
};
pub use kinematics::{
    BodyVelocity, GeometryError, RobotGeometry, Transform, Wheel, WheelSpeeds, body_to_wheel_cmd,
    body_to_wheel_feedback, clamp_body_velocity,
};
