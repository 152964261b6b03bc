// Mecanum inverse kinematics for a 4-wheel base
// Converts body-frame velocities (x, y, yaw) to individual wheel angular velocities.
//
// Reference matrix: Maulana, Muslim, Hendrayawan, "Inverse kinematic implementation of
// four-wheels mecanum drive mobile robot using stepper motors", ISITIA 2015.

use std::ops::Index;

/// Geometry validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{name} must be a finite value greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

/// Robot geometry and dynamic limits, fixed for the process lifetime.
///
/// Only constructible through [`RobotGeometry::new`], which rejects zero, negative
/// and non-finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotGeometry {
    alpha: f64,
    beta: f64,
    wheel_radius: f64,
    gearbox_ratio: f64,
    max_linear_speed: f64,
    max_angular_speed: f64,
}

impl RobotGeometry {
    /// # Arguments
    /// * `alpha` - Longitudinal distance from centroid to wheel axis (m)
    /// * `beta` - Lateral distance from centroid to wheel contact line (m)
    /// * `wheel_radius` - Wheel radius (m)
    /// * `gearbox_ratio` - Motor shaft speed / wheel shaft speed
    /// * `max_linear_speed` - Linear speed limit (m/s)
    /// * `max_angular_speed` - Yaw rate limit (rad/s)
    pub fn new(
        alpha: f64,
        beta: f64,
        wheel_radius: f64,
        gearbox_ratio: f64,
        max_linear_speed: f64,
        max_angular_speed: f64,
    ) -> Result<Self, GeometryError> {
        for (name, value) in [
            ("alpha", alpha),
            ("beta", beta),
            ("wheel_radius", wheel_radius),
            ("gearbox_ratio", gearbox_ratio),
            ("max_linear_speed", max_linear_speed),
            ("max_angular_speed", max_angular_speed),
        ] {
            // NaN fails both comparisons
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::NotPositive { name, value });
            }
        }

        Ok(Self {
            alpha,
            beta,
            wheel_radius,
            gearbox_ratio,
            max_linear_speed,
            max_angular_speed,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn gearbox_ratio(&self) -> f64 {
        self.gearbox_ratio
    }

    pub fn max_linear_speed(&self) -> f64 {
        self.max_linear_speed
    }

    pub fn max_angular_speed(&self) -> f64 {
        self.max_angular_speed
    }

    /// Yaw lever arm shared by all four wheels (alpha + beta)
    fn lever_arm(&self) -> f64 {
        self.alpha + self.beta
    }
}

/// Body-frame velocity command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyVelocity {
    pub x: f64,   // m/s, positive = forward
    pub y: f64,   // m/s, positive = left
    pub yaw: f64, // rad/s, positive = counter-clockwise
}

impl BodyVelocity {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    /// Magnitude of the planar linear velocity
    pub fn linear_speed(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction of travel in the body frame (rad)
    pub fn heading(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// Wheel positions, in inverse-kinematics matrix order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wheel {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Wheel {
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontLeft,
        Wheel::FrontRight,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    /// Short tag used in driver topic names
    pub fn tag(self) -> &'static str {
        match self {
            Wheel::FrontLeft => "FLW",
            Wheel::FrontRight => "FRW",
            Wheel::RearLeft => "RLW",
            Wheel::RearRight => "RRW",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Motors on the right side are mounted mirrored: +1 for FL/RL, -1 for FR/RR
    fn mount_sign(self) -> f64 {
        match self {
            Wheel::FrontLeft | Wheel::RearLeft => 1.0,
            Wheel::FrontRight | Wheel::RearRight => -1.0,
        }
    }

    /// Inverse-kinematics row (x, y, yaw) for this wheel
    fn ik_row(self, lever_arm: f64) -> [f64; 3] {
        match self {
            Wheel::FrontLeft => [1.0, -1.0, -lever_arm],
            Wheel::FrontRight => [1.0, 1.0, lever_arm],
            Wheel::RearLeft => [1.0, 1.0, -lever_arm],
            Wheel::RearRight => [1.0, -1.0, lever_arm],
        }
    }
}

/// Wheel angular velocities in rad/s
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    pub front_left: f64,
    pub front_right: f64,
    pub rear_left: f64,
    pub rear_right: f64,
}

impl WheelSpeeds {
    pub fn new(front_left: f64, front_right: f64, rear_left: f64, rear_right: f64) -> Self {
        Self {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    /// Returns speeds as array [front_left, front_right, rear_left, rear_right]
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.front_left,
            self.front_right,
            self.rear_left,
            self.rear_right,
        ]
    }

    fn from_array(w: [f64; 4]) -> Self {
        Self::new(w[0], w[1], w[2], w[3])
    }
}

impl Index<Wheel> for WheelSpeeds {
    type Output = f64;

    fn index(&self, wheel: Wheel) -> &f64 {
        match wheel {
            Wheel::FrontLeft => &self.front_left,
            Wheel::FrontRight => &self.front_right,
            Wheel::RearLeft => &self.rear_left,
            Wheel::RearRight => &self.rear_right,
        }
    }
}

/// Saturate a body velocity to the geometry's dynamic limits
///
/// The linear part is clamped on magnitude only, so heading is preserved.
/// The yaw rate keeps its sign.
pub fn clamp_body_velocity(cmd: &BodyVelocity, geometry: &RobotGeometry) -> BodyVelocity {
    let heading = cmd.heading();
    let v_linear = cmd.linear_speed().min(geometry.max_linear_speed);

    let max_yaw = geometry.max_angular_speed;
    let mut yaw = cmd.yaw;
    // Compare squares first: signum() is never evaluated for a zero yaw
    if yaw * yaw > max_yaw * max_yaw {
        yaw = max_yaw * yaw.signum();
    }

    BodyVelocity {
        x: v_linear * heading.cos(),
        y: v_linear * heading.sin(),
        yaw,
    }
}

/// Raw wheel contributions (m/s at the rollers), before mounting sign and scaling
///
/// No clamping is applied here.
pub fn wheel_contributions(v: &BodyVelocity, geometry: &RobotGeometry) -> [f64; 4] {
    let lever_arm = geometry.lever_arm();
    Wheel::ALL.map(|wheel| {
        let [jx, jy, jw] = wheel.ik_row(lever_arm);
        jx * v.x + jy * v.y + jw * v.yaw
    })
}

/// Convert a body velocity to motor-command wheel speeds (actuator path)
///
/// `w_k = -sign_k * (gearbox_ratio / 2) * (1 / wheel_radius) * raw_k`
pub fn body_to_wheel_cmd(cmd: &BodyVelocity, geometry: &RobotGeometry) -> WheelSpeeds {
    let clamped = clamp_body_velocity(cmd, geometry);
    let raw = wheel_contributions(&clamped, geometry);

    let mut w = [0.0f64; 4];
    for wheel in Wheel::ALL {
        let k = wheel.index();
        w[k] = -geometry.gearbox_ratio / 2.0
            * wheel.mount_sign()
            * (1.0 / geometry.wheel_radius)
            * raw[k];
    }
    WheelSpeeds::from_array(w)
}

/// Convert a body velocity to expected measured wheel speeds (feedback path)
///
/// Unlike [`body_to_wheel_cmd`] there is no gearbox factor and the overall sign is
/// not inverted: `w_k = sign_k * (1 / wheel_radius) * raw_k`.
pub fn body_to_wheel_feedback(cmd: &BodyVelocity, geometry: &RobotGeometry) -> WheelSpeeds {
    let clamped = clamp_body_velocity(cmd, geometry);
    let raw = wheel_contributions(&clamped, geometry);

    let mut w = [0.0f64; 4];
    for wheel in Wheel::ALL {
        let k = wheel.index();
        w[k] = wheel.mount_sign() * (1.0 / geometry.wheel_radius) * raw[k];
    }
    WheelSpeeds::from_array(w)
}

/// Which of the two wheel-speed transforms to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Motor setpoints, published as driver commands
    #[default]
    Command,
    /// Expected encoder readings, published as driver feedback
    Feedback,
}

impl Transform {
    pub fn apply(self, cmd: &BodyVelocity, geometry: &RobotGeometry) -> WheelSpeeds {
        match self {
            Transform::Command => body_to_wheel_cmd(cmd, geometry),
            Transform::Feedback => body_to_wheel_feedback(cmd, geometry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn default_geometry() -> RobotGeometry {
        RobotGeometry::new(0.31, 0.30, 0.075, 15.0, 1.0, PI / 6.0).unwrap()
    }

    #[test]
    fn test_geometry_rejects_invalid_values() {
        assert_eq!(
            RobotGeometry::new(0.31, 0.30, 0.0, 15.0, 1.0, 0.5),
            Err(GeometryError::NotPositive {
                name: "wheel_radius",
                value: 0.0
            })
        );
        assert!(RobotGeometry::new(-0.31, 0.30, 0.075, 15.0, 1.0, 0.5).is_err());
        assert!(RobotGeometry::new(0.31, 0.0, 0.075, 15.0, 1.0, 0.5).is_err());
        assert!(RobotGeometry::new(0.31, 0.30, 0.075, -1.0, 1.0, 0.5).is_err());
        assert!(RobotGeometry::new(0.31, 0.30, 0.075, 15.0, f64::NAN, 0.5).is_err());
        assert!(RobotGeometry::new(0.31, 0.30, 0.075, 15.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_velocity() {
        let g = default_geometry();
        let zero = BodyVelocity::default();
        assert_eq!(body_to_wheel_cmd(&zero, &g).as_array(), [0.0; 4]);
        assert_eq!(body_to_wheel_feedback(&zero, &g).as_array(), [0.0; 4]);
    }

    #[test]
    fn test_forward_motion() {
        let g = default_geometry();
        let cmd = BodyVelocity::new(1.0, 0.0, 0.0);

        // Every roller sees the same forward contribution
        let raw = wheel_contributions(&clamp_body_velocity(&cmd, &g), &g);
        assert_eq!(raw, [1.0, 1.0, 1.0, 1.0]);

        // 15 / 2 / 0.075 = 100, mirrored right-side motors flip sign
        let w = body_to_wheel_cmd(&cmd, &g);
        assert_relative_eq!(w.front_left, -100.0, epsilon = 1e-9);
        assert_relative_eq!(w.front_right, 100.0, epsilon = 1e-9);
        assert_relative_eq!(w.rear_left, -100.0, epsilon = 1e-9);
        assert_relative_eq!(w.rear_right, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_strafe_left() {
        let g = default_geometry();
        let raw = wheel_contributions(&BodyVelocity::new(0.0, 0.5, 0.0), &g);
        assert_eq!(raw, [-0.5, 0.5, 0.5, -0.5]);

        // After mirroring, the front pair and rear pair oppose each other
        let w = body_to_wheel_cmd(&BodyVelocity::new(0.0, 0.5, 0.0), &g);
        assert_relative_eq!(w.front_left, 50.0, epsilon = 1e-9);
        assert_relative_eq!(w.front_right, 50.0, epsilon = 1e-9);
        assert_relative_eq!(w.rear_left, -50.0, epsilon = 1e-9);
        assert_relative_eq!(w.rear_right, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_only() {
        let g = default_geometry();
        let cmd = BodyVelocity::new(0.0, 0.0, 0.4);

        // Left side pushes backward, right side forward, front/rear on a side match
        let raw = wheel_contributions(&cmd, &g);
        assert_relative_eq!(raw[0], -0.61 * 0.4, epsilon = 1e-12);
        assert_relative_eq!(raw[1], 0.61 * 0.4, epsilon = 1e-12);
        assert_eq!(raw[0], raw[2]);
        assert_eq!(raw[1], raw[3]);

        // Mirrored mounting makes all four setpoints equal
        let w = body_to_wheel_cmd(&cmd, &g);
        assert_relative_eq!(w.front_left, 100.0 * 0.61 * 0.4, epsilon = 1e-9);
        assert_eq!(w.front_left, w.rear_left);
        assert_eq!(w.front_right, w.rear_right);
        assert_relative_eq!(w.front_left, w.front_right, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_clamp_preserves_heading() {
        let g = default_geometry();
        let cmd = BodyVelocity::new(3.0, 4.0, 0.0);
        let clamped = clamp_body_velocity(&cmd, &g);
        assert_relative_eq!(clamped.linear_speed(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(clamped.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(clamped.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_clamp_boundary() {
        let g = default_geometry();

        let at_limit = clamp_body_velocity(&BodyVelocity::new(1.0, 0.0, 0.0), &g);
        assert_eq!(at_limit.x, 1.0);
        assert_eq!(at_limit.y, 0.0);

        let over = clamp_body_velocity(&BodyVelocity::new(1.0 + 1e-9, 0.0, 0.0), &g);
        assert_eq!(over.x, 1.0);

        let backwards = clamp_body_velocity(&BodyVelocity::new(-5.0, 0.0, 0.0), &g);
        assert_relative_eq!(backwards.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(backwards.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_clamp() {
        let g = default_geometry();
        let max = PI / 6.0;

        assert_eq!(clamp_body_velocity(&BodyVelocity::new(0.0, 0.0, 2.0), &g).yaw, max);
        assert_eq!(clamp_body_velocity(&BodyVelocity::new(0.0, 0.0, -2.0), &g).yaw, -max);
        assert_eq!(clamp_body_velocity(&BodyVelocity::new(0.0, 0.0, max), &g).yaw, max);
        assert_eq!(clamp_body_velocity(&BodyVelocity::new(0.0, 0.0, 0.0), &g).yaw, 0.0);
        assert_eq!(clamp_body_velocity(&BodyVelocity::new(0.0, 0.0, 0.1), &g).yaw, 0.1);
    }

    #[test]
    fn test_feedback_path_differs_from_command_path() {
        let g = default_geometry();
        let cmd = BodyVelocity::new(0.3, -0.2, 0.25);

        let command = body_to_wheel_cmd(&cmd, &g);
        let feedback = body_to_wheel_feedback(&cmd, &g);

        // Feedback = command / -(gearbox_ratio / 2)
        for wheel in Wheel::ALL {
            assert_relative_eq!(feedback[wheel], -command[wheel] / 7.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_transform_dispatch() {
        let g = default_geometry();
        let cmd = BodyVelocity::new(0.5, 0.1, -0.2);
        assert_eq!(Transform::Command.apply(&cmd, &g), body_to_wheel_cmd(&cmd, &g));
        assert_eq!(Transform::Feedback.apply(&cmd, &g), body_to_wheel_feedback(&cmd, &g));
        assert_eq!(Transform::default(), Transform::Command);
    }

    #[test]
    fn test_wheel_indexing() {
        let w = WheelSpeeds::new(1.0, 2.0, 3.0, 4.0);
        for (k, wheel) in Wheel::ALL.into_iter().enumerate() {
            assert_eq!(wheel.index(), k);
            assert_eq!(w[wheel], w.as_array()[k]);
        }
        assert_eq!(Wheel::RearLeft.tag(), "RLW");
    }
}
