//! Sensor and robot configuration.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Narrow-beam range sensor model.
///
/// Defaults match a chassis-mounted ultrasonic ranger: 3 m trustworthy
/// range, 15° wedge, ±2.5 cm measurement tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SonarConfig {
    /// Maximum trustworthy range (cm). Depends on mounting height.
    pub max_distance: f32,
    /// Full opening angle of the beam wedge (radians).
    pub opening_angle: f32,
    /// Range measurement tolerance (cm).
    pub distance_tolerance: f32,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            max_distance: 300.0,
            opening_angle: FRAC_PI_2 / 6.0,
            distance_tolerance: 5.0,
        }
    }
}

/// Physical robot footprint (cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub width: f32,
    pub length: f32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            length: 30.0,
        }
    }
}

impl RobotConfig {
    /// Footprint diagonal, the conservative extent that fits any rotation.
    #[inline]
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.length)
    }
}

/// Which way a sonar sounding was pointing, relative to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SonarMount {
    Left,
    Front,
    Right,
}

impl SonarMount {
    /// Mount sign: -1 left, 0 front, +1 right.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            SonarMount::Left => -1,
            SonarMount::Front => 0,
            SonarMount::Right => 1,
        }
    }

    /// Beam direction offset from the robot yaw (radians).
    #[inline]
    pub fn beam_offset(self) -> f32 {
        self.sign() as f32 * FRAC_PI_2
    }
}
