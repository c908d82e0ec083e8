// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Orientation to display transform mapping.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Chassis orientation as reported by the accelerometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    LeftUp,
    RightUp,
    BottomUp,
}

impl Orientation {
    /// The string the sensor service uses for this orientation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Normal => "normal",
            Orientation::LeftUp => "left-up",
            Orientation::RightUp => "right-up",
            Orientation::BottomUp => "bottom-up",
        }
    }

    /// Display rotation matching this orientation.
    pub fn rotation(&self) -> Rotation {
        match self {
            Orientation::Normal => Rotation::Normal,
            Orientation::LeftUp => Rotation::Left,
            Orientation::RightUp => Rotation::Right,
            Orientation::BottomUp => Rotation::Inverted,
        }
    }

    /// Input coordinate transform matching this orientation.
    pub fn matrix(&self) -> TransformMatrix {
        match self {
            Orientation::Normal => TransformMatrix::IDENTITY,
            Orientation::LeftUp => TransformMatrix::LEFT,
            Orientation::RightUp => TransformMatrix::RIGHT,
            Orientation::BottomUp => TransformMatrix::INVERTED,
        }
    }
}

impl FromStr for Orientation {
    type Err = UnknownOrientation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Orientation::Normal),
            "left-up" => Ok(Orientation::LeftUp),
            "right-up" => Ok(Orientation::RightUp),
            "bottom-up" => Ok(Orientation::BottomUp),
            other => Err(UnknownOrientation(other.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An orientation string outside the four known values (e.g. "undefined").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown orientation '{0}'")]
pub struct UnknownOrientation(pub String);

/// Rotation of the primary display output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Normal,
    Left,
    Right,
    Inverted,
}

impl Rotation {
    /// Name used by xrandr's `--rotate`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Normal => "normal",
            Rotation::Left => "left",
            Rotation::Right => "right",
            Rotation::Inverted => "inverted",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major 3x3 affine transform applied to an input device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix(pub [f64; 9]);

impl TransformMatrix {
    pub const IDENTITY: TransformMatrix =
        TransformMatrix([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    pub const INVERTED: TransformMatrix =
        TransformMatrix([-1.0, 0.0, 1.0, 0.0, -1.0, 1.0, 0.0, 0.0, 1.0]);
    pub const LEFT: TransformMatrix =
        TransformMatrix([0.0, -1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    pub const RIGHT: TransformMatrix =
        TransformMatrix([0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 1.0]);

    /// The nine values as separate command arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.0.iter().map(|v| v.to_string()).collect()
    }
}

impl fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_args().join(" "))
    }
}

/// Result of mapping an orientation reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub rotation: Rotation,
    pub matrix: TransformMatrix,
}

/// Map a sensor orientation string to the display rotation and input matrix.
///
/// Returns `None` for anything but the four known orientations.
pub fn map_orientation(name: &str) -> Option<DisplayTransform> {
    let orientation: Orientation = name.parse().ok()?;
    Some(DisplayTransform {
        rotation: orientation.rotation(),
        matrix: orientation.matrix(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_normal() {
        let t = map_orientation("normal").unwrap();
        assert_eq!(t.rotation, Rotation::Normal);
        assert_eq!(t.matrix, TransformMatrix::IDENTITY);
        assert_eq!(t.matrix.to_string(), "1 0 0 0 1 0 0 0 1");
    }

    #[test]
    fn test_map_left_up() {
        let t = map_orientation("left-up").unwrap();
        assert_eq!(t.rotation, Rotation::Left);
        assert_eq!(t.matrix.to_string(), "0 -1 1 1 0 0 0 0 1");
    }

    #[test]
    fn test_map_right_up() {
        let t = map_orientation("right-up").unwrap();
        assert_eq!(t.rotation, Rotation::Right);
        assert_eq!(t.matrix.to_string(), "0 1 0 -1 0 1 0 0 1");
    }

    #[test]
    fn test_map_bottom_up() {
        let t = map_orientation("bottom-up").unwrap();
        assert_eq!(t.rotation, Rotation::Inverted);
        assert_eq!(t.matrix.to_string(), "-1 0 1 0 -1 1 0 0 1");
    }

    #[test]
    fn test_map_unknown() {
        assert!(map_orientation("sideways").is_none());
        assert!(map_orientation("undefined").is_none());
        assert!(map_orientation("").is_none());
    }

    #[test]
    fn test_map_is_case_sensitive() {
        assert!(map_orientation("Normal").is_none());
        assert!(map_orientation("LEFT-UP").is_none());
    }

    #[test]
    fn test_orientation_round_trips_through_str() {
        for o in [
            Orientation::Normal,
            Orientation::LeftUp,
            Orientation::RightUp,
            Orientation::BottomUp,
        ] {
            assert_eq!(o.as_str().parse::<Orientation>(), Ok(o));
        }
    }

    #[test]
    fn test_unknown_orientation_error() {
        let err = "flat".parse::<Orientation>().unwrap_err();
        assert_eq!(err, UnknownOrientation("flat".to_string()));
        assert_eq!(err.to_string(), "unknown orientation 'flat'");
        let err: Box<dyn std::error::Error> = Box::new(err);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!(Rotation::Inverted.to_string(), "inverted");
        assert_eq!(Rotation::Left.as_str(), "left");
    }

    #[test]
    fn test_matrix_args() {
        assert_eq!(TransformMatrix::RIGHT.to_args().len(), 9);
        assert_eq!(TransformMatrix::RIGHT.to_args()[3], "-1");
    }
}
