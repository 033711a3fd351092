//! Support conditions and the translational axes each one restrains.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Dimension;

/// Boundary condition applied at a joint.
///
/// Rollers restrain only the axis normal to their rolling surface, so a
/// [`SupportType::RollerY`] joint can still slide along X (and Z in 3-D).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    /// Unsupported joint.
    #[default]
    Free,
    /// Pinned joint, every translation restrained.
    Pin,
    /// Fixed joint. Truss joints carry no rotations, so this restrains the same
    /// translations as [`SupportType::Pin`].
    Fixed,
    /// Roller restraining the X translation only.
    RollerX,
    /// Roller restraining the Y translation only.
    RollerY,
    /// Roller restraining the Z translation only. Only valid in 3-D models.
    RollerZ,
}

impl SupportType {
    /// Whether the support can be used in a model of the given dimension.
    #[must_use]
    pub const fn is_valid_in(self, dimension: Dimension) -> bool {
        !matches!((self, dimension), (SupportType::RollerZ, Dimension::Two))
    }

    /// Return which X, Y and Z translations are restrained.
    ///
    /// Axes beyond the model dimension are always reported as unrestrained.
    ///
    /// # Examples
    /// ```
    /// use spacetruss::{Dimension, SupportType};
    ///
    /// assert_eq!(
    ///     SupportType::Pin.restrained_axes(Dimension::Two),
    ///     [true, true, false]
    /// );
    /// assert_eq!(
    ///     SupportType::RollerY.restrained_axes(Dimension::Three),
    ///     [false, true, false]
    /// );
    /// ```
    #[must_use]
    pub const fn restrained_axes(self, dimension: Dimension) -> [bool; 3] {
        let planar = matches!(dimension, Dimension::Two);
        match self {
            SupportType::Free => [false, false, false],
            SupportType::Pin | SupportType::Fixed => [true, true, !planar],
            SupportType::RollerX => [true, false, false],
            SupportType::RollerY => [false, true, false],
            SupportType::RollerZ => [false, false, !planar],
        }
    }

    /// Whether any axis is restrained.
    #[must_use]
    pub const fn is_supported(self, dimension: Dimension) -> bool {
        let axes = self.restrained_axes(dimension);
        axes[0] || axes[1] || axes[2]
    }
}

impl fmt::Display for SupportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupportType::Free => "free",
            SupportType::Pin => "pin",
            SupportType::Fixed => "fixed",
            SupportType::RollerX => "roller_x",
            SupportType::RollerY => "roller_y",
            SupportType::RollerZ => "roller_z",
        };
        f.write_str(name)
    }
}
