//! Error types produced while editing, analysing or persisting trusses.

use std::path::PathBuf;

use thiserror::Error;

use crate::support::SupportType;
use crate::truss::{JointId, MemberId};

/// Error returned when a truss analysis fails.
///
/// A failed analysis never replaces the result already attached to the truss.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a member's endpoints coincide, leaving its direction undefined.
    #[error("member {member} has zero length; joints {start} and {end} coincide")]
    DegenerateGeometry {
        /// Identifier of the offending member.
        member: MemberId,
        /// First endpoint of the member.
        start: JointId,
        /// Second endpoint of the member.
        end: JointId,
    },
    /// Returned when the reduced stiffness matrix cannot be safely factorized.
    #[error(
        "structure is unstable: stiffness pivot ratio {measure:e} is below {tolerance:e}; \
         check supports and connectivity"
    )]
    SingularStructure {
        /// Smallest-to-largest pivot ratio observed while factorizing.
        measure: f64,
        /// Tolerance the ratio was compared against.
        tolerance: f64,
    },
    /// Returned when recovered reactions do not balance the applied loads.
    #[error("equilibrium violated along axis {axis}: residual force {residual:e}")]
    EquilibriumViolation {
        /// Axis index (0 = X, 1 = Y, 2 = Z).
        axis: usize,
        /// Sum of applied loads and reactions along the axis.
        residual: f64,
    },
}

/// Error returned when the properties assigned to a member are not physically meaningful.
///
/// The variants describe the reason the supplied value is rejected so callers can
/// present actionable feedback to users.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MemberPropertyError {
    /// Returned when the cross-sectional area is zero, negative or not finite.
    #[error("member {member}: area must be positive (received {area})")]
    NonPositiveArea {
        /// Identifier of the affected member.
        member: MemberId,
        /// Rejected cross-sectional area.
        area: f64,
    },
    /// Returned when the elastic modulus is zero, negative or not finite.
    #[error("member {member}: elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Identifier of the affected member.
        member: MemberId,
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
    /// Returned when the density is negative or not finite.
    #[error("member {member}: density must be non-negative (received {density})")]
    NegativeDensity {
        /// Identifier of the affected member.
        member: MemberId,
        /// Rejected density.
        density: f64,
    },
}

/// Error returned when editing a [`Truss`](crate::Truss).
///
/// # Examples
///
/// ```
/// use spacetruss::{point, Dimension, SupportType, Truss, TrussEditError};
///
/// let mut truss = Truss::new(Dimension::Three);
/// truss
///     .add_joint(0, point(0.0, 0.0, 0.0), SupportType::Pin)
///     .expect("first joint accepted");
/// let error = truss
///     .add_joint(0, point(1.0, 0.0, 0.0), SupportType::Free)
///     .expect_err("duplicate id is rejected");
/// assert_eq!(error, TrussEditError::DuplicateJoint(0));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrussEditError {
    /// Returned when a joint id is already in use.
    #[error("joint {0} already exists in this truss")]
    DuplicateJoint(JointId),
    /// Returned when a member id is already in use.
    #[error("member {0} already exists in this truss")]
    DuplicateMember(MemberId),
    /// Returned when a joint cannot be found in the truss.
    #[error("joint {0} does not exist in this truss")]
    UnknownJoint(JointId),
    /// Returned when a member would connect a joint to itself.
    #[error("member {member} connects joint {joint} to itself")]
    SelfLoop {
        /// Identifier of the rejected member.
        member: MemberId,
        /// Joint referenced at both ends.
        joint: JointId,
    },
    /// Returned when a planar model receives a position or force with a Z component.
    #[error("joint {0}: planar trusses cannot carry a nonzero z component")]
    OutOfPlane(JointId),
    /// Returned when a support type cannot be used in the model's dimension.
    #[error("joint {joint}: support {support} is not available in this dimension")]
    UnsupportedSupport {
        /// Joint receiving the support.
        joint: JointId,
        /// Rejected support type.
        support: SupportType,
    },
    /// Returned when a position or force contains NaN or infinite values.
    #[error("joint {0}: coordinates and forces must be finite")]
    NonFinite(JointId),
    /// Returned when the supplied member properties are invalid.
    #[error("{0}")]
    InvalidMemberProperties(#[from] MemberPropertyError),
}

/// Error returned when reading or writing a truss document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Returned when the document cannot be read from or written to disk.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when the document is not valid JSON or has missing or ill-typed fields.
    #[error("malformed truss document: {0}")]
    Syntax(#[from] serde_json::Error),
    /// Returned when the document describes an invalid model (duplicate ids,
    /// unknown joints, bad member properties and similar).
    #[error("malformed truss document: {0}")]
    Model(#[from] TrussEditError),
    /// Returned when a field is present but unusable, such as a vector of the wrong length
    /// or a result document lacking results.
    #[error("malformed truss document: {0}")]
    Malformed(String),
}

impl DocumentError {
    /// Whether the error describes the document's content rather than file access.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, DocumentError::Io { .. })
    }
}
