#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod document;
mod errors;
mod geometry;
mod member;
mod options;
mod recovery;
mod reduction;
mod results;
mod solver;
mod stiffness;
mod support;
mod truss;

pub use document::{ForceRecord, JointRecord, MemberRecord, TrussDocument};
pub use errors::{AnalysisError, DocumentError, MemberPropertyError, TrussEditError};
pub use geometry::{displacement, force, point, Dimension, Displacement, Force, Point};
pub use member::MemberType;
pub use options::{LinearSolver, SolverOptions};
pub use results::SolveResult;
pub use support::SupportType;
pub use truss::{JointId, JointInfo, MemberId, MemberInfo, Truss};
