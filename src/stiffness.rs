//! Global stiffness assembly.
//!
//! Each member contributes the block `EA/L * (c ⊗ c)` to the diagonal blocks of
//! its two joints and the negated block to the off-diagonal pair, see
//! <https://en.wikipedia.org/wiki/Direct_stiffness_method>.

use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::errors::AnalysisError;
use crate::truss::{MemberTopology, Truss};

/// Length and orientation of a member.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MemberAxis {
    /// Distance between the two endpoints.
    pub length: f64,
    /// Unit vector from endpoint 0 to endpoint 1 (the direction cosines).
    pub direction: Vector3<f64>,
}

impl MemberAxis {
    /// Compute the axis of a member from its endpoint positions.
    pub(crate) fn of(member: &MemberTopology) -> Result<Self, AnalysisError> {
        let delta = member.end.position.to_vector() - member.start.position.to_vector();
        let length = delta.norm();
        if length == 0.0 {
            return Err(AnalysisError::DegenerateGeometry {
                member: member.id,
                start: member.start.id,
                end: member.end.id,
            });
        }
        Ok(Self {
            length,
            direction: delta / length,
        })
    }
}

/// The `3x3` block `k * c * c^T` for one member.
///
/// Planar members have a zero z direction cosine, so only the leading `2x2`
/// part is ever read for them.
pub(crate) fn member_block(member: &MemberTopology, axis: &MemberAxis) -> Matrix3<f64> {
    let k = member.member_type.axial_stiffness(axis.length);
    axis.direction * axis.direction.transpose() * k
}

/// Assemble the global stiffness matrix of size `dof x dof`.
pub(crate) fn assemble(truss: &Truss) -> Result<DMatrix<f64>, AnalysisError> {
    let dim = truss.dimension().count();
    let dof = truss.dof_count();
    let mut matrix = DMatrix::zeros(dof, dof);
    for member in truss.member_topology() {
        let axis = MemberAxis::of(&member)?;
        let block = member_block(&member, &axis);
        let a = member.start.slot * dim;
        let b = member.end.slot * dim;
        for row in 0..dim {
            for col in 0..dim {
                let value = block[(row, col)];
                matrix[(a + row, a + col)] += value;
                matrix[(b + row, b + col)] += value;
                matrix[(a + row, b + col)] -= value;
                matrix[(b + row, a + col)] -= value;
            }
        }
    }
    Ok(matrix)
}
