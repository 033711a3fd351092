//! Post-solve recovery of member forces and support reactions.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector, Vector3};

use crate::errors::AnalysisError;
use crate::geometry::{Displacement, Force};
use crate::reduction::DofPartition;
use crate::stiffness::MemberAxis;
use crate::truss::{JointId, MemberId, Truss};

/// Scatter the free displacements into a full DOF vector, zero at restrained DOFs.
pub(crate) fn expand(partition: &DofPartition, free: &DVector<f64>, dof: usize) -> DVector<f64> {
    let mut displacements = DVector::zeros(dof);
    for (idx, &global) in partition.free.iter().enumerate() {
        displacements[global] = free[idx];
    }
    displacements
}

/// Read a joint's slice of a DOF-indexed vector.
fn joint_vector(values: &DVector<f64>, slot: usize, dim: usize) -> Vector3<f64> {
    let mut vector = Vector3::zeros();
    for axis in 0..dim {
        vector[axis] = values[slot * dim + axis];
    }
    vector
}

/// Displacement of every joint keyed by joint id.
pub(crate) fn joint_displacements(
    truss: &Truss,
    displacements: &DVector<f64>,
) -> BTreeMap<JointId, Displacement> {
    let dim = truss.dimension().count();
    truss
        .joint_slots()
        .map(|joint| {
            (
                joint.id,
                Displacement::from(joint_vector(displacements, joint.slot, dim)),
            )
        })
        .collect()
}

/// Axial force of every member, `EA/L * c . (u_end - u_start)`, tension positive.
pub(crate) fn member_forces(
    truss: &Truss,
    displacements: &DVector<f64>,
) -> Result<BTreeMap<MemberId, f64>, AnalysisError> {
    let dim = truss.dimension().count();
    let mut forces = BTreeMap::new();
    for member in truss.member_topology() {
        let axis = MemberAxis::of(&member)?;
        let start = joint_vector(displacements, member.start.slot, dim);
        let end = joint_vector(displacements, member.end.slot, dim);
        let elongation = axis.direction.dot(&(end - start));
        let force = member.member_type.axial_stiffness(axis.length) * elongation;
        forces.insert(member.id, force);
    }
    Ok(forces)
}

/// Reaction at every supported joint.
///
/// At a restrained DOF the internal nodal force `K[c, :] * u` balances the applied
/// load plus the reaction, so the reaction is `K[c, :] * u - F[c]`. Free axes of a
/// supported joint report zero.
pub(crate) fn reactions(
    truss: &Truss,
    partition: &DofPartition,
    stiffness: &DMatrix<f64>,
    displacements: &DVector<f64>,
    load: &DVector<f64>,
) -> BTreeMap<JointId, Force> {
    let dim = truss.dimension().count();
    let slots: Vec<JointId> = truss.joint_slots().map(|joint| joint.id).collect();
    let mut reactions: BTreeMap<JointId, Vector3<f64>> = BTreeMap::new();
    for &row in &partition.restrained {
        let value = stiffness.row(row).dot(&displacements.transpose()) - load[row];
        let reaction = reactions.entry(slots[row / dim]).or_insert_with(Vector3::zeros);
        reaction[row % dim] = value;
    }
    reactions
        .into_iter()
        .map(|(id, reaction)| (id, Force::from(reaction)))
        .collect()
}

/// Verify that applied loads and reactions sum to zero along every axis.
///
/// The allowed residual is `tolerance` times the summed magnitude of all applied
/// and reaction forces.
pub(crate) fn check_equilibrium(
    applied: impl Iterator<Item = Force>,
    reactions: impl Iterator<Item = Force>,
    tolerance: f64,
) -> Result<(), AnalysisError> {
    let mut residual = Vector3::zeros();
    let mut scale = 0.0;
    for force in applied.chain(reactions) {
        let vector = force.to_vector();
        residual += vector;
        scale += vector.abs().sum();
    }
    for (axis, value) in residual.iter().enumerate() {
        if value.abs() > tolerance * scale {
            return Err(AnalysisError::EquilibriumViolation {
                axis,
                residual: *value,
            });
        }
    }
    Ok(())
}
