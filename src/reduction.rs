//! Boundary reduction: partition DOFs by support and extract the free-free system.

use nalgebra::{DMatrix, DVector};

use crate::truss::Truss;

/// Global DOF indices split into free and restrained sets, both ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DofPartition {
    /// DOFs whose displacement is unknown.
    pub free: Vec<usize>,
    /// DOFs whose displacement is held at zero.
    pub restrained: Vec<usize>,
}

/// Reduced system `Kff * u_f = F_f`.
#[derive(Clone, Debug)]
pub(crate) struct ReducedSystem {
    /// Free-free block of the global stiffness matrix.
    pub stiffness: DMatrix<f64>,
    /// Loads at the free DOFs.
    pub load: DVector<f64>,
}

/// Place each joint's applied force into its DOF slots.
pub(crate) fn load_vector(truss: &Truss) -> DVector<f64> {
    let dim = truss.dimension().count();
    let mut load = DVector::zeros(truss.dof_count());
    for joint in truss.joint_slots() {
        if let Some(force) = truss.external_force(joint.id) {
            let base = joint.slot * dim;
            for (axis, value) in force.to_vector().iter().take(dim).enumerate() {
                load[base + axis] = *value;
            }
        }
    }
    load
}

/// Split DOFs according to each joint's support.
pub(crate) fn partition(truss: &Truss) -> DofPartition {
    let dimension = truss.dimension();
    let dim = dimension.count();
    let mut partition = DofPartition::default();
    for joint in truss.joint_slots() {
        let restrained = joint.support.restrained_axes(dimension);
        let base = joint.slot * dim;
        for (axis, fixed) in restrained.iter().take(dim).enumerate() {
            if *fixed {
                partition.restrained.push(base + axis);
            } else {
                partition.free.push(base + axis);
            }
        }
    }
    partition
}

/// Extract the free-free stiffness block and the free load entries.
///
/// Restrained displacements are always zero, so the coupling term
/// `K[f, c] * u_c` vanishes and the reduced load is simply `F[f]`.
pub(crate) fn reduce(
    stiffness: &DMatrix<f64>,
    load: &DVector<f64>,
    partition: &DofPartition,
) -> ReducedSystem {
    let free = &partition.free;
    let size = free.len();
    let mut k_ff = DMatrix::zeros(size, size);
    let mut f_f = DVector::zeros(size);
    for (row_idx, &row) in free.iter().enumerate() {
        f_f[row_idx] = load[row];
        for (col_idx, &col) in free.iter().enumerate() {
            k_ff[(row_idx, col_idx)] = stiffness[(row, col)];
        }
    }
    ReducedSystem {
        stiffness: k_ff,
        load: f_f,
    }
}
