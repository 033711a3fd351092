//! Solved response of a truss.

use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::geometry::{Displacement, Force};
use crate::truss::{JointId, MemberId};

/// Displacements, member forces and reactions produced by one solve.
///
/// A result is a value: solving again produces a fresh result that replaces the
/// previous one, never merges with it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveResult {
    /// Displacement of every joint, zero along restrained axes.
    displacements: BTreeMap<JointId, Displacement>,
    /// Signed axial force of every member, tension positive.
    internal_forces: BTreeMap<MemberId, f64>,
    /// Reaction at every supported joint, zero along free axes.
    reactions: BTreeMap<JointId, Force>,
}

impl SolveResult {
    /// Bundle recovered quantities into a result.
    pub(crate) fn new(
        displacements: BTreeMap<JointId, Displacement>,
        internal_forces: BTreeMap<MemberId, f64>,
        reactions: BTreeMap<JointId, Force>,
    ) -> Self {
        Self {
            displacements,
            internal_forces,
            reactions,
        }
    }

    /// Displacement of a joint.
    #[must_use]
    pub fn displacement(&self, joint: JointId) -> Option<Displacement> {
        self.displacements.get(&joint).copied()
    }

    /// Axial force in a member; positive in tension.
    #[must_use]
    pub fn internal_force(&self, member: MemberId) -> Option<f64> {
        self.internal_forces.get(&member).copied()
    }

    /// Reaction at a supported joint. Free joints have no reaction.
    #[must_use]
    pub fn reaction(&self, joint: JointId) -> Option<Force> {
        self.reactions.get(&joint).copied()
    }

    /// All joint displacements ordered by joint id.
    pub fn displacements(&self) -> impl Iterator<Item = (JointId, Displacement)> + '_ {
        self.displacements.iter().map(|(id, value)| (*id, *value))
    }

    /// All member forces ordered by member id.
    pub fn internal_forces(&self) -> impl Iterator<Item = (MemberId, f64)> + '_ {
        self.internal_forces.iter().map(|(id, value)| (*id, *value))
    }

    /// All reactions ordered by joint id.
    pub fn reactions(&self) -> impl Iterator<Item = (JointId, Force)> + '_ {
        self.reactions.iter().map(|(id, value)| (*id, *value))
    }

    /// Vector sum of every reaction.
    #[must_use]
    pub fn total_reaction(&self) -> Force {
        self.reactions
            .values()
            .fold(Vector3::<f64>::zeros(), |sum, reaction| {
                sum + reaction.to_vector()
            })
            .into()
    }

    /// Joint with the largest displacement magnitude, used to scale plots.
    #[must_use]
    pub fn max_displacement(&self) -> Option<(JointId, Displacement)> {
        self.displacements()
            .max_by(|a, b| a.1.magnitude().total_cmp(&b.1.magnitude()))
    }

    /// Member with the largest absolute axial force.
    #[must_use]
    pub fn max_internal_force(&self) -> Option<(MemberId, f64)> {
        self.internal_forces()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{displacement, force};

    fn sample() -> SolveResult {
        SolveResult::new(
            BTreeMap::from([
                (0, displacement(0.0, 0.0, 0.0)),
                (1, displacement(0.3, -0.4, 0.0)),
            ]),
            BTreeMap::from([(10, 12.0), (11, -40.0)]),
            BTreeMap::from([(0, force(1.0, 2.0, 0.0)), (2, force(-3.0, 0.5, 1.0))]),
        )
    }

    #[test]
    fn lookups_return_stored_values() {
        let result = sample();
        assert_eq!(result.displacement(1), Some(displacement(0.3, -0.4, 0.0)));
        assert_eq!(result.internal_force(11), Some(-40.0));
        assert_eq!(result.reaction(1), None);
        assert_eq!(result.total_reaction(), force(-2.0, 2.5, 1.0));
    }

    #[test]
    fn extremes_are_found_by_magnitude() {
        let result = sample();
        assert_eq!(result.max_displacement().map(|(id, _)| id), Some(1));
        assert_eq!(result.max_internal_force(), Some((11, -40.0)));
        assert_eq!(SolveResult::default().max_internal_force(), None);
    }
}
