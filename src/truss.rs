//! Core data structures for truss models and the solve pipeline that drives them.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use nalgebra::Vector3;
use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::errors::{AnalysisError, TrussEditError};
use crate::geometry::{Dimension, Force, Point};
use crate::member::MemberType;
use crate::options::SolverOptions;
use crate::recovery;
use crate::reduction;
use crate::results::SolveResult;
use crate::solver;
use crate::stiffness;
use crate::support::SupportType;

/// Identifier of a joint, chosen by the caller.
pub type JointId = usize;

/// Identifier of a member, chosen by the caller.
pub type MemberId = usize;

/// Internal representation of a truss joint.
#[derive(Clone, Debug)]
struct Joint {
    /// Caller-facing identifier.
    id: JointId,
    /// Position of the joint.
    position: Point,
    /// Boundary condition at the joint.
    support: SupportType,
}

/// Internal representation of a truss member.
#[derive(Clone, Debug)]
struct Member {
    /// Caller-facing identifier.
    id: MemberId,
    /// Section and material of the member.
    member_type: MemberType,
}

/// Read-only view of a joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointInfo {
    /// Joint identifier.
    pub id: JointId,
    /// Undeformed position.
    pub position: Point,
    /// Support condition.
    pub support: SupportType,
}

/// Read-only view of a member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberInfo {
    /// Member identifier.
    pub id: MemberId,
    /// Joint at endpoint 0. Internal force sign is measured from here.
    pub start: JointId,
    /// Joint at endpoint 1.
    pub end: JointId,
    /// Section and material.
    pub member_type: MemberType,
}

/// Joint data paired with its slot in the global degree-of-freedom numbering.
#[derive(Clone, Copy, Debug)]
pub(crate) struct JointSlot {
    /// Joint identifier.
    pub id: JointId,
    /// Zero-based joint slot; the joint's DOFs start at `slot * dimension`.
    pub slot: usize,
    /// Undeformed position.
    pub position: Point,
    /// Support condition.
    pub support: SupportType,
}

/// Member data with both endpoints resolved to joint slots.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MemberTopology {
    /// Member identifier.
    pub id: MemberId,
    /// Section and material.
    pub member_type: MemberType,
    /// Endpoint 0.
    pub start: JointSlot,
    /// Endpoint 1.
    pub end: JointSlot,
}

/// Container for a pin-jointed truss model.
///
/// The truss exclusively owns its joints, members and applied forces. Solving
/// produces a [`SolveResult`] that is attached to the truss by replacement.
#[derive(Clone, Debug)]
pub struct Truss {
    /// Number of spatial dimensions, fixed at construction.
    dimension: Dimension,
    /// Underlying graph storage for joints and members.
    graph: Graph<Joint, Member>,
    /// Lookup from joint id to graph node.
    joints: BTreeMap<JointId, NodeIndex>,
    /// Lookup from member id to graph edge.
    members: BTreeMap<MemberId, EdgeIndex>,
    /// Externally applied force per joint.
    forces: BTreeMap<JointId, Force>,
    /// Solver configuration.
    options: SolverOptions,
    /// Most recent successful result.
    result: Option<SolveResult>,
    /// Whether the attached result reflects the current model.
    result_current: bool,
}

impl Truss {
    /// Create an empty truss with default solver options.
    ///
    /// # Examples
    /// ```
    /// use spacetruss::{Dimension, Truss};
    ///
    /// let truss = Truss::new(Dimension::Three);
    /// assert_eq!(truss.joint_count(), 0);
    /// assert_eq!(truss.dof_count(), 0);
    /// ```
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self::with_options(dimension, SolverOptions::default())
    }

    /// Create an empty truss with explicit solver options.
    #[must_use]
    pub fn with_options(dimension: Dimension, options: SolverOptions) -> Self {
        Self {
            dimension,
            graph: Graph::new(),
            joints: BTreeMap::new(),
            members: BTreeMap::new(),
            forces: BTreeMap::new(),
            options,
            result: None,
            result_current: false,
        }
    }

    /// Dimension of the model.
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Solver options in use.
    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Replace the solver options.
    pub fn set_options(&mut self, options: SolverOptions) {
        self.invalidate();
        self.options = options;
    }

    /// Return the number of joints in the truss.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Total number of degrees of freedom, `dimension * joints`.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.joint_count() * self.dimension.count()
    }

    /// Add a new joint to the truss.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateJoint`] when `id` is taken,
    /// [`TrussEditError::OutOfPlane`] when a planar model receives a nonzero z
    /// coordinate, [`TrussEditError::NonFinite`] for NaN or infinite coordinates and
    /// [`TrussEditError::UnsupportedSupport`] when `support` does not exist in this
    /// dimension.
    ///
    /// # Examples
    /// ```
    /// use spacetruss::{point, Dimension, SupportType, Truss};
    ///
    /// let mut truss = Truss::new(Dimension::Two);
    /// truss.add_joint(3, point(1.0, 2.0, 0.0), SupportType::RollerY)?;
    /// assert_eq!(truss.joint_count(), 1);
    /// assert!(truss.add_joint(4, point(1.0, 2.0, 5.0), SupportType::Free).is_err());
    /// # Ok::<(), spacetruss::TrussEditError>(())
    /// ```
    pub fn add_joint(
        &mut self,
        id: JointId,
        position: Point,
        support: SupportType,
    ) -> Result<(), TrussEditError> {
        if self.joints.contains_key(&id) {
            return Err(TrussEditError::DuplicateJoint(id));
        }
        self.check_vector(id, position.to_vector())?;
        self.check_support(id, support)?;
        self.invalidate();
        let node = self.graph.add_node(Joint {
            id,
            position,
            support,
        });
        self.joints.insert(id, node);
        Ok(())
    }

    /// Connect two existing joints with a new member.
    ///
    /// `start` is endpoint 0 and `end` endpoint 1; a positive internal force pulls
    /// `end` away from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateMember`] when `id` is taken,
    /// [`TrussEditError::UnknownJoint`] when either endpoint does not exist,
    /// [`TrussEditError::SelfLoop`] when both endpoints are the same joint and
    /// [`TrussEditError::InvalidMemberProperties`] when `member_type` is not physical.
    pub fn add_member(
        &mut self,
        id: MemberId,
        start: JointId,
        end: JointId,
        member_type: MemberType,
    ) -> Result<(), TrussEditError> {
        if self.members.contains_key(&id) {
            return Err(TrussEditError::DuplicateMember(id));
        }
        let start_node = self.node(start)?;
        let end_node = self.node(end)?;
        if start == end {
            return Err(TrussEditError::SelfLoop {
                member: id,
                joint: start,
            });
        }
        member_type.validate(id)?;
        self.invalidate();
        let edge = self
            .graph
            .add_edge(start_node, end_node, Member { id, member_type });
        self.members.insert(id, edge);
        Ok(())
    }

    /// Apply an external force to a joint, adding to any force already there.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownJoint`] when `joint` is not part of this truss,
    /// [`TrussEditError::OutOfPlane`] for a nonzero z component in a planar model and
    /// [`TrussEditError::NonFinite`] for NaN or infinite components.
    pub fn add_external_force(&mut self, joint: JointId, load: Force) -> Result<(), TrussEditError> {
        self.node(joint)?;
        self.check_vector(joint, load.to_vector())?;
        self.invalidate();
        let entry = self.forces.entry(joint).or_default();
        *entry = Force::from(entry.to_vector() + load.to_vector());
        Ok(())
    }

    /// Remove every applied force.
    pub fn clear_external_forces(&mut self) {
        self.invalidate();
        self.forces.clear();
    }

    /// Change the support condition of an existing joint.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownJoint`] when `joint` is not part of this truss
    /// and [`TrussEditError::UnsupportedSupport`] when `support` does not exist in this
    /// dimension.
    pub fn set_support(
        &mut self,
        joint: JointId,
        support: SupportType,
    ) -> Result<(), TrussEditError> {
        let node = self.node(joint)?;
        self.check_support(joint, support)?;
        self.invalidate();
        self.graph[node].support = support;
        Ok(())
    }

    /// Look up a joint.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<JointInfo> {
        self.joints.get(&id).map(|node| {
            let joint = &self.graph[*node];
            JointInfo {
                id,
                position: joint.position,
                support: joint.support,
            }
        })
    }

    /// Iterate over joints in id order.
    pub fn joints(&self) -> impl Iterator<Item = JointInfo> + '_ {
        self.joints.keys().filter_map(move |id| self.joint(*id))
    }

    /// Look up a member.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<MemberInfo> {
        let edge = *self.members.get(&id)?;
        let (start, end) = self.graph.edge_endpoints(edge)?;
        Some(MemberInfo {
            id,
            start: self.graph[start].id,
            end: self.graph[end].id,
            member_type: self.graph[edge].member_type,
        })
    }

    /// Iterate over members in id order.
    pub fn members(&self) -> impl Iterator<Item = MemberInfo> + '_ {
        self.members.keys().filter_map(move |id| self.member(*id))
    }

    /// Total external force applied at a joint.
    #[must_use]
    pub fn external_force(&self, joint: JointId) -> Option<Force> {
        self.forces.get(&joint).copied()
    }

    /// Iterate over applied forces in joint id order.
    pub fn external_forces(&self) -> impl Iterator<Item = (JointId, Force)> + '_ {
        self.forces.iter().map(|(id, load)| (*id, *load))
    }

    /// Undeformed length of a member.
    #[must_use]
    pub fn member_length(&self, id: MemberId) -> Option<f64> {
        let member = self.member(id)?;
        let start = self.joint(member.start)?.position.to_vector();
        let end = self.joint(member.end)?.position.to_vector();
        Some((end - start).norm())
    }

    /// Total self weight of the structure, `sum(density * area * length)`.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.members()
            .filter_map(|member| {
                self.member_length(member.id)
                    .map(|length| member.member_type.weight(length))
            })
            .sum()
    }

    /// Most recent successful result, if any.
    ///
    /// The result survives later edits; use [`Truss::is_result_current`] to find out
    /// whether it still matches the model.
    #[must_use]
    pub fn result(&self) -> Option<&SolveResult> {
        self.result.as_ref()
    }

    /// Whether the attached result was produced from the current model.
    #[must_use]
    pub fn is_result_current(&self) -> bool {
        self.result.is_some() && self.result_current
    }

    /// Axial stress in a member from the attached result, positive in tension.
    #[must_use]
    pub fn member_stress(&self, id: MemberId) -> Option<f64> {
        let force = self.result.as_ref()?.internal_force(id)?;
        let member = self.member(id)?;
        Some(force / member.member_type.area)
    }

    /// Analyse the truss and attach the result.
    ///
    /// The previous result is replaced only when the analysis succeeds.
    ///
    /// # Errors
    ///
    /// See [`Truss::analyse`].
    pub fn solve(&mut self) -> Result<SolveResult, AnalysisError> {
        let result = self.analyse()?;
        self.result = Some(result.clone());
        self.result_current = true;
        Ok(result)
    }

    /// Run the direct stiffness method without touching the model.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateGeometry`] for zero-length members,
    /// [`AnalysisError::SingularStructure`] when the supports and connectivity do not
    /// make the structure stable and [`AnalysisError::EquilibriumViolation`] when the
    /// recovered reactions fail the equilibrium check.
    pub fn analyse(&self) -> Result<SolveResult, AnalysisError> {
        let dof = self.dof_count();
        debug!(
            "solving {} truss with {} joints, {} members, {} dofs",
            self.dimension,
            self.joint_count(),
            self.member_count(),
            dof
        );
        let components = connected_components(&self.graph);
        if components > 1 {
            warn!("truss has {components} disconnected sub-assemblies");
        }

        let stiffness = stiffness::assemble(self)?;
        let load = reduction::load_vector(self);
        let partition = reduction::partition(self);
        debug!(
            "partitioned dofs: {} free, {} restrained",
            partition.free.len(),
            partition.restrained.len()
        );
        let system = reduction::reduce(&stiffness, &load, &partition);
        let free_displacements = solver::solve(&system, &self.options)?;
        let displacements = recovery::expand(&partition, &free_displacements, dof);

        let joint_displacements = recovery::joint_displacements(self, &displacements);
        let internal_forces = recovery::member_forces(self, &displacements)?;
        let reactions = recovery::reactions(self, &partition, &stiffness, &displacements, &load);
        if self.options.check_equilibrium {
            recovery::check_equilibrium(
                self.forces.values().copied(),
                reactions.values().copied(),
                self.options.equilibrium_tolerance,
            )?;
        }

        let result = SolveResult::new(joint_displacements, internal_forces, reactions);
        if let Some((joint, displacement)) = result.max_displacement() {
            info!(
                "solved truss: max displacement {:.6e} at joint {joint}",
                displacement.magnitude()
            );
        }
        Ok(result)
    }

    /// Attach a result read from a document without solving.
    pub(crate) fn attach_result(&mut self, result: SolveResult) {
        self.result = Some(result);
        self.result_current = true;
    }

    /// Joints with their DOF slots, in slot order.
    pub(crate) fn joint_slots(&self) -> impl Iterator<Item = JointSlot> + '_ {
        self.graph.node_indices().map(move |node| self.slot(node))
    }

    /// Members with resolved endpoints, in insertion order.
    pub(crate) fn member_topology(&self) -> impl Iterator<Item = MemberTopology> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (start, end) = self.graph.edge_endpoints(edge)?;
            let member = &self.graph[edge];
            Some(MemberTopology {
                id: member.id,
                member_type: member.member_type,
                start: self.slot(start),
                end: self.slot(end),
            })
        })
    }

    /// Resolve a graph node into its slot view.
    fn slot(&self, node: NodeIndex) -> JointSlot {
        let joint = &self.graph[node];
        JointSlot {
            id: joint.id,
            slot: node.index(),
            position: joint.position,
            support: joint.support,
        }
    }

    /// Find the graph node of a joint.
    fn node(&self, joint: JointId) -> Result<NodeIndex, TrussEditError> {
        self.joints
            .get(&joint)
            .copied()
            .ok_or(TrussEditError::UnknownJoint(joint))
    }

    /// Reject non-finite vectors and out-of-plane components.
    fn check_vector(&self, joint: JointId, vector: Vector3<f64>) -> Result<(), TrussEditError> {
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(TrussEditError::NonFinite(joint));
        }
        if self.dimension == Dimension::Two && vector.z != 0.0 {
            return Err(TrussEditError::OutOfPlane(joint));
        }
        Ok(())
    }

    /// Reject supports that do not exist in this dimension.
    fn check_support(&self, joint: JointId, support: SupportType) -> Result<(), TrussEditError> {
        if support.is_valid_in(self.dimension) {
            Ok(())
        } else {
            Err(TrussEditError::UnsupportedSupport { joint, support })
        }
    }

    /// Mark the attached result as stale after an edit.
    fn invalidate(&mut self) {
        self.result_current = false;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};

    fn steel() -> MemberType {
        MemberType::new(0.01, 200.0e9, 7_850.0)
    }

    fn cantilever() -> Truss {
        let mut truss = Truss::new(Dimension::Three);
        truss
            .add_joint(0, point(0.0, 0.0, 0.0), SupportType::Pin)
            .expect("support joint");
        truss
            .add_joint(1, point(1.0, 0.0, 0.0), SupportType::Free)
            .expect("free joint");
        truss.add_member(0, 0, 1, steel()).expect("member");
        truss
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut truss = cantilever();
        assert_eq!(
            truss.add_joint(1, point(2.0, 0.0, 0.0), SupportType::Free),
            Err(TrussEditError::DuplicateJoint(1))
        );
        assert_eq!(
            truss.add_member(0, 1, 0, steel()),
            Err(TrussEditError::DuplicateMember(0))
        );
    }

    #[test]
    fn unknown_joints_are_rejected() {
        let mut truss = cantilever();
        assert_eq!(
            truss.add_member(1, 0, 9, steel()),
            Err(TrussEditError::UnknownJoint(9))
        );
        assert_eq!(
            truss.add_external_force(9, force(1.0, 0.0, 0.0)),
            Err(TrussEditError::UnknownJoint(9))
        );
        assert_eq!(
            truss.set_support(9, SupportType::Pin),
            Err(TrussEditError::UnknownJoint(9))
        );
        assert_eq!(truss.member_count(), 1);
    }

    #[test]
    fn self_loops_and_bad_properties_are_rejected() {
        let mut truss = cantilever();
        assert_eq!(
            truss.add_member(1, 1, 1, steel()),
            Err(TrussEditError::SelfLoop {
                member: 1,
                joint: 1
            })
        );
        let error = truss
            .add_member(1, 0, 1, MemberType::new(-1.0, 1.0, 0.0))
            .expect_err("negative area rejected");
        assert!(matches!(
            error,
            TrussEditError::InvalidMemberProperties(_)
        ));
    }

    #[test]
    fn planar_models_reject_out_of_plane_input() {
        let mut truss = Truss::new(Dimension::Two);
        assert_eq!(
            truss.add_joint(0, point(0.0, 0.0, 1.0), SupportType::Free),
            Err(TrussEditError::OutOfPlane(0))
        );
        assert_eq!(
            truss.add_joint(0, point(0.0, 0.0, 0.0), SupportType::RollerZ),
            Err(TrussEditError::UnsupportedSupport {
                joint: 0,
                support: SupportType::RollerZ
            })
        );
        truss
            .add_joint(0, point(0.0, 0.0, 0.0), SupportType::Free)
            .expect("planar joint");
        assert_eq!(
            truss.add_external_force(0, force(0.0, 1.0, 2.0)),
            Err(TrussEditError::OutOfPlane(0))
        );
        assert_eq!(
            truss.add_joint(1, point(f64::NAN, 0.0, 0.0), SupportType::Free),
            Err(TrussEditError::NonFinite(1))
        );
    }

    #[test]
    fn forces_on_the_same_joint_accumulate() {
        let mut truss = cantilever();
        truss
            .add_external_force(1, force(1.0, 2.0, 0.0))
            .expect("first load");
        truss
            .add_external_force(1, force(0.5, -2.0, 3.0))
            .expect("second load");
        assert_eq!(truss.external_force(1), Some(force(1.5, 0.0, 3.0)));
        truss.clear_external_forces();
        assert_eq!(truss.external_force(1), None);
    }

    #[test]
    fn axial_cantilever_matches_closed_form() {
        let mut truss = cantilever();
        // Restrain the transverse axes so the bar is stable.
        truss
            .set_support(1, SupportType::RollerY)
            .expect("support applied");
        truss
            .add_joint(2, point(1.0, 0.0, 1.0), SupportType::Pin)
            .expect("brace anchor");
        truss
            .add_member(1, 2, 1, steel())
            .expect("brace member");
        truss
            .add_external_force(1, force(-1_000.0, 0.0, 0.0))
            .expect("load applied");

        let result = truss.solve().expect("analysis succeeds");

        let displacement = result.displacement(1).expect("displacement available");
        let expected = -1_000.0 * 1.0 / (0.01 * 200.0e9);
        assert_relative_eq!(displacement.x, expected, epsilon = 1.0e-15);
        assert_relative_eq!(displacement.y, 0.0, epsilon = 1.0e-15);
        assert_relative_eq!(displacement.z, 0.0, epsilon = 1.0e-15);

        let axial = result.internal_force(0).expect("force available");
        assert_relative_eq!(axial, -1_000.0, epsilon = 1.0e-6);
        let stress = truss.member_stress(0).expect("stress available");
        assert_relative_eq!(stress, -100_000.0, epsilon = 1.0e-3);
        assert!(truss.is_result_current());
    }

    #[test]
    fn weight_sums_member_self_weight() {
        let mut truss = cantilever();
        truss
            .add_joint(2, point(1.0, 2.0, 2.0), SupportType::Free)
            .expect("joint");
        truss.add_member(1, 1, 2, steel()).expect("member");
        assert_relative_eq!(truss.weight(), 7_850.0 * 0.01 * (1.0 + 2.0 * 2.0_f64.sqrt()), epsilon = 1.0e-9);
        assert_relative_eq!(truss.member_length(1).expect("length"), 8.0_f64.sqrt());
    }

    #[test]
    fn edits_mark_results_stale_but_keep_them() {
        let mut truss = cantilever();
        truss.set_support(1, SupportType::Pin).expect("support");
        let result = truss.solve().expect("fully restrained truss solves");
        assert!(truss.is_result_current());

        truss
            .add_external_force(1, force(0.0, 1.0, 0.0))
            .expect("load");
        assert!(!truss.is_result_current());
        assert_eq!(truss.result(), Some(&result));
    }
}
