//! JSON documents describing truss models and, optionally, their solved response.
//!
//! Vectors in a document carry exactly `dimension` components. A result document
//! additionally carries a displacement for every joint, a reaction for every
//! supported joint and an internal force for every member.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::DocumentError;
use crate::geometry::{components, from_components, Dimension, Displacement, Force, Point};
use crate::member::MemberType;
use crate::results::SolveResult;
use crate::support::SupportType;
use crate::truss::{JointId, MemberId, Truss};

/// Serialized form of a whole truss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrussDocument {
    /// Model dimension, 2 or 3.
    pub dimension: Dimension,
    /// Joints with positions and supports.
    pub joints: Vec<JointRecord>,
    /// Members with endpoints and section properties.
    pub members: Vec<MemberRecord>,
    /// Applied loads.
    #[serde(default)]
    pub forces: Vec<ForceRecord>,
    /// Structure self weight, written alongside results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Serialized joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointRecord {
    /// Joint identifier.
    pub id: JointId,
    /// Coordinates, one per dimension.
    pub position: Vec<f64>,
    /// Support condition.
    #[serde(default)]
    pub support: SupportType,
    /// Solved displacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<Vec<f64>>,
    /// Solved reaction, present for supported joints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Vec<f64>>,
}

/// Serialized member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberRecord {
    /// Member identifier.
    pub id: MemberId,
    /// Endpoint 0 and endpoint 1.
    pub joints: [JointId; 2],
    /// Section and material.
    pub member_type: MemberType,
    /// Solved axial force, tension positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_force: Option<f64>,
}

/// Serialized applied load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForceRecord {
    /// Loaded joint.
    pub joint: JointId,
    /// Force components, one per dimension.
    pub vector: Vec<f64>,
}

/// Parse a vector of `dimension` components or explain why it cannot be used.
fn vector(
    values: &[f64],
    dimension: Dimension,
    what: &str,
) -> Result<nalgebra::Vector3<f64>, DocumentError> {
    from_components(values, dimension).ok_or_else(|| {
        DocumentError::Malformed(format!(
            "{what} has {} components, expected {}",
            values.len(),
            dimension.count()
        ))
    })
}

impl TrussDocument {
    /// Capture a truss, including its attached result when there is one.
    #[must_use]
    pub fn from_truss(truss: &Truss) -> Self {
        let dimension = truss.dimension();
        let result = truss.result();
        let joints = truss
            .joints()
            .map(|joint| JointRecord {
                id: joint.id,
                position: components(joint.position.to_vector(), dimension),
                support: joint.support,
                displacement: result
                    .and_then(|result| result.displacement(joint.id))
                    .map(|value| components(value.to_vector(), dimension)),
                reaction: result
                    .and_then(|result| result.reaction(joint.id))
                    .map(|value| components(value.to_vector(), dimension)),
            })
            .collect();
        let members = truss
            .members()
            .map(|member| MemberRecord {
                id: member.id,
                joints: [member.start, member.end],
                member_type: member.member_type,
                internal_force: result.and_then(|result| result.internal_force(member.id)),
            })
            .collect();
        let forces = truss
            .external_forces()
            .map(|(joint, load)| ForceRecord {
                joint,
                vector: components(load.to_vector(), dimension),
            })
            .collect();
        Self {
            dimension,
            joints,
            members,
            forces,
            weight: result.map(|_| truss.weight()),
        }
    }

    /// Build a truss from the document.
    ///
    /// When `is_output_document` is set, the stored results are required and
    /// attached to the truss; otherwise result fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Model`] for duplicate ids, unknown joints and invalid
    /// properties and [`DocumentError::Malformed`] for vectors of the wrong length or
    /// missing results or results that contradict the supports.
    pub fn into_truss(self, is_output_document: bool) -> Result<Truss, DocumentError> {
        let dimension = self.dimension;
        let mut truss = Truss::new(dimension);
        for joint in &self.joints {
            let position = vector(&joint.position, dimension, "joint position")?;
            truss.add_joint(joint.id, Point::from(position), joint.support)?;
        }
        for member in &self.members {
            let [start, end] = member.joints;
            truss.add_member(member.id, start, end, member.member_type)?;
        }
        for load in &self.forces {
            let value = vector(&load.vector, dimension, "force vector")?;
            truss.add_external_force(load.joint, Force::from(value))?;
        }
        if is_output_document {
            let result = self.result()?;
            truss.attach_result(result);
        }
        debug!(
            "loaded {} truss with {} joints and {} members",
            dimension,
            truss.joint_count(),
            truss.member_count()
        );
        Ok(truss)
    }

    /// Collect the stored results, requiring every field a solve would produce.
    ///
    /// Stored values must respect the supports: restrained axes do not move, and
    /// only supported joints carry a reaction, along their restrained axes.
    fn result(&self) -> Result<SolveResult, DocumentError> {
        let dimension = self.dimension;
        let mut displacements = BTreeMap::new();
        let mut reactions = BTreeMap::new();
        for joint in &self.joints {
            let restrained = joint.support.restrained_axes(dimension);
            let values = joint.displacement.as_ref().ok_or_else(|| {
                DocumentError::Malformed(format!("joint {} has no displacement", joint.id))
            })?;
            let value = vector(values, dimension, "displacement")?;
            if let Some(axis) = (0..3).find(|axis| restrained[*axis] && value[*axis] != 0.0) {
                return Err(DocumentError::Malformed(format!(
                    "joint {} moves along restrained axis {axis}",
                    joint.id
                )));
            }
            displacements.insert(joint.id, Displacement::from(value));

            match (&joint.reaction, joint.support.is_supported(dimension)) {
                (Some(values), true) => {
                    let value = vector(values, dimension, "reaction")?;
                    if let Some(axis) =
                        (0..3).find(|axis| !restrained[*axis] && value[*axis] != 0.0)
                    {
                        return Err(DocumentError::Malformed(format!(
                            "joint {} has a reaction along free axis {axis}",
                            joint.id
                        )));
                    }
                    reactions.insert(joint.id, Force::from(value));
                }
                (None, true) => {
                    return Err(DocumentError::Malformed(format!(
                        "supported joint {} has no reaction",
                        joint.id
                    )));
                }
                (Some(_), false) => {
                    return Err(DocumentError::Malformed(format!(
                        "unsupported joint {} has a reaction",
                        joint.id
                    )));
                }
                (None, false) => {}
            }
        }
        let mut internal_forces = BTreeMap::new();
        for member in &self.members {
            let force = member.internal_force.ok_or_else(|| {
                DocumentError::Malformed(format!("member {} has no internal force", member.id))
            })?;
            internal_forces.insert(member.id, force);
        }
        Ok(SolveResult::new(displacements, internal_forces, reactions))
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Syntax`] for invalid JSON or missing fields.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Syntax`] when serialization fails. Non-finite numbers
    /// are written as `null` and only fail when read back.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Truss {
    /// Read a truss from a JSON document.
    ///
    /// With `is_output_document` set, the stored displacements, forces and reactions
    /// are attached without re-solving.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] when the file cannot be read and a malformed
    /// variant when its content does not describe a valid truss.
    pub fn load_from_document(
        path: impl AsRef<Path>,
        is_output_document: bool,
    ) -> Result<Truss, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        TrussDocument::from_json(&text)?.into_truss(is_output_document)
    }

    /// Write the truss, and its attached result if any, to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] when the file cannot be written.
    pub fn dump_to_document(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let text = TrussDocument::from_truss(self).to_json()?;
        fs::write(path, text).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote truss document to {}", path.display());
        Ok(())
    }
}
