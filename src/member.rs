//! Section and material properties shared by truss members.

use serde::{Deserialize, Serialize};

use crate::errors::MemberPropertyError;
use crate::truss::MemberId;

/// Cross-section and material record assigned to a member.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberType {
    /// Cross-sectional area.
    pub area: f64,
    /// Elastic modulus.
    pub elastic_modulus: f64,
    /// Weight per unit volume, used for the structure's self weight.
    #[serde(default)]
    pub density: f64,
}

impl MemberType {
    /// Create a member type from area, elastic modulus and density.
    #[must_use]
    pub const fn new(area: f64, elastic_modulus: f64, density: f64) -> Self {
        Self {
            area,
            elastic_modulus,
            density,
        }
    }

    /// Axial stiffness `EA/L` for a member of the given length.
    #[must_use]
    pub fn axial_stiffness(&self, length: f64) -> f64 {
        self.elastic_modulus * self.area / length
    }

    /// Weight of a member of the given length.
    #[must_use]
    pub fn weight(&self, length: f64) -> f64 {
        self.density * self.area * length
    }

    /// Check that the properties are physically meaningful for `member`.
    ///
    /// # Errors
    ///
    /// Returns a [`MemberPropertyError`] describing the first offending value.
    pub fn validate(&self, member: MemberId) -> Result<(), MemberPropertyError> {
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(MemberPropertyError::NonPositiveArea {
                member,
                area: self.area,
            });
        }
        if !(self.elastic_modulus.is_finite() && self.elastic_modulus > 0.0) {
            return Err(MemberPropertyError::NonPositiveElasticModulus {
                member,
                elastic_modulus: self.elastic_modulus,
            });
        }
        if !(self.density.is_finite() && self.density >= 0.0) {
            return Err(MemberPropertyError::NegativeDensity {
                member,
                density: self.density,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn derived_quantities_scale_with_length() {
        let member_type = MemberType::new(0.5, 200.0, 3.0);
        assert_relative_eq!(member_type.axial_stiffness(4.0), 25.0);
        assert_relative_eq!(member_type.weight(4.0), 6.0);
    }

    #[test]
    fn invalid_properties_are_reported_with_the_member() {
        assert_eq!(
            MemberType::new(0.0, 1.0, 0.0).validate(7),
            Err(MemberPropertyError::NonPositiveArea {
                member: 7,
                area: 0.0
            })
        );
        assert!(matches!(
            MemberType::new(1.0, -5.0, 0.0).validate(2),
            Err(MemberPropertyError::NonPositiveElasticModulus { member: 2, .. })
        ));
        assert!(matches!(
            MemberType::new(1.0, 1.0, f64::NAN).validate(3),
            Err(MemberPropertyError::NegativeDensity { member: 3, .. })
        ));
        assert!(MemberType::new(1.0, 1.0e7, 0.0).validate(0).is_ok());
    }

    #[test]
    fn density_defaults_to_zero_when_omitted() {
        let parsed: MemberType =
            serde_json::from_str(r#"{"area": 2.0, "elastic_modulus": 3.0}"#).expect("parses");
        assert_eq!(parsed, MemberType::new(2.0, 3.0, 0.0));
    }
}
