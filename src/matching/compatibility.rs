use serde::{Deserialize, Serialize};

use crate::core::types::BloodType;

/// Donor types that can give to each requested type (ABO/Rh)
#[must_use]
pub fn compatible_donors_for(requested: BloodType) -> &'static [BloodType] {
    use BloodType::{ANeg, APos, AbNeg, AbPos, BNeg, BPos, ONeg, OPos};

    match requested {
        ONeg => &[ONeg],
        OPos => &[ONeg, OPos],
        ANeg => &[ONeg, ANeg],
        APos => &[ONeg, OPos, ANeg, APos],
        BNeg => &[ONeg, BNeg],
        BPos => &[ONeg, OPos, BNeg, BPos],
        AbNeg => &[ONeg, ANeg, BNeg, AbNeg],
        AbPos => &BloodType::ALL,
    }
}

/// Whether a donor of `donor` type can give to a recipient of `requested` type.
///
/// O- donors are universal and AB+ recipients accept every type.
///
/// # Examples
///
/// ```
/// use donor_match::core::BloodType;
/// use donor_match::matching::compatibility::is_compatible;
///
/// assert!(is_compatible(BloodType::APos, BloodType::ONeg));
/// assert!(!is_compatible(BloodType::ONeg, BloodType::APos));
/// ```
#[must_use]
pub fn is_compatible(requested: BloodType, donor: BloodType) -> bool {
    compatible_donors_for(requested).contains(&donor)
}

/// How a compatible donor relates to the requested type.
///
/// Ordered by specificity: an exact match outranks a merely compatible type,
/// which outranks a donor that only qualifies as universal O-.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityKind {
    UniversalDonor,
    CompatibleType,
    ExactType,
}

impl CompatibilityKind {
    /// Classify a pair, or `None` when the donor cannot give
    #[must_use]
    pub fn classify(requested: BloodType, donor: BloodType) -> Option<Self> {
        if !is_compatible(requested, donor) {
            None
        } else if requested == donor {
            Some(Self::ExactType)
        } else if donor == BloodType::ONeg {
            Some(Self::UniversalDonor)
        } else {
            Some(Self::CompatibleType)
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::UniversalDonor => "universal donor",
            Self::CompatibleType => "compatible type",
            Self::ExactType => "exact type match",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BloodType::{ANeg, APos, AbNeg, AbPos, BNeg, BPos, ONeg, OPos};

    /// Full 8x8 table: (requested, donor, expected)
    #[rustfmt::skip]
    const TABLE: [(BloodType, [bool; 8]); 8] = [
        //           A+     A-     B+     B-     AB+    AB-    O+     O-
        (APos,  [true,  true,  false, false, false, false, true,  true ]),
        (ANeg,  [false, true,  false, false, false, false, false, true ]),
        (BPos,  [false, false, true,  true,  false, false, true,  true ]),
        (BNeg,  [false, false, false, true,  false, false, false, true ]),
        (AbPos, [true,  true,  true,  true,  true,  true,  true,  true ]),
        (AbNeg, [false, true,  false, true,  false, true,  false, true ]),
        (OPos,  [false, false, false, false, false, false, true,  true ]),
        (ONeg,  [false, false, false, false, false, false, false, true ]),
    ];

    #[test]
    fn test_all_64_pairs_match_table() {
        let mut checked = 0;
        for (requested, row) in TABLE {
            for (donor, expected) in BloodType::ALL.into_iter().zip(row) {
                assert_eq!(
                    is_compatible(requested, donor),
                    expected,
                    "requested {requested}, donor {donor}"
                );
                checked += 1;
            }
        }
        assert_eq!(checked, 64);
    }

    #[test]
    fn test_universal_recipient() {
        for donor in BloodType::ALL {
            assert!(is_compatible(AbPos, donor), "AB+ should accept {donor}");
        }
    }

    #[test]
    fn test_universal_donor() {
        for requested in BloodType::ALL {
            assert!(is_compatible(requested, ONeg), "O- should give to {requested}");
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            CompatibilityKind::classify(ONeg, ONeg),
            Some(CompatibilityKind::ExactType)
        );
        assert_eq!(
            CompatibilityKind::classify(APos, ONeg),
            Some(CompatibilityKind::UniversalDonor)
        );
        assert_eq!(
            CompatibilityKind::classify(APos, OPos),
            Some(CompatibilityKind::CompatibleType)
        );
        assert_eq!(CompatibilityKind::classify(ONeg, APos), None);
        assert_eq!(CompatibilityKind::classify(BNeg, BPos), None);
    }

    #[test]
    fn test_specificity_order() {
        assert!(CompatibilityKind::ExactType > CompatibilityKind::CompatibleType);
        assert!(CompatibilityKind::CompatibleType > CompatibilityKind::UniversalDonor);
    }
}
