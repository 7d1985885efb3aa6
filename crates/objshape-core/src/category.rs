//! Revit categories a DirectShape can be tagged with.
//!
//! Category names are matched case-sensitively against the variant names.
//! What happens to an unknown name is decided by [`CategoryPolicy`]:
//!
//! - [`CategoryPolicy::Skip`] yields no category, so the caller drops the
//!   object being converted;
//! - [`CategoryPolicy::Fallback`] substitutes a default category.
//!
//! Neither policy raises; an unknown category never fails a run.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::TRACING_TARGET_CONVERT;

/// Closed set of building element categories.
///
/// The discriminant is the value written to the `category` property of a
/// published DirectShape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr, VariantNames)]
pub enum RevitCategory {
    Casework,
    Ceilings,
    Columns,
    CurtainPanels,
    CurtainSystems,
    CurtainWallMullions,
    Doors,
    ElectricalEquipment,
    ElectricalFixtures,
    Entourage,
    Floors,
    Furniture,
    FurnitureSystems,
    #[default]
    GenericModel,
    LightingFixtures,
    Mass,
    MechanicalEquipment,
    Parking,
    Planting,
    PlumbingFixtures,
    Railings,
    Ramps,
    Roads,
    Roofs,
    Site,
    SpecialityEquipment,
    Stairs,
    StructuralColumns,
    StructuralFoundation,
    StructuralFraming,
    Topography,
    Walls,
    Windows,
}

impl RevitCategory {
    /// Parses a category name, exact and case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// Numeric code written to the `category` property.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Variant name, as written to `categoryName`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// How an unrecognised category name is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Resolve to nothing; the object is skipped.
    Skip,
    /// Resolve to the given category.
    Fallback(RevitCategory),
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::Fallback(RevitCategory::default())
    }
}

impl CategoryPolicy {
    /// Resolves a user supplied category name under this policy.
    pub fn resolve(self, name: &str) -> Option<RevitCategory> {
        if let Some(category) = RevitCategory::parse(name) {
            return Some(category);
        }

        match self {
            Self::Skip => {
                tracing::warn!(
                    target: TRACING_TARGET_CONVERT,
                    category = name,
                    "Invalid Revit category provided, skipping object conversion"
                );
                None
            }
            Self::Fallback(default) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONVERT,
                    category = name,
                    fallback = %default,
                    known = ?RevitCategory::VARIANTS,
                    "Invalid Revit category provided, using fallback"
                );
                Some(default)
            }
        }
    }

    /// Resolves a category name to a category in every case.
    ///
    /// Under [`CategoryPolicy::Skip`] an unknown name lands on the default
    /// category.
    pub fn resolve_or_default(self, name: &str) -> RevitCategory {
        self.resolve(name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(RevitCategory::parse("Walls"), Some(RevitCategory::Walls));
        assert_eq!(
            RevitCategory::parse("GenericModel"),
            Some(RevitCategory::GenericModel)
        );
        assert_eq!(RevitCategory::parse("walls"), None);
        assert_eq!(RevitCategory::parse(" Walls"), None);
        assert_eq!(RevitCategory::parse("Banana"), None);
        assert_eq!(RevitCategory::parse(""), None);
    }

    #[test]
    fn test_names_round_trip() {
        for category in RevitCategory::iter() {
            assert_eq!(RevitCategory::parse(category.name()), Some(category));
            assert_eq!(category.to_string(), category.name());
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let mut codes: Vec<i64> = RevitCategory::iter().map(RevitCategory::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), RevitCategory::VARIANTS.len());
    }

    #[test]
    fn test_skip_policy() {
        assert_eq!(
            CategoryPolicy::Skip.resolve("Walls"),
            Some(RevitCategory::Walls)
        );
        assert_eq!(CategoryPolicy::Skip.resolve("InvalidCategory"), None);
    }

    #[test]
    fn test_fallback_policy() {
        let policy = CategoryPolicy::default();
        assert_eq!(policy.resolve("Banana"), Some(RevitCategory::GenericModel));
        assert_eq!(policy.resolve("Walls"), Some(RevitCategory::Walls));
        assert_eq!(
            CategoryPolicy::Fallback(RevitCategory::Mass).resolve(""),
            Some(RevitCategory::Mass)
        );
    }

    #[test]
    fn test_resolve_or_default() {
        let policy = CategoryPolicy::default();
        assert_eq!(policy.resolve_or_default("Walls"), RevitCategory::Walls);
        assert_eq!(
            policy.resolve_or_default("Banana"),
            RevitCategory::GenericModel
        );
        assert_eq!(
            CategoryPolicy::Fallback(RevitCategory::Mass).resolve_or_default("Banana"),
            RevitCategory::Mass
        );
        assert_eq!(
            CategoryPolicy::Skip.resolve_or_default("Banana"),
            RevitCategory::default()
        );
    }
}
