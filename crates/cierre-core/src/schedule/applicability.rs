//! Applicability predicates attached to fee definitions.
//!
//! New conditions are added as variants here; the engine only ever calls
//! [`Applicability::evaluate`].

use cierre_types::{PropertyType, PurchaseScenario};
use serde::{Deserialize, Serialize};

/// When a fee definition applies to a scenario.
///
/// Unit variants are written as plain strings in the schedule (`"always"`,
/// `"foreign_restricted_zone"`); the others as single-key objects such as
/// `{"states": ["Quintana Roo"]}` or `{"all": ["foreign_buyer", "new_fideicomiso"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    #[default]
    Always,
    ForeignBuyer,
    RestrictedZone,
    /// Foreign buyer in the restricted zone: a fideicomiso is required
    ForeignRestrictedZone,
    /// A new trust is being set up
    NewFideicomiso,
    /// An existing trust is transferred or assigned
    FideicomisoTransfer,
    States(Vec<String>),
    PropertyTypes(Vec<PropertyType>),
    All(Vec<Applicability>),
    Any(Vec<Applicability>),
    Not(Box<Applicability>),
}

impl Applicability {
    pub fn evaluate(&self, scenario: &PurchaseScenario) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::ForeignBuyer => scenario.foreign_buyer,
            Applicability::RestrictedZone => scenario.restricted_zone,
            Applicability::ForeignRestrictedZone => scenario.requires_fideicomiso(),
            Applicability::NewFideicomiso => scenario.new_fideicomiso,
            Applicability::FideicomisoTransfer => !scenario.new_fideicomiso,
            Applicability::States(states) => {
                let wanted = normalize_state(&scenario.state);
                states.iter().any(|s| normalize_state(s) == wanted)
            }
            Applicability::PropertyTypes(types) => types.contains(&scenario.property_type),
            Applicability::All(items) => items.iter().all(|p| p.evaluate(scenario)),
            Applicability::Any(items) => items.iter().any(|p| p.evaluate(scenario)),
            Applicability::Not(inner) => !inner.evaluate(scenario),
        }
    }

    /// The states this predicate can ever be true for, normalized, or `None`
    /// when it is not restricted by state.
    pub fn state_scope(&self) -> Option<Vec<String>> {
        match self {
            Applicability::States(states) => {
                Some(states.iter().map(|s| normalize_state(s)).collect())
            }
            Applicability::All(items) => {
                items.iter().filter_map(Applicability::state_scope).reduce(|acc, scope| {
                    acc.into_iter().filter(|s| scope.contains(s)).collect()
                })
            }
            _ => None,
        }
    }

    /// Structural problems that make the predicate meaningless.
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            Applicability::States(states) if states.is_empty() => {
                Err("'states' predicate lists no states".to_string())
            }
            Applicability::States(states) if states.iter().any(|s| s.trim().is_empty()) => {
                Err("'states' predicate contains an empty state name".to_string())
            }
            Applicability::PropertyTypes(types) if types.is_empty() => {
                Err("'property_types' predicate lists no property types".to_string())
            }
            Applicability::All(items) | Applicability::Any(items) => {
                if items.is_empty() {
                    return Err("'all'/'any' predicate has no conditions".to_string());
                }
                items.iter().try_for_each(Applicability::check)
            }
            Applicability::Not(inner) => inner.check(),
            _ => Ok(()),
        }
    }
}

/// Canonical form of a state name: trimmed, lowercased, single-spaced, without accents.
pub fn normalize_state(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| match c {
                    'á' | 'Á' => 'a',
                    'é' | 'É' => 'e',
                    'í' | 'Í' => 'i',
                    'ó' | 'Ó' => 'o',
                    'ú' | 'Ú' | 'ü' | 'Ü' => 'u',
                    'ñ' | 'Ñ' => 'n',
                    other => other.to_ascii_lowercase(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario(foreign: bool, restricted: bool) -> PurchaseScenario {
        PurchaseScenario::new(dec!(300000), "Quintana Roo")
            .with_foreign_buyer(foreign)
            .with_restricted_zone(restricted)
    }

    #[test]
    fn fideicomiso_predicate_needs_both_flags() {
        let p = Applicability::ForeignRestrictedZone;
        assert!(p.evaluate(&scenario(true, true)));
        assert!(!p.evaluate(&scenario(true, false)));
        assert!(!p.evaluate(&scenario(false, true)));
        assert!(!p.evaluate(&scenario(false, false)));
    }

    #[test]
    fn parses_string_and_object_forms() {
        let p: Applicability = serde_json::from_str(
            r#"{"all": ["foreign_restricted_zone", {"not": "new_fideicomiso"}]}"#,
        )
        .unwrap();
        assert_eq!(
            p,
            Applicability::All(vec![
                Applicability::ForeignRestrictedZone,
                Applicability::Not(Box::new(Applicability::NewFideicomiso)),
            ])
        );
        let transfer = scenario(true, true).with_new_fideicomiso(false);
        assert!(p.evaluate(&transfer));
        assert!(!p.evaluate(&scenario(true, true)));

        assert!(serde_json::from_str::<Applicability>(r#""sometimes""#).is_err());
    }

    #[test]
    fn state_matching_ignores_case_and_accents() {
        let p = Applicability::States(vec!["Nuevo León".to_string()]);
        let s = PurchaseScenario::new(dec!(1), "  nuevo   leon ");
        assert!(p.evaluate(&s));
        assert_eq!(p.state_scope(), Some(vec!["nuevo leon".to_string()]));
    }

    #[test]
    fn state_scope_intersects_conjunctions() {
        let p = Applicability::All(vec![
            Applicability::States(vec!["Jalisco".into(), "Yucatán".into()]),
            Applicability::ForeignBuyer,
            Applicability::States(vec!["Yucatan".into()]),
        ]);
        assert_eq!(p.state_scope(), Some(vec!["yucatan".to_string()]));
        assert_eq!(Applicability::Any(vec![Applicability::Always]).state_scope(), None);
    }

    #[test]
    fn empty_lists_fail_the_check() {
        assert!(Applicability::States(vec![]).check().is_err());
        assert!(Applicability::Not(Box::new(Applicability::Any(vec![]))).check().is_err());
        assert!(Applicability::Always.check().is_ok());
    }
}
