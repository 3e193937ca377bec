//! The validated, immutable fee schedule.
//!
//! A schedule document is parsed and checked once by [`FeeSchedule::load`]; after
//! that the calculation engine works only with the typed model and never sees
//! raw JSON. Nothing in this module mutates a schedule after construction, so a
//! loaded schedule can be shared across threads behind an `Arc`.

mod applicability;
mod raw;

pub use applicability::{Applicability, normalize_state};

use crate::error::{CierreError, CierreResult};
use cierre_calculator::{CalcKind, Rate, RateFields};
use raw::{RawFeeDefinition, RawScheduleDocument};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};

/// Which monetary quantity a percentage is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    #[default]
    PurchasePrice,
    /// ISAI-style basis: the greater of purchase price and assessed value
    #[serde(alias = "isai")]
    GreaterOfPriceAndAssessed,
}

/// Where a definition's numbers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pricing {
    /// Values carried on the definition itself
    Schedule(Rate),
    /// Values looked up per state in the schedule's state rates
    PerState,
    /// Value supplied by a scenario add-on
    UserEntered,
}

/// One validated row of the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeDefinition {
    pub id: String,
    pub label: String,
    pub kind: CalcKind,
    pub applicability: Applicability,
    pub basis: Basis,
    pub pricing: Pricing,
    /// Display note from the schedule, e.g. "Recurring"
    pub note: Option<String>,
}

impl FeeDefinition {
    pub fn is_state_dependent(&self) -> bool {
        matches!(self.pricing, Pricing::PerState)
    }
}

/// Rates for one state, keyed by fee id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRates {
    /// State name as written in the schedule
    pub name: String,
    rates: BTreeMap<String, Rate>,
}

impl StateRates {
    pub fn rate(&self, fee_id: &str) -> Option<&Rate> {
        self.rates.get(fee_id)
    }

    pub fn fee_ids(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Interpretation rules shipped alongside the fee definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInstructions {
    /// Replaces the default note attached when an ISAI-style fee falls back to
    /// the purchase price
    #[serde(default)]
    pub assessed_value_note: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// An immutable, validated fee schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSchedule {
    metadata: ScheduleMetadata,
    definitions: Vec<FeeDefinition>,
    states: BTreeMap<String, StateRates>,
    instructions: CalculationInstructions,
    glossary: serde_json::Value,
}

impl FeeSchedule {
    /// Parses and validates a schedule document.
    #[instrument(skip_all, fields(bytes = raw_document.len()))]
    pub fn load(raw_document: &str) -> CierreResult<Self> {
        let document: RawScheduleDocument = serde_json::from_str(raw_document)
            .map_err(|e| CierreError::validation(format!("malformed fee schedule: {e}")))?;
        Self::from_document(document)
    }

    /// Validates an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> CierreResult<Self> {
        let document: RawScheduleDocument = serde_json::from_value(value)
            .map_err(|e| CierreError::validation(format!("malformed fee schedule: {e}")))?;
        Self::from_document(document)
    }

    fn from_document(document: RawScheduleDocument) -> CierreResult<Self> {
        if document.fee_definitions.is_empty() {
            warn!("fee schedule defines no fees");
        }

        let mut definitions = Vec::with_capacity(document.fee_definitions.len());
        let mut seen = BTreeSet::new();
        for raw in &document.fee_definitions {
            let definition = validate_definition(raw)?;
            if !seen.insert(definition.id.clone()) {
                return Err(CierreError::invalid_fee(
                    &definition.id,
                    format!("duplicate fee id '{}'", definition.id),
                ));
            }
            definitions.push(definition);
        }

        let states = build_state_rates(&definitions, &document.state_rates)?;
        check_state_coverage(&definitions, &states)?;

        debug!(
            version = document.metadata.version.as_deref().unwrap_or("unversioned"),
            fees = definitions.len(),
            states = states.len(),
            "fee schedule loaded"
        );

        Ok(Self {
            metadata: document.metadata,
            definitions,
            states,
            instructions: document.calculation_instructions,
            glossary: document.glossary,
        })
    }

    /// Looks up the concrete rate for a fee in a state.
    ///
    /// Fails with a lookup error when the fee id is unknown, when the fee is
    /// user-entered, or when the schedule carries state rates and `state` is not
    /// among them.
    pub fn rate_for(&self, fee_id: &str, state: &str) -> CierreResult<&Rate> {
        let definition =
            self.definition(fee_id).ok_or_else(|| CierreError::unknown_fee(fee_id))?;
        let state_rates = self.state(state);
        if state_rates.is_none() && (!self.states.is_empty() || definition.is_state_dependent()) {
            return Err(CierreError::unknown_state(state));
        }

        match &definition.pricing {
            Pricing::Schedule(rate) => Ok(rate),
            Pricing::PerState => state_rates
                .and_then(|s| s.rate(fee_id))
                .ok_or_else(|| CierreError::missing_rate(fee_id, state)),
            Pricing::UserEntered => Err(CierreError::Lookup {
                message: format!("fee '{fee_id}' is user entered and has no schedule rate"),
                fee_id: Some(fee_id.to_string()),
                state: Some(state.to_string()),
            }),
        }
    }

    /// Definitions in schedule order.
    pub fn definitions(&self) -> &[FeeDefinition] {
        &self.definitions
    }

    pub fn definition(&self, fee_id: &str) -> Option<&FeeDefinition> {
        self.definitions.iter().find(|d| d.id == fee_id)
    }

    /// Rates for a state, matched case- and accent-insensitively.
    pub fn state(&self, name: &str) -> Option<&StateRates> {
        self.states.get(&normalize_state(name))
    }

    /// State names as written in the schedule.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.values().map(|s| s.name.as_str())
    }

    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.metadata
    }

    pub fn instructions(&self) -> &CalculationInstructions {
        &self.instructions
    }

    /// Looks up a glossary entry when the glossary is a term → text map.
    pub fn glossary_term(&self, term: &str) -> Option<&str> {
        let entries = self.glossary.as_object()?;
        entries
            .get(term)
            .or_else(|| {
                entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(term)).map(|(_, v)| v)
            })
            .and_then(serde_json::Value::as_str)
    }
}

fn validate_definition(raw: &RawFeeDefinition) -> CierreResult<FeeDefinition> {
    let id = raw.id.trim();
    if id.is_empty() {
        return Err(CierreError::validation("fee definition with an empty id"));
    }
    if raw.label.trim().is_empty() {
        return Err(CierreError::invalid_fee(id, format!("fee '{id}' has an empty label")));
    }
    let kind: CalcKind = raw.calc_type.trim().parse().map_err(|_| {
        let message = format!("fee '{id}' has unrecognized calc_type '{}'", raw.calc_type);
        CierreError::invalid_fee(id, message)
    })?;
    raw.applies_when
        .check()
        .map_err(|reason| CierreError::invalid_fee(id, format!("fee '{id}': {reason}")))?;

    let fields = raw.fields();
    let pricing = match (kind, raw.state_dependent) {
        (CalcKind::UserEntered, true) => {
            return Err(CierreError::invalid_fee(
                id,
                format!("fee '{id}' is user_entered and cannot be state dependent"),
            ));
        }
        (CalcKind::UserEntered, false) => {
            if !fields.is_empty() {
                return Err(CierreError::invalid_fee(
                    id,
                    format!("fee '{id}' is user_entered and must not carry numeric values"),
                ));
            }
            Pricing::UserEntered
        }
        (_, true) => {
            if !fields.is_empty() {
                return Err(CierreError::invalid_fee(
                    id,
                    format!("fee '{id}' is state dependent; its values belong in state_rates"),
                ));
            }
            Pricing::PerState
        }
        (_, false) => Pricing::Schedule(
            Rate::from_fields(kind, &fields)
                .map_err(|e| CierreError::invalid_fee_field(id, "has invalid values", &e))?,
        ),
    };

    Ok(FeeDefinition {
        id: id.to_string(),
        label: raw.label.trim().to_string(),
        kind,
        applicability: raw.applies_when.clone(),
        basis: raw.basis,
        pricing,
        note: raw.note.clone().filter(|n| !n.trim().is_empty()),
    })
}

fn build_state_rates(
    definitions: &[FeeDefinition],
    raw_states: &BTreeMap<String, BTreeMap<String, RateFields>>,
) -> CierreResult<BTreeMap<String, StateRates>> {
    let mut states = BTreeMap::new();
    for (name, raw_rates) in raw_states {
        let key = normalize_state(name);
        if key.is_empty() {
            return Err(CierreError::validation("state_rates contains an empty state name"));
        }

        let mut rates = BTreeMap::new();
        for (fee_id, fields) in raw_rates {
            let context = format!("has invalid rate for state '{name}'");
            fields
                .check_non_negative()
                .map_err(|e| CierreError::invalid_fee_field(fee_id, &context, &e))?;

            let Some(definition) = definitions.iter().find(|d| &d.id == fee_id) else {
                warn!(state = %name, fee_id = %fee_id, "ignoring state rate for unknown fee");
                continue;
            };
            if !definition.is_state_dependent() {
                warn!(
                    state = %name,
                    fee_id = %fee_id,
                    "ignoring state rate for fee that is not state dependent"
                );
                continue;
            }
            let rate = Rate::from_fields(definition.kind, fields)
                .map_err(|e| CierreError::invalid_fee_field(fee_id, &context, &e))?;
            rates.insert(fee_id.clone(), rate);
        }

        let entry = StateRates { name: name.trim().to_string(), rates };
        if states.insert(key, entry).is_some() {
            return Err(CierreError::validation(format!(
                "state '{name}' appears more than once in state_rates"
            )));
        }
    }
    Ok(states)
}

/// Every state-dependent fee needs a rate in every state it can apply to.
fn check_state_coverage(
    definitions: &[FeeDefinition],
    states: &BTreeMap<String, StateRates>,
) -> CierreResult<()> {
    for definition in definitions.iter().filter(|d| d.is_state_dependent()) {
        if states.is_empty() {
            return Err(CierreError::invalid_fee(
                &definition.id,
                format!(
                    "fee '{}' is state dependent but the schedule has no state_rates",
                    definition.id
                ),
            ));
        }

        let referenced: Vec<String> = match definition.applicability.state_scope() {
            Some(scope) => scope,
            None => states.keys().cloned().collect(),
        };
        for key in referenced {
            let covered = states.get(&key).is_some_and(|s| s.rate(&definition.id).is_some());
            if !covered {
                let name = states.get(&key).map_or(key.as_str(), |s| s.name.as_str());
                return Err(CierreError::Validation {
                    message: format!(
                        "fee '{}' is state dependent but has no rate for state '{}'",
                        definition.id, name
                    ),
                    fee_id: Some(definition.id.clone()),
                    field: Some("state_rates".to_string()),
                });
            }
        }
    }
    Ok(())
}
