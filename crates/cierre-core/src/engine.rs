//! The closing-cost calculation engine.
//!
//! A single pass over the schedule: predicate, basis, calculator, line item.
//! The engine holds nothing but a shared reference to the schedule, so one
//! schedule can serve any number of engines at once.

use crate::error::{CierreError, CierreResult};
use crate::schedule::{Basis, FeeDefinition, FeeSchedule, Pricing};
use cierre_calculator::{AmountRange, Calculator, CalculatorError, CalculatorInputs};
use cierre_types::{AddOn, CalculationResult, Decimal, LineItem, PurchaseScenario};
use tracing::{debug, instrument};

/// Attached when an ISAI-style fee is computed without an assessed value.
pub const ASSESSED_VALUE_FALLBACK_NOTE: &str =
    "Assessed value not provided; estimated on purchase price";

pub struct CalculationEngine<'s> {
    schedule: &'s FeeSchedule,
}

impl<'s> CalculationEngine<'s> {
    pub fn new(schedule: &'s FeeSchedule) -> Self {
        Self { schedule }
    }

    /// Maps a scenario to its line items, totals and effective percentages.
    #[instrument(skip_all, fields(state = %scenario.state, price = %scenario.purchase_price))]
    pub fn calculate(&self, scenario: &PurchaseScenario) -> CierreResult<CalculationResult> {
        let price = scenario.purchase_price;
        if price <= Decimal::ZERO {
            return Err(CierreError::non_positive_price(price));
        }

        let mut consumed = vec![false; scenario.add_ons.len()];
        let mut line_items = Vec::new();

        for definition in self.schedule.definitions() {
            if !definition.applicability.evaluate(scenario) {
                debug!(fee_id = %definition.id, "fee not applicable");
                continue;
            }

            let (basis, assumption) = self.resolve_basis(definition, scenario);
            let range = match &definition.pricing {
                Pricing::UserEntered => {
                    match take_add_on(&scenario.add_ons, &mut consumed, definition) {
                        Some(add_on) => add_on.amount,
                        None => {
                            debug!(fee_id = %definition.id, "user-entered fee not selected");
                            continue;
                        }
                    }
                }
                Pricing::Schedule(_) | Pricing::PerState => {
                    let rate = self.schedule.rate_for(&definition.id, &scenario.state)?;
                    rate.calculate(&CalculatorInputs::new(basis))
                        .map_err(|e| CierreError::calculation(&definition.id, e))?
                }
            };

            if let Some(note) = &assumption {
                debug!(fee_id = %definition.id, note = %note, "assumption applied");
            }
            line_items.push(LineItem {
                fee_id: Some(definition.id.clone()),
                label: definition.label.clone(),
                min: range.min,
                max: range.max,
                note: join_notes(assumption, definition.note.as_deref()),
            });
        }

        for (add_on, _) in scenario.add_ons.iter().zip(&consumed).filter(|(_, used)| !**used) {
            line_items.push(LineItem {
                fee_id: None,
                label: add_on.label.clone(),
                min: add_on.amount.min,
                max: add_on.amount.max,
                note: None,
            });
        }

        let total = line_items
            .iter()
            .try_fold(AmountRange::zero(), |acc, item| acc.checked_add(item.range()))
            .ok_or_else(|| CierreError::calculation("total", CalculatorError::overflow("total")))?;
        let effective_min_pct = effective_pct(total.min, price)?;
        let effective_max_pct = effective_pct(total.max, price)?;

        debug!(
            items = line_items.len(),
            total_min = %total.min,
            total_max = %total.max,
            "calculation complete"
        );

        Ok(CalculationResult {
            line_items,
            total_min: total.min,
            total_max: total.max,
            effective_min_pct,
            effective_max_pct,
        })
    }

    /// Basis for percentage fees, plus the assumption note when one was needed.
    fn resolve_basis(
        &self,
        definition: &FeeDefinition,
        scenario: &PurchaseScenario,
    ) -> (Decimal, Option<String>) {
        let price = scenario.purchase_price;
        match definition.basis {
            Basis::PurchasePrice => (price, None),
            Basis::GreaterOfPriceAndAssessed => {
                match scenario.assessed_value.filter(|v| *v > Decimal::ZERO) {
                    Some(assessed) => (price.max(assessed), None),
                    None if definition.kind.uses_basis() => {
                        let note = self
                            .schedule
                            .instructions()
                            .assessed_value_note
                            .clone()
                            .unwrap_or_else(|| ASSESSED_VALUE_FALLBACK_NOTE.to_string());
                        (price, Some(note))
                    }
                    None => (price, None),
                }
            }
        }
    }
}

/// Convenience wrapper for a one-off calculation.
pub fn calculate(
    scenario: &PurchaseScenario,
    schedule: &FeeSchedule,
) -> CierreResult<CalculationResult> {
    CalculationEngine::new(schedule).calculate(scenario)
}

fn take_add_on<'a>(
    add_ons: &'a [AddOn],
    consumed: &mut [bool],
    definition: &FeeDefinition,
) -> Option<&'a AddOn> {
    let index = add_ons
        .iter()
        .enumerate()
        .position(|(i, a)| !consumed[i] && a.matches(&definition.id, &definition.label))?;
    consumed[index] = true;
    Some(&add_ons[index])
}

fn effective_pct(total: Decimal, price: Decimal) -> CierreResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(CierreError::non_positive_price(price));
    }
    total
        .checked_div(price)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            let source = CalculatorError::overflow("effective percentage");
            CierreError::calculation("effective_pct", source)
        })
}

fn join_notes(assumption: Option<String>, schedule_note: Option<&str>) -> Option<String> {
    match (assumption, schedule_note) {
        (Some(a), Some(s)) => Some(format!("{a}; {s}")),
        (Some(a), None) => Some(a),
        (None, Some(s)) => Some(s.to_string()),
        (None, None) => None,
    }
}
