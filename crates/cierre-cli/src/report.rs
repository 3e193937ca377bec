//! Printable estimate rendering
//!
//! Amounts stay exact through the engine; this is the only place they are
//! rounded, currency to whole units and percentages to one decimal place.

use chrono::NaiveDate;
use cierre_core::{CalculationResult, Decimal, FeeSchedule, PurchaseScenario};
use rust_decimal::RoundingStrategy;
use serde::Serialize;
use std::fmt::Write;

const MIN_DESCRIPTION_WIDTH: usize = 24;
const AMOUNT_WIDTH: usize = 12;

pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}")
}

pub fn format_percent(pct: Decimal) -> String {
    format!("{:.1}%", pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// One scenario's estimate ready for output
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub title: &'a str,
    pub currency: &'a str,
    pub prepared: NaiveDate,
    pub schedule: &'a FeeSchedule,
    pub scenario: &'a PurchaseScenario,
    pub result: &'a CalculationResult,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    prepared: NaiveDate,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_version: Option<&'a str>,
    scenario: &'a PurchaseScenario,
    result: &'a CalculationResult,
}

impl Report<'_> {
    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(JsonReport {
            title: self.title,
            prepared: self.prepared,
            currency: self.currency,
            schedule_version: self.schedule.metadata().version.as_deref(),
            scenario: self.scenario,
            result: self.result,
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        let scenario = self.scenario;
        let result = self.result;

        let description_width = result
            .line_items
            .iter()
            .map(|item| item.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(MIN_DESCRIPTION_WIDTH);
        let rule_width = description_width + 2 * (AMOUNT_WIDTH + 2) + 20;
        let prepared = format!("Prepared: {}", self.prepared.format("%-m/%-d/%Y"));

        let title_width = rule_width.saturating_sub(prepared.len());
        writeln!(out, "{:<title_width$}{prepared}", self.title)?;
        writeln!(out, "Closing Costs Estimation")?;
        if let Some(version) = self.schedule.metadata().version.as_deref() {
            writeln!(out, "Fee schedule {version}")?;
        }
        writeln!(out, "{}", "=".repeat(rule_width))?;
        writeln!(out)?;

        writeln!(out, "Purchase Summary")?;
        let price = format_currency(scenario.purchase_price);
        writeln!(out, "  {:<18}{} {}", "Purchase Price:", price, self.currency)?;
        writeln!(out, "  {:<18}{}", "Type:", scenario.property_type)?;
        writeln!(out, "  {:<18}{}", "State:", scenario.state)?;
        writeln!(out, "  {:<18}{}", "Restricted Zone:", yes_no(scenario.restricted_zone))?;
        writeln!(out, "  {:<18}{}", "Foreign Buyer:", yes_no(scenario.foreign_buyer))?;
        if scenario.requires_fideicomiso() {
            let trust = if scenario.new_fideicomiso { "New" } else { "Transfer" };
            writeln!(out, "  {:<18}{}", "Fideicomiso:", trust)?;
        }
        if let Some(assessed_value) = scenario.assessed_value {
            let assessed = format_currency(assessed_value);
            writeln!(out, "  {:<18}{} {}", "Assessed Value:", assessed, self.currency)?;
        }
        writeln!(out)?;

        writeln!(out, "Add-ons")?;
        if scenario.add_ons.is_empty() {
            writeln!(out, "  None")?;
        }
        for add_on in &scenario.add_ons {
            writeln!(out, "  - {}", add_on.label)?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "{:<description_width$}  {:>AMOUNT_WIDTH$}  {:>AMOUNT_WIDTH$}  Notes",
            "Description", "Min Amount", "Max Amount"
        )?;
        writeln!(out, "{}", "-".repeat(rule_width))?;
        for item in &result.line_items {
            let line = format!(
                "{:<description_width$}  {:>AMOUNT_WIDTH$}  {:>AMOUNT_WIDTH$}  {}",
                item.label,
                format_currency(item.min),
                format_currency(item.max),
                item.note.as_deref().unwrap_or(""),
            );
            writeln!(out, "{}", line.trim_end())?;
        }
        writeln!(out, "{}", "-".repeat(rule_width))?;
        writeln!(
            out,
            "{:<18}{} - {} {}",
            "Estimated Range:",
            format_currency(result.total_min),
            format_currency(result.total_max),
            self.currency
        )?;
        writeln!(
            out,
            "{:<18}{} - {}",
            "Effective Rate:",
            format_percent(result.effective_min_pct),
            format_percent(result.effective_max_pct)
        )?;

        let notes = &self.schedule.instructions().notes;
        if !notes.is_empty() {
            writeln!(out)?;
            for note in notes {
                writeln!(out, "* {note}")?;
            }
        }
        Ok(())
    }
}
