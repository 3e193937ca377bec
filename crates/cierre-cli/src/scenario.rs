//! Scenario input from command-line flags or JSON files

use anyhow::{Context, bail};
use clap::Args;
use cierre_core::{AddOn, AmountRange, Decimal, PropertyType, PurchaseScenario};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// An add-on given on the command line as `Label=1500` or `Label=500..800`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnArg(pub AddOn);

impl FromStr for AddOnArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, amount) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected LABEL=AMOUNT or LABEL=MIN..MAX, got '{s}'"))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(format!("add-on '{s}' has no label"));
        }

        let range = match amount.split_once("..") {
            Some((min, max)) => {
                let (min, max) = (parse_amount(min)?, parse_amount(max)?);
                AmountRange::new(min, max)
                    .ok_or_else(|| format!("add-on '{label}' has min greater than max"))?
            }
            None => AmountRange::exact(parse_amount(amount)?),
        };
        AddOn::range(label, range).map(AddOnArg).map_err(|e| e.to_string())
    }
}

/// Accepts `1500`, `1,500.00` and `$1,500`
fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw.trim().chars().filter(|c| !matches!(c, '$' | ',' | '_')).collect();
    Decimal::from_str(&cleaned).map_err(|_| format!("'{}' is not a valid amount", raw.trim()))
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// Purchase price
    #[arg(short, long)]
    pub price: Option<Decimal>,

    /// Mexican state, e.g. "Quintana Roo"
    #[arg(short, long)]
    pub state: Option<String>,

    /// condo, house, townhouse or land
    #[arg(long = "type", default_value = "condo")]
    pub property_type: PropertyType,

    /// Property is in the restricted (coastal/border) zone
    #[arg(long)]
    pub restricted_zone: bool,

    /// Buyer is a foreign national
    #[arg(long)]
    pub foreign_buyer: bool,

    /// An existing fideicomiso is assigned instead of creating a new one
    #[arg(long)]
    pub transfer: bool,

    /// Cadastral/assessed value, when known
    #[arg(long)]
    pub assessed_value: Option<Decimal>,

    /// Additional fee, LABEL=AMOUNT or LABEL=MIN..MAX (repeatable)
    #[arg(long = "addon", value_name = "LABEL=AMOUNT")]
    pub add_ons: Vec<AddOnArg>,
}

impl ScenarioArgs {
    pub fn has_scenario_flags(&self) -> bool {
        self.price.is_some() || self.state.is_some()
    }

    pub fn to_scenario(&self) -> anyhow::Result<PurchaseScenario> {
        let Some(price) = self.price else { bail!("--price is required") };
        let Some(state) = self.state.as_deref() else { bail!("--state is required") };

        let mut scenario = PurchaseScenario::new(price, state.trim())
            .with_property_type(self.property_type)
            .with_restricted_zone(self.restricted_zone)
            .with_foreign_buyer(self.foreign_buyer)
            .with_new_fideicomiso(!self.transfer);
        if let Some(assessed_value) = self.assessed_value {
            scenario = scenario.with_assessed_value(assessed_value);
        }
        for AddOnArg(add_on) in &self.add_ons {
            scenario = scenario.with_add_on(add_on.clone());
        }
        check_scenario(scenario)
    }
}

/// Reads one scenario object, or an array of them, from a JSON file
pub fn load_scenarios(path: &Path) -> anyhow::Result<Vec<PurchaseScenario>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read scenario file '{}'", path.display()))?;
    parse_scenarios(&raw).with_context(|| format!("invalid scenario file '{}'", path.display()))
}

pub fn parse_scenarios(raw: &str) -> anyhow::Result<Vec<PurchaseScenario>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let scenarios = if value.is_array() {
        serde_json::from_value::<Vec<PurchaseScenario>>(value)?
    } else {
        vec![serde_json::from_value::<PurchaseScenario>(value)?]
    };
    scenarios.into_iter().map(check_scenario).collect()
}

/// Collect scenarios from files first, then from flags
pub fn collect_scenarios(
    files: &[PathBuf],
    args: &ScenarioArgs,
) -> anyhow::Result<Vec<PurchaseScenario>> {
    let mut scenarios = Vec::new();
    for path in files {
        scenarios.extend(load_scenarios(path)?);
    }
    if args.has_scenario_flags() || scenarios.is_empty() {
        scenarios.push(args.to_scenario()?);
    }
    Ok(scenarios)
}

fn check_scenario(scenario: PurchaseScenario) -> anyhow::Result<PurchaseScenario> {
    if scenario.purchase_price <= Decimal::ZERO {
        bail!("purchase price must be positive, got {}", scenario.purchase_price);
    }
    if scenario.state.trim().is_empty() {
        bail!("state must not be empty");
    }
    Ok(scenario)
}
