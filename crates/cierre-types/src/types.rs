use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive monetary range with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountRange {
    /// Lower bound of the range
    pub min: Decimal,
    /// Upper bound of the range
    pub max: Decimal,
}

impl AmountRange {
    /// Creates a range, returning `None` when `min > max`.
    pub fn new(min: Decimal, max: Decimal) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// A degenerate range where `min == max`.
    pub const fn exact(amount: Decimal) -> Self {
        Self { min: amount, max: amount }
    }

    /// The empty-cost range.
    pub const fn zero() -> Self {
        Self::exact(Decimal::ZERO)
    }

    /// True when both bounds are equal.
    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    /// Adds two ranges bound by bound, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self { min: self.min.checked_add(other.min)?, max: self.max.checked_add(other.max)? })
    }
}

impl fmt::Display for AmountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

/// Kind of residential property being purchased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Condominium unit
    #[default]
    Condo,
    /// Detached house
    House,
    /// Townhouse
    Townhouse,
    /// Undeveloped lot
    Land,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Condo => write!(f, "Condo"),
            PropertyType::House => write!(f, "House"),
            PropertyType::Townhouse => write!(f, "Townhouse"),
            PropertyType::Land => write!(f, "Land"),
        }
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "condo" | "condominium" | "apartment" => Ok(PropertyType::Condo),
            "house" | "home" => Ok(PropertyType::House),
            "townhouse" => Ok(PropertyType::Townhouse),
            "land" | "lot" => Ok(PropertyType::Land),
            other => Err(format!("unknown property type '{other}'")),
        }
    }
}

/// Why an add-on fee could not be accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidAddOn {
    /// Neither `amount` nor a `min`/`max` pair was given, or both were
    MissingAmount(String),
    /// A bound was negative
    Negative(String),
    /// `min` exceeded `max`
    Inverted(String),
}

impl fmt::Display for InvalidAddOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAddOn::MissingAmount(label) => {
                write!(f, "add-on '{label}' needs either 'amount' or both 'min' and 'max'")
            }
            InvalidAddOn::Negative(label) => write!(f, "add-on '{label}' has a negative amount"),
            InvalidAddOn::Inverted(label) => write!(f, "add-on '{label}' has min greater than max"),
        }
    }
}

impl std::error::Error for InvalidAddOn {}

#[derive(Deserialize)]
struct RawAddOn {
    #[serde(default)]
    fee_id: Option<String>,
    label: String,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    min: Option<Decimal>,
    #[serde(default)]
    max: Option<Decimal>,
}

impl TryFrom<RawAddOn> for AddOn {
    type Error = InvalidAddOn;

    fn try_from(raw: RawAddOn) -> Result<Self, Self::Error> {
        let amount = match (raw.amount, raw.min, raw.max) {
            (Some(amount), None, None) => AmountRange::exact(amount),
            (None, Some(min), Some(max)) => {
                AmountRange::new(min, max).ok_or_else(|| InvalidAddOn::Inverted(raw.label.clone()))?
            }
            _ => return Err(InvalidAddOn::MissingAmount(raw.label)),
        };
        let mut add_on = AddOn::range(raw.label, amount)?;
        add_on.fee_id = raw.fee_id;
        Ok(add_on)
    }
}

/// A user-selected optional fee (title insurance, inspection, attorney, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAddOn")]
pub struct AddOn {
    /// Schedule fee id this add-on prices, when it corresponds to a `user_entered` definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_id: Option<String>,
    /// Display label
    pub label: String,
    /// Cost of the add-on
    #[serde(flatten)]
    pub amount: AmountRange,
}

impl AddOn {
    /// A single-amount add-on.
    pub fn fixed(label: impl Into<String>, amount: Decimal) -> Result<Self, InvalidAddOn> {
        Self::range(label, AmountRange::exact(amount))
    }

    /// An add-on priced as a range.
    pub fn range(label: impl Into<String>, amount: AmountRange) -> Result<Self, InvalidAddOn> {
        let label = label.into();
        if amount.min < Decimal::ZERO {
            return Err(InvalidAddOn::Negative(label));
        }
        if amount.min > amount.max {
            return Err(InvalidAddOn::Inverted(label));
        }
        Ok(Self { fee_id: None, label, amount })
    }

    /// Binds this add-on to a `user_entered` schedule definition.
    pub fn for_fee(mut self, fee_id: impl Into<String>) -> Self {
        self.fee_id = Some(fee_id.into());
        self
    }

    /// Whether this add-on prices the given schedule definition.
    ///
    /// An explicit `fee_id` wins; otherwise labels are compared case-insensitively.
    pub fn matches(&self, fee_id: &str, label: &str) -> bool {
        match &self.fee_id {
            Some(id) => id == fee_id,
            None => self.label.trim().eq_ignore_ascii_case(label.trim()),
        }
    }
}

fn default_new_fideicomiso() -> bool {
    true
}

/// The resolved purchase the caller wants an estimate for.
///
/// Built once per request and only ever borrowed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseScenario {
    /// Purchase price; must be positive
    pub purchase_price: Decimal,
    /// Kind of property
    #[serde(default)]
    pub property_type: PropertyType,
    /// Mexican state name, e.g. "Quintana Roo"
    pub state: String,
    /// Property lies in the restricted (coastal/border) zone
    #[serde(default)]
    pub restricted_zone: bool,
    /// Buyer is a foreign national
    #[serde(default)]
    pub foreign_buyer: bool,
    /// A new fideicomiso is set up (false means an existing trust is transferred/assigned)
    #[serde(default = "default_new_fideicomiso")]
    pub new_fideicomiso: bool,
    /// Cadastral/assessed value, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessed_value: Option<Decimal>,
    /// Optional user-entered fees
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

impl PurchaseScenario {
    /// Creates a domestic, unrestricted scenario with no add-ons.
    pub fn new(purchase_price: Decimal, state: impl Into<String>) -> Self {
        Self {
            purchase_price,
            property_type: PropertyType::default(),
            state: state.into(),
            restricted_zone: false,
            foreign_buyer: false,
            new_fideicomiso: true,
            assessed_value: None,
            add_ons: Vec::new(),
        }
    }

    /// Sets the property type.
    pub fn with_property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = property_type;
        self
    }

    /// Marks the property as inside or outside the restricted zone.
    pub fn with_restricted_zone(mut self, restricted_zone: bool) -> Self {
        self.restricted_zone = restricted_zone;
        self
    }

    /// Marks the buyer as foreign or domestic.
    pub fn with_foreign_buyer(mut self, foreign_buyer: bool) -> Self {
        self.foreign_buyer = foreign_buyer;
        self
    }

    /// Chooses between a new fideicomiso and a transfer of an existing one.
    pub fn with_new_fideicomiso(mut self, new_fideicomiso: bool) -> Self {
        self.new_fideicomiso = new_fideicomiso;
        self
    }

    /// Sets the assessed value.
    pub fn with_assessed_value(mut self, assessed_value: Decimal) -> Self {
        self.assessed_value = Some(assessed_value);
        self
    }

    /// Appends an add-on fee.
    pub fn with_add_on(mut self, add_on: AddOn) -> Self {
        self.add_ons.push(add_on);
        self
    }

    /// Foreign buyer purchasing in the restricted zone, i.e. a fideicomiso is required.
    pub fn requires_fideicomiso(&self) -> bool {
        self.foreign_buyer && self.restricted_zone
    }
}

/// One row of the estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Schedule fee id; `None` for pass-through add-ons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_id: Option<String>,
    /// Display label
    pub label: String,
    /// Lower estimate
    pub min: Decimal,
    /// Upper estimate
    pub max: Decimal,
    /// Advisory text, set when an assumption was applied or the schedule annotates the fee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineItem {
    /// The `(min, max)` pair as a range.
    pub fn range(&self) -> AmountRange {
        AmountRange { min: self.min, max: self.max }
    }
}

/// The complete output of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Line items in schedule order, followed by pass-through add-ons
    pub line_items: Vec<LineItem>,
    /// Sum of all line item minimums
    pub total_min: Decimal,
    /// Sum of all line item maximums
    pub total_max: Decimal,
    /// `total_min / purchase_price * 100`
    pub effective_min_pct: Decimal,
    /// `total_max / purchase_price * 100`
    pub effective_max_pct: Decimal,
}

impl CalculationResult {
    /// Finds the line item produced by a schedule definition.
    pub fn line_item(&self, fee_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.fee_id.as_deref() == Some(fee_id))
    }

    /// Totals as a range.
    pub fn total(&self) -> AmountRange {
        AmountRange { min: self.total_min, max: self.total_max }
    }
}
