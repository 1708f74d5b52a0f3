use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expiry::Severity;

/// Pantry item model - the star of the show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PantryItem {
    /// Opaque id, assigned at creation and immutable afterwards.
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
    #[serde(rename = "expiryDate")]
    pub expiry_date: ExpiryDate,
    #[serde(rename = "addedDate")]
    pub added_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PantryItem {
    /// New unsaved item: no id yet, expiry left for the prediction service,
    /// added today.
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        category: Category,
        added_date: NaiveDate,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            quantity,
            unit,
            category,
            expiry_date: ExpiryDate::Auto,
            added_date,
            notes: None,
        }
    }

    /// Field-level checks the store runs before any optimistic apply.
    /// A failure here means nothing was touched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(ValidationError::NegativeQuantity(self.quantity));
        }
        if matches!(self.expiry_date, ExpiryDate::Auto) {
            return Err(ValidationError::UnresolvedExpiry);
        }
        Ok(())
    }
}

/// Malformed item fields, caught before any state change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("item name must not be empty")]
    EmptyName,

    #[error("quantity must be a non-negative number, got {0}")]
    NegativeQuantity(f64),

    #[error("expiry date is still unresolved; no predictor available")]
    UnresolvedExpiry,
}

/// Measurement unit for a pantry quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pieces,
    Kg,
    G,
    L,
    Ml,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pieces => "pieces",
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
        }
    }

    pub fn all() -> Vec<Unit> {
        vec![Unit::Pieces, Unit::Kg, Unit::G, Unit::L, Unit::Ml]
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::all()
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown unit: {}", s))
    }
}

/// Item category, matching the backend's fixed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Fruits,
    Vegetables,
    Dairy,
    Meat,
    Seafood,
    Grains,
    Spices,
    Sauces,
    Baked,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Fruits => "fruits",
            Category::Vegetables => "vegetables",
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::Seafood => "seafood",
            Category::Grains => "grains",
            Category::Spices => "spices",
            Category::Sauces => "sauces",
            Category::Baked => "baked",
        }
    }

    pub fn all() -> Vec<Category> {
        vec![
            Category::General,
            Category::Fruits,
            Category::Vegetables,
            Category::Dairy,
            Category::Meat,
            Category::Seafood,
            Category::Grains,
            Category::Spices,
            Category::Sauces,
            Category::Baked,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Expiry field of an item: a concrete calendar date, or the `Auto`
/// sentinel meaning "ask the prediction service". The store never lets
/// `Auto` reach the sync adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ExpiryDate {
    Auto,
    Date(NaiveDate),
}

impl ExpiryDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ExpiryDate::Auto => None,
            ExpiryDate::Date(d) => Some(*d),
        }
    }
}

impl std::fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryDate::Auto => write!(f, "Auto"),
            ExpiryDate::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl std::str::FromStr for ExpiryDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ExpiryDate::Auto);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(ExpiryDate::Date)
            .map_err(|_| format!("not a calendar date: {}", s))
    }
}

impl TryFrom<String> for ExpiryDate {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ExpiryDate> for String {
    fn from(value: ExpiryDate) -> Self {
        value.to_string()
    }
}

/// One row of the expiry-alert list. Derived from the live item set plus
/// the current time; never persisted anywhere.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertEntry {
    pub item: PantryItem,
    pub days_until_expiry: i64,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn valid_item() -> PantryItem {
        PantryItem {
            id: "1".into(),
            name: "Milk".into(),
            quantity: 1.0,
            unit: Unit::L,
            category: Category::Dairy,
            expiry_date: ExpiryDate::Date(date("2026-09-01")),
            added_date: date("2026-08-25"),
            notes: None,
        }
    }

    #[test]
    fn valid_item_passes_validation() {
        assert!(valid_item().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut item = valid_item();
        item.name = "   ".into();
        assert_eq!(item.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut item = valid_item();
        item.quantity = -2.0;
        assert_eq!(item.validate(), Err(ValidationError::NegativeQuantity(-2.0)));
    }

    #[test]
    fn unresolved_auto_expiry_is_rejected() {
        let mut item = valid_item();
        item.expiry_date = ExpiryDate::Auto;
        assert_eq!(item.validate(), Err(ValidationError::UnresolvedExpiry));
    }

    #[test]
    fn expiry_date_parses_auto_and_dates() {
        assert_eq!("Auto".parse::<ExpiryDate>(), Ok(ExpiryDate::Auto));
        assert_eq!("auto".parse::<ExpiryDate>(), Ok(ExpiryDate::Auto));
        assert_eq!(
            "2026-09-01".parse::<ExpiryDate>(),
            Ok(ExpiryDate::Date(date("2026-09-01")))
        );
        assert!("next tuesday".parse::<ExpiryDate>().is_err());
    }

    #[test]
    fn expiry_date_round_trips_through_serde() {
        let auto: ExpiryDate = serde_json::from_str("\"Auto\"").unwrap();
        assert_eq!(auto, ExpiryDate::Auto);
        assert_eq!(serde_json::to_string(&auto).unwrap(), "\"Auto\"");

        let concrete: ExpiryDate = serde_json::from_str("\"2026-09-01\"").unwrap();
        assert_eq!(serde_json::to_string(&concrete).unwrap(), "\"2026-09-01\"");
    }

    #[test]
    fn unit_and_category_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Unit::Pieces).unwrap(), "\"pieces\"");
        assert_eq!(serde_json::to_string(&Category::Baked).unwrap(), "\"baked\"");
        assert_eq!("KG".parse::<Unit>(), Ok(Unit::Kg));
        assert_eq!("seafood".parse::<Category>(), Ok(Category::Seafood));
        assert!("bucket".parse::<Unit>().is_err());
    }
}
