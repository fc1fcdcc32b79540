use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::{fmt, str::FromStr};
use validator::{Validate, ValidationError};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub low_stock_threshold: i32,
}

impl Product {
    /// At or below the threshold counts as low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry < today)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Utc::now().date_naive())
    }
}

// Template-friendly product row with the category resolved to its name
#[derive(Debug, Clone, Serialize)]
pub struct ProductDisplay {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: String,
    pub low_stock_threshold: i32,
    pub is_low_stock: bool,
    pub is_expired: bool,
}

impl ProductDisplay {
    pub fn new(product: Product, categories: &[Category]) -> Self {
        let category_name = product
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let is_low_stock = product.is_low_stock();
        let is_expired = product.is_expired();

        Self {
            id: product.id,
            name: product.name,
            description: product.description.unwrap_or_default(),
            category_name,
            quantity: product.quantity,
            price: product.price,
            expiry_date: product
                .expiry_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            low_stock_threshold: product.low_stock_threshold,
            is_low_stock,
            is_expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Sale,
    Restock,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::Restock => "restock",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(TransactionKind::Sale),
            "restock" => Ok(TransactionKind::Restock),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// A transaction joined with the names a ledger screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub product_name: String,
    pub created_by_username: Option<String>,
}

/// A stock change handed to the store; the store applies it atomically.
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub product_id: Uuid,
    pub kind: TransactionKind,
    pub quantity: i32,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerFilter {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub product: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub low_stock: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category_id != Some(category) {
                return false;
            }
        }
        if self.low_stock == Some(true) && !product.is_low_stock() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product
                        .description
                        .as_deref()
                        .map_or(false, |d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 255, message = "Category name must be 1 to 255 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255, message = "Product name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_low_stock_threshold")]
    #[validate(range(min = 0, message = "Low stock threshold cannot be negative"))]
    pub low_stock_threshold: i32,
}

/// Editable product fields. Quantity is absent on purpose: it only moves
/// through recorded transactions, and sending it is rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 255, message = "Product name must be 1 to 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_low_stock_threshold")]
    #[validate(range(min = 0, message = "Low stock threshold cannot be negative"))]
    pub low_stock_threshold: i32,
}

/// Trims a free-text field; blank text means "not given".
fn trimmed_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Request bodies are trimmed before validation, so a whitespace-only name
// fails the length rule instead of being stored blank.
impl NewCategory {
    pub fn normalized(&self) -> Self {
        Self { name: self.name.trim().to_string() }
    }
}

impl NewProduct {
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trimmed_optional(&self.description),
            ..self.clone()
        }
    }
}

impl ProductChanges {
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trimmed_optional(&self.description),
            ..self.clone()
        }
    }
}

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// NUMERIC(10, 2), minimum 0.01.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let max = Decimal::new(10_000_000_000, 2);
    if *price < Decimal::new(1, 2) {
        return Err(ValidationError::new("price").with_message("Price must be at least 0.01".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price")
            .with_message("Price cannot have more than 2 decimal places".into()));
    }
    if *price >= max {
        return Err(ValidationError::new("price")
            .with_message("Price cannot have more than 10 digits".into()));
    }
    Ok(())
}
