use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use stockroom_core::{DomainError, DomainResult, ItemId};

/// A stored inventory item, as returned to callers.
///
/// `id` is written as `id` on the wire but also read from `_id`, the key the
/// document store uses for its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "_id")]
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload: an item without identifier or timestamps.
///
/// Unknown keys, including `id` and the timestamps, are ignored; the store
/// assigns the identifier and the repository stamps the times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)
    }

    /// Build the document to insert. Both timestamps are `now`.
    pub fn into_document(self, now: DateTime<Utc>) -> Map<String, Value> {
        let stamp = timestamp(now);
        let mut doc = Map::new();
        doc.insert("name".to_string(), Value::String(self.name));
        doc.insert(
            "description".to_string(),
            self.description.map(Value::String).unwrap_or(Value::Null),
        );
        doc.insert("price".to_string(), Value::from(self.price));
        doc.insert("quantity".to_string(), Value::from(self.quantity));
        doc.insert("created_at".to_string(), stamp.clone());
        doc.insert("updated_at".to_string(), stamp);
        doc
    }
}

/// Partial update payload.
///
/// Each field is tri-state: `None` when the key was absent, `Some(None)` when
/// it was sent as `null`, `Some(Some(v))` otherwise. Only `description` may be
/// nulled. `id`, `created_at` and `updated_at` are rejected as unknown fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemUpdate {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub price: Option<Option<f64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub quantity: Option<Option<i64>>,
}

impl ItemUpdate {
    /// True when the request named no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none() && self.quantity.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        match &self.name {
            Some(None) => return Err(DomainError::validation("name may not be null")),
            Some(Some(name)) => validate_name(name)?,
            None => {}
        }
        match self.price {
            Some(None) => return Err(DomainError::validation("price may not be null")),
            Some(Some(price)) => validate_price(price)?,
            None => {}
        }
        match self.quantity {
            Some(None) => return Err(DomainError::validation("quantity may not be null")),
            Some(Some(quantity)) => validate_quantity(quantity)?,
            None => {}
        }
        Ok(())
    }

    /// Build the `$set` document: supplied keys only, plus `updated_at = now`.
    pub fn to_set_document(&self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut set = Map::new();
        if let Some(Some(name)) = &self.name {
            set.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(description) = &self.description {
            set.insert(
                "description".to_string(),
                description.clone().map(Value::String).unwrap_or(Value::Null),
            );
        }
        if let Some(Some(price)) = self.price {
            set.insert("price".to_string(), Value::from(price));
        }
        if let Some(Some(quantity)) = self.quantity {
            set.insert("quantity".to_string(), Value::from(quantity));
        }
        set.insert("updated_at".to_string(), timestamp(now));
        set
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() {
        return Err(DomainError::validation("price must be a finite number"));
    }
    if price < 0.0 {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

// Same text chrono's serde impl produces, so stored stamps read back unchanged.
fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
