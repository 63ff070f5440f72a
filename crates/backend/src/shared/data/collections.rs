//! Collection schema table.
//!
//! Every inventory collection names its fields differently. The mapping
//! lives in one place and is resolved here, at the mapper boundary; the
//! rest of the service only sees `InventoryItem`.

use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a001_inventory_item::{InventoryItem, ItemCondition};
use contracts::enums::InventoryCategory;
use serde_json::{Map, Value};

use super::document_store::{Document, StoreError};

pub const LAPTOPS: &str = "laptops";
pub const MEDICATIONS: &str = "medications";
pub const FOOD_ITEMS: &str = "foodItems";
pub const OFFICE_SUPPLIES: &str = "officeSupplies";
pub const FURNITURE: &str = "furniture";

pub const CAMPUSES: &str = "campuses";
pub const HEALTH_REQUESTS: &str = "health_requests";
pub const LAPTOP_SUBMISSIONS: &str = "laptopSubmissions";
pub const LAPTOP_RETURNS: &str = "laptopReturns";
pub const NOTIFICATIONS: &str = "notifications";
pub const USER_NOTIFICATIONS: &str = "userNotifications";

/// Fields every inventory collection shares
pub const CAMPUS_REF_FIELD: &str = "campusRef";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Per-collection field names. `None` means the collection has no such field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub name: &'static str,
    pub quantity: &'static str,
    pub expiry: Option<&'static str>,
    pub condition: Option<&'static str>,
    pub assigned_to: Option<&'static str>,
    pub supplier: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSchema {
    pub collection: &'static str,
    pub category: InventoryCategory,
    pub fields: FieldMap,
}

/// Inventory collections in fixed order (category declaration order)
pub const INVENTORY_SCHEMAS: [CollectionSchema; 5] = [
    CollectionSchema {
        collection: LAPTOPS,
        category: InventoryCategory::It,
        fields: FieldMap {
            name: "model",
            quantity: "qty",
            expiry: None,
            condition: Some("condition"),
            assigned_to: Some("assignedTo"),
            supplier: Some("vendor"),
        },
    },
    CollectionSchema {
        collection: FOOD_ITEMS,
        category: InventoryCategory::Food,
        fields: FieldMap {
            name: "name",
            quantity: "quantity",
            expiry: Some("expiryDate"),
            condition: None,
            assigned_to: None,
            supplier: Some("supplier"),
        },
    },
    CollectionSchema {
        collection: MEDICATIONS,
        category: InventoryCategory::Health,
        fields: FieldMap {
            name: "medicineName",
            quantity: "stock",
            expiry: Some("expiry"),
            condition: None,
            assigned_to: None,
            supplier: Some("supplier"),
        },
    },
    CollectionSchema {
        collection: OFFICE_SUPPLIES,
        category: InventoryCategory::OfficeSupplies,
        fields: FieldMap {
            name: "itemName",
            quantity: "count",
            expiry: None,
            condition: None,
            assigned_to: None,
            supplier: Some("supplier"),
        },
    },
    CollectionSchema {
        collection: FURNITURE,
        category: InventoryCategory::Furniture,
        fields: FieldMap {
            name: "name",
            quantity: "quantity",
            expiry: None,
            condition: Some("condition"),
            assigned_to: Some("assignedTo"),
            supplier: Some("supplier"),
        },
    },
];

pub fn schema_for_category(category: InventoryCategory) -> &'static CollectionSchema {
    // ALL and INVENTORY_SCHEMAS share the same order
    &INVENTORY_SCHEMAS[category.ordinal().min(INVENTORY_SCHEMAS.len() - 1)]
}

pub fn schema_for_collection(collection: &str) -> Option<&'static CollectionSchema> {
    INVENTORY_SCHEMAS.iter().find(|s| s.collection == collection)
}

impl CollectionSchema {
    /// Map a stored document to an item. A persisted `status` is ignored.
    pub fn to_item(&self, doc: &Document) -> Result<InventoryItem, StoreError> {
        let f = &self.fields;
        let invalid = |reason: String| {
            StoreError::InvalidDocument(format!("{}/{}: {}", self.collection, doc.id, reason))
        };

        let name = doc
            .field(f.name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid(format!("missing '{}'", f.name)))?;

        let quantity = match doc.field(f.quantity) {
            None => 0,
            Some(v) => read_quantity(v)
                .ok_or_else(|| invalid(format!("bad '{}': {}", f.quantity, v)))?,
        };

        let expiry_date = match f.expiry.and_then(|field| doc.field(field)) {
            None => None,
            Some(v) => Some(read_date(v).ok_or_else(|| invalid(format!("bad expiry: {}", v)))?),
        };

        let condition = f
            .condition
            .and_then(|field| doc.field(field))
            .and_then(Value::as_str)
            .and_then(ItemCondition::from_code)
            .unwrap_or_default();

        let mut item = InventoryItem::new_for_insert(self.category, name, quantity);
        item.id = doc.id.clone();
        item.expiry_date = expiry_date;
        item.condition = condition;
        item.assigned_to = read_text(doc, f.assigned_to);
        item.supplier = read_text(doc, f.supplier);
        item.campus_ref = read_text(doc, Some(CAMPUS_REF_FIELD));
        item.updated_at = doc
            .field(UPDATED_AT_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));
        Ok(item)
    }

    /// Body for insert/update. Cleared optional fields are written as null
    /// so a shallow merge removes the old value.
    pub fn to_body(&self, item: &InventoryItem) -> Value {
        let f = &self.fields;
        let mut body = Map::new();
        body.insert(f.name.to_string(), Value::String(item.name.clone()));
        body.insert(f.quantity.to_string(), Value::from(item.quantity));
        if let Some(field) = f.expiry {
            body.insert(
                field.to_string(),
                item.expiry_date
                    .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                    .unwrap_or(Value::Null),
            );
        }
        if let Some(field) = f.condition {
            body.insert(field.to_string(), Value::String(item.condition.code().to_string()));
        }
        write_text(&mut body, f.assigned_to, &item.assigned_to);
        write_text(&mut body, f.supplier, &item.supplier);
        write_text(&mut body, Some(CAMPUS_REF_FIELD), &item.campus_ref);
        body.insert(
            UPDATED_AT_FIELD.to_string(),
            item.updated_at
                .map(|d| Value::String(d.to_rfc3339()))
                .unwrap_or(Value::Null),
        );
        Value::Object(body)
    }

    /// Patch that only touches the quantity field
    pub fn quantity_patch(&self, quantity: u32, updated_at: DateTime<Utc>) -> Value {
        let mut body = Map::new();
        body.insert(self.fields.quantity.to_string(), Value::from(quantity));
        body.insert(UPDATED_AT_FIELD.to_string(), Value::String(updated_at.to_rfc3339()));
        Value::Object(body)
    }
}

/// Integers, whole floats and numeric strings are accepted; negatives clamp to 0
fn read_quantity(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.max(0.0).min(u32::MAX as f64).round() as u32)
}

/// `YYYY-MM-DD` or a full RFC 3339 timestamp
fn read_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

fn read_text(doc: &Document, field: Option<&str>) -> Option<String> {
    field
        .and_then(|f| doc.field(f))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn write_text(body: &mut Map<String, Value>, field: Option<&str>, value: &Option<String>) {
    if let Some(field) = field {
        body.insert(
            field.to_string(),
            value.clone().map(Value::String).unwrap_or(Value::Null),
        );
    }
}
