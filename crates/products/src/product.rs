use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, ProductId};

use crate::timestamp::{RawTimestamp, is_blank, parse_timestamp};

/// Stock assigned to a new product when the caller does not say otherwise.
pub const DEFAULT_STOCK_COUNT: u32 = 1;

/// Products with fewer units than this are reported as low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// One purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub size: f64,
    pub color: String,
}

/// A catalog product as stored.
///
/// `category` holds the *name* of an existing category; it is resolved by the
/// integrity guard before every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    pub stock_count: u32,
    #[serde(default)]
    pub discount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied product fields for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub variants: Option<Vec<Variant>>,
    #[serde(default)]
    pub stock_count: Option<u32>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
}

impl ProductDraft {
    /// The supplied creation timestamp, if any. An empty string counts as
    /// not supplied.
    pub fn created_at(&self) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.created_at
            .as_ref()
            .filter(|raw| !is_blank(raw))
            .map(parse_timestamp)
            .transpose()
    }

    /// Field-level validation (references and timestamps are checked separately).
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        ensure_non_negative("price", self.price)?;
        if let Some(discount) = self.discount {
            ensure_non_negative("discount", discount)?;
        }
        for (idx, variant) in self.variants.iter().flatten().enumerate() {
            ensure_non_negative(&format!("variants[{idx}].size"), variant.size)?;
            if variant.color.trim().is_empty() {
                return Err(DomainError::validation(format!("variants[{idx}].color cannot be empty")));
            }
        }
        Ok(())
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

impl Product {
    /// Build a new product from a validated draft.
    pub fn create(id: ProductId, draft: ProductDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            price: draft.price,
            category: draft.category.trim().to_string(),
            variants: draft.variants.unwrap_or_default(),
            stock_count: draft.stock_count.unwrap_or(DEFAULT_STOCK_COUNT),
            discount: draft.discount.unwrap_or(0.0),
            image: draft.image,
            created_at,
        }
    }

    /// Apply a validated draft on top of this product.
    ///
    /// Required fields are replaced; optional fields the draft leaves out keep
    /// their current values, as does the creation time unless one is supplied.
    pub fn revise(&self, draft: ProductDraft, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: self.id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            price: draft.price,
            category: draft.category.trim().to_string(),
            variants: draft.variants.unwrap_or_else(|| self.variants.clone()),
            stock_count: draft.stock_count.unwrap_or(self.stock_count),
            discount: draft.discount.unwrap_or(self.discount),
            image: draft.image.or_else(|| self.image.clone()),
            created_at: created_at.unwrap_or(self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Linen Shirt".to_string(),
            description: "Breathable summer shirt".to_string(),
            price: 49.5,
            category: "Apparel".to_string(),
            variants: Some(vec![Variant {
                size: 42.0,
                color: "white".to_string(),
            }]),
            stock_count: None,
            discount: None,
            image: None,
            created_at: None,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let product = Product::create(ProductId::new(), draft(), Utc::now());
        assert_eq!(product.stock_count, DEFAULT_STOCK_COUNT);
        assert_eq!(product.discount, 0.0);
        assert_eq!(product.variants.len(), 1);
        assert!(product.image.is_none());
    }

    #[test]
    fn validate_rejects_blank_name_and_description() {
        let mut d = draft();
        d.name = "  ".to_string();
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));

        let mut d = draft();
        d.description = String::new();
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn validate_rejects_negative_or_non_finite_numbers() {
        let mut d = draft();
        d.price = -1.0;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.price = f64::NAN;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.discount = Some(-5.0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn validate_checks_each_variant() {
        let mut d = draft();
        d.variants = Some(vec![
            Variant { size: 40.0, color: "red".to_string() },
            Variant { size: 41.0, color: " ".to_string() },
        ]);
        match d.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("variants[1]")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn draft_created_at_parses_or_reports_invalid_timestamp() {
        let mut d = draft();
        assert_eq!(d.created_at().unwrap(), None);

        d.created_at = Some(RawTimestamp::Text("2023-05-01T00:00:00Z".to_string()));
        assert_eq!(
            d.created_at().unwrap(),
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
        );

        d.created_at = Some(RawTimestamp::Text("not-a-date".to_string()));
        assert!(matches!(d.created_at(), Err(DomainError::InvalidTimestamp(_))));

        d.created_at = Some(RawTimestamp::Text(String::new()));
        assert_eq!(d.created_at().unwrap(), None);
    }

    #[test]
    fn revise_keeps_unsupplied_optional_fields() {
        let mut d = draft();
        d.stock_count = Some(7);
        d.discount = Some(10.0);
        d.image = Some("uploads/shirt.png".to_string());
        let created = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let original = Product::create(ProductId::new(), d, created);

        let mut update = draft();
        update.name = "Linen Shirt v2".to_string();
        update.variants = None;
        let revised = original.revise(update, None);

        assert_eq!(revised.id, original.id);
        assert_eq!(revised.name, "Linen Shirt v2");
        assert_eq!(revised.stock_count, 7);
        assert_eq!(revised.discount, 10.0);
        assert_eq!(revised.image.as_deref(), Some("uploads/shirt.png"));
        assert_eq!(revised.variants, original.variants);
        assert_eq!(revised.created_at, created);
    }

    #[test]
    fn wire_form_is_camel_case() {
        let mut d = draft();
        d.stock_count = Some(3);
        let product = Product::create(ProductId::new(), d, Utc::now());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["stockCount"], 3);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image").is_none());

        let parsed: ProductDraft = serde_json::from_value(serde_json::json!({
            "name": "Mug",
            "description": "Ceramic",
            "price": 8,
            "category": "Kitchen",
            "stockCount": 12,
            "createdAt": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(parsed.stock_count, Some(12));
        assert!(parsed.variants.is_none());
    }
}
