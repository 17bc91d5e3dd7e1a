//! Product model and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quickmeds_core::{Price, ProductId};

/// Image filename used when a product is created without one.
pub const DEFAULT_IMAGE: &str = "default-medicine.png";

/// A purchasable item in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: String,
    pub image: String,
    pub stock: i32,
    pub requires_prescription: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /products`, after declarative validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: String,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub requires_prescription: Option<bool>,
}

/// Body of `PATCH /products/:id`.
///
/// An explicit allow-list of mutable fields; unknown keys are rejected at
/// deserialization rather than written through to the record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    pub requires_prescription: Option<bool>,
}

impl ProductUpdate {
    /// Shallow-merge the supplied fields onto an existing product.
    ///
    /// Name and category are trimmed the same way creation trims them.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_owned();
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_owned();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(requires_prescription) = self.requires_prescription {
            product.requires_prescription = requires_prescription;
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::random(),
            name: "Paracetamol 500mg".to_owned(),
            category: "Pain Relief".to_owned(),
            price: Price::new(dec!(25.00)).expect("valid price"),
            description: "Fast-acting pain and fever relief.".to_owned(),
            image: DEFAULT_IMAGE.to_owned(),
            stock: 10,
            requires_prescription: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut product = sample_product();
        let before = product.clone();

        let update: ProductUpdate =
            serde_json::from_value(serde_json::json!({ "price": 50 })).expect("valid update");
        update.apply_to(&mut product);

        assert_eq!(product.price, Price::new(dec!(50)).expect("valid price"));
        assert_eq!(product.name, before.name);
        assert_eq!(product.stock, before.stock);
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let err = serde_json::from_value::<ProductUpdate>(serde_json::json!({ "isAdmin": true }));
        assert!(err.is_err());
    }

    #[test]
    fn test_update_trims_name_and_category() {
        let mut product = sample_product();
        let update: ProductUpdate = serde_json::from_value(serde_json::json!({
            "name": "  Ibuprofen  ",
            "category": " Pain Relief "
        }))
        .expect("valid update");
        update.apply_to(&mut product);

        assert_eq!(product.name, "Ibuprofen");
        assert_eq!(product.category, "Pain Relief");
    }

    #[test]
    fn test_product_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_product()).expect("serialize");
        assert!(json.get("requiresPrescription").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
