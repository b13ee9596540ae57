use quarry_core::domain::{
    common::entities::app_errors::CoreError,
    synchronization::value_objects::{
        ChoicePayload, FeaturePayload, ImagePayload, OptionPayload, RelatedRef, parse_items,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use utoipa::ToSchema;
use validator::Validate;

/// Nested collections accepted next to the product attributes. A present
/// key replaces the whole collection, an absent key leaves it untouched.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductCollections {
    #[serde(default)]
    #[schema(value_type = Option<Vec<ImagePayload>>)]
    pub images: Option<Vec<JsonValue>>,

    #[serde(default)]
    #[schema(value_type = Option<Vec<OptionPayload>>)]
    pub options: Option<Vec<JsonValue>>,

    #[serde(default)]
    #[schema(value_type = Option<Vec<FeaturePayload>>)]
    pub features: Option<Vec<JsonValue>>,

    #[serde(default)]
    #[schema(value_type = Option<Vec<RelatedRef>>)]
    pub categories: Option<Vec<JsonValue>>,

    #[serde(default)]
    #[schema(value_type = Option<Vec<RelatedRef>>)]
    pub collections: Option<Vec<JsonValue>>,
}

impl ProductCollections {
    /// Parses every nested item without keeping the result, so a malformed
    /// payload is rejected before the product row is written.
    pub fn check(&self) -> Result<(), CoreError> {
        parse_items::<ImagePayload>("images", self.images.clone())?;
        let options = parse_items::<OptionPayload>("options", self.options.clone())?;
        for (index, option) in options.into_iter().enumerate() {
            parse_items::<ChoicePayload>(&format!("options[{index}].values"), option.values)?;
        }
        parse_items::<FeaturePayload>("features", self.features.clone())?;
        parse_items::<RelatedRef>("categories", self.categories.clone())?;
        parse_items::<RelatedRef>("collections", self.collections.clone())?;

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductValidator {
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,

    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    pub sku: Option<String>,

    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,

    #[serde(default)]
    pub brand_id: Option<i32>,

    #[serde(flatten)]
    pub collections: ProductCollections,
}

impl CreateProductValidator {
    /// Column attributes of the new product.
    pub fn attributes(&self) -> JsonValue {
        json!({
            "slug": self.slug,
            "title": self.title,
            "sku": self.sku,
            "status": self.status,
            "price": self.price,
            "brand_id": self.brand_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductValidator {
    #[serde(default)]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "status must not be empty"))]
    pub status: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,

    #[serde(default)]
    pub brand_id: Option<i32>,

    #[serde(flatten)]
    pub collections: ProductCollections,
}

impl UpdateProductValidator {
    /// Only the attributes present in the body.
    pub fn attributes(&self) -> JsonValue {
        let mut attributes = Map::new();

        if let Some(title) = &self.title {
            attributes.insert("title".to_string(), json!(title));
        }
        if let Some(sku) = &self.sku {
            attributes.insert("sku".to_string(), json!(sku));
        }
        if let Some(status) = &self.status {
            attributes.insert("status".to_string(), json!(status));
        }
        if let Some(price) = self.price {
            attributes.insert("price".to_string(), json!(price));
        }
        if let Some(brand_id) = self.brand_id {
            attributes.insert("brand_id".to_string(), json!(brand_id));
        }

        JsonValue::Object(attributes)
    }
}
