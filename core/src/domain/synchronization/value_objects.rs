use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::domain::common::entities::app_errors::CoreError;

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct ImagePayload {
    pub id: Option<i32>,
    pub uri: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub secondary: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct OptionPayload {
    pub id: Option<i32>,
    pub name: String,
    pub required: bool,
    #[serde(default)]
    #[schema(value_type = Option<Vec<ChoicePayload>>)]
    pub values: Option<Vec<JsonValue>>,
}

/// A selectable value of a product option.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct ChoicePayload {
    pub id: Option<i32>,
    pub value: String,
    pub fee: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct FeaturePayload {
    pub name: String,
    pub icon: Option<String>,
    pub value: Option<String>,
}

/// A reference to an existing row, used for pivot synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub struct RelatedRef {
    pub id: i32,
}

/// Parses every item of a payload up front, so that a malformed item fails
/// before anything is written. `None` and an empty list both parse to an
/// empty vector.
pub fn parse_items<T: DeserializeOwned>(
    kind: &str,
    payload: Option<Vec<JsonValue>>,
) -> Result<Vec<T>, CoreError> {
    payload
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<T>(item)
                .map_err(|e| CoreError::DataShape(format!("{kind}[{index}]: {e}")))
        })
        .collect()
}
