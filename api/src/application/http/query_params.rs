use quarry_core::domain::repository::value_objects::{ParamValue, RequestParameters};

/// Builds request parameters from decoded query pairs.
///
/// Keys ending in `[]` collect into a list under the bare key; a repeated
/// scalar key keeps its last value.
/// - `q=shirt` -> `q: "shirt"`
/// - `category[]=1&category[]=4` -> `category: ["1", "4"]`
pub fn from_pairs(pairs: Vec<(String, String)>) -> RequestParameters {
    let mut params = RequestParameters::new();

    for (key, value) in pairs {
        match key.strip_suffix("[]") {
            Some(list_key) => {
                let mut items = match params.get(list_key) {
                    Some(ParamValue::List(items)) => items.clone(),
                    _ => Vec::new(),
                };
                items.push(value);
                params.insert(list_key, items);
            }
            None => params.insert(key, value),
        }
    }

    params
}

/// Parses a raw query string; an undecodable string yields no parameters.
pub fn parse_query(query: &str) -> RequestParameters {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => from_pairs(pairs),
        Err(e) => {
            tracing::warn!("Ignoring malformed query string: {}", e);
            RequestParameters::new()
        }
    }
}
