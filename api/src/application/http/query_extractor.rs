use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use quarry_core::domain::repository::value_objects::RequestParameters;

use super::query_params::parse_query;

/// Extractor for the listing parameters of the query string.
///
/// Usage:
/// ```rust,ignore
/// async fn handler(
///     RequestParamsExtractor(params): RequestParamsExtractor,
/// ) -> Result<Response<Listing<Product>>, ApiError> {
///     // params.text("q"), params.get("category"), ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestParamsExtractor(pub RequestParameters);

impl<S> FromRequestParts<S> for RequestParamsExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        Ok(RequestParamsExtractor(parse_query(query)))
    }
}

/// Primary language of the `Accept-Language` header, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale(pub Option<String>);

impl RequestLocale {
    pub fn or(self, default: &str) -> String {
        self.0.unwrap_or_else(|| default.to_string())
    }
}

fn primary_language(header: &str) -> Option<String> {
    let tag = header.split(',').next()?.split(';').next()?.trim();
    let language = tag.split(['-', '_']).next()?.trim();

    if language.is_empty() || language == "*" {
        return None;
    }
    Some(language.to_ascii_lowercase())
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(primary_language);

        Ok(RequestLocale(locale))
    }
}
