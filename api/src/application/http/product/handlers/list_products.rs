use axum::extract::State;
use quarry_core::{
    domain::repository::{entities::Listing, ports::ResourceRepository},
    entity::products::Model as Product,
};

use crate::application::http::{
    query_extractor::{RequestLocale, RequestParamsExtractor},
    server::{
        api_entities::{api_error::ApiError, response::Response},
        app_state::AppState,
    },
};

#[utoipa::path(
    get,
    path = "",
    tag = "product",
    summary = "List products",
    description = "Lists products. `q` searches title, sku and the translated name, `sort_by`/`sort_type` order the result, `status`, `brand`, `category` and `collection` filter it (`category[]=1&category[]=2` for several values). A `per_page` parameter returns a page with links instead of every product.",
    params(
        ("q" = Option<String>, Query, description = "Search term"),
        ("sort_by" = Option<String>, Query, description = "title, price or name"),
        ("sort_type" = Option<String>, Query, description = "asc or desc"),
        ("per_page" = Option<u64>, Query, description = "Records per page"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
    ),
    responses(
        (status = 200, body = [Product]),
        (status = 400, description = "A filter value does not fit its column")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    RequestParamsExtractor(params): RequestParamsExtractor,
    locale: RequestLocale,
) -> Result<Response<Listing<Product>>, ApiError> {
    let path = format!("{}/products", state.root_path());
    let locale = locale.or(&state.args.default_locale);

    let listing = match state.products(params, locale).list().await? {
        Listing::Paginated(page) => Listing::Paginated(page.with_path(&path)),
        collection => collection,
    };

    Ok(Response::OK(listing))
}
