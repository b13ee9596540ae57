use axum::{
    Router,
    routing::{delete, get},
};
use utoipa::OpenApi;

use super::handlers::{
    create_product::{__path_create_product, create_product},
    delete_product::{__path_delete_product, delete_product},
    force_delete_product::{__path_force_delete_product, force_delete_product},
    get_product::{__path_get_product, get_product},
    list_products::{__path_list_products, list_products},
    update_product::{__path_update_product, update_product},
};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(
    list_products,
    create_product,
    get_product,
    update_product,
    delete_product,
    force_delete_product
))]
pub struct ProductApiDoc;

pub fn product_routes(state: AppState) -> Router<AppState> {
    let root_path = state.root_path();

    Router::new()
        .route(
            &format!("{root_path}/products"),
            get(list_products).post(create_product),
        )
        .route(
            &format!("{root_path}/products/{{slug}}"),
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            &format!("{root_path}/products/{{slug}}/force"),
            delete(force_delete_product),
        )
}
