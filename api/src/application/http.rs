pub mod product;
pub mod query_extractor;
pub mod query_params;
pub mod server;
