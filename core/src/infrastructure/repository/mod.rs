//! Request-driven listing over `SeaORM` entities.
//!
//! A [`RepositoryConfig`] declares what a request may sort, search and filter
//! on. It is resolved once against the entity's [`RepositoryModel`] and then
//! shared by every [`Repository`] built for a request. Listing runs, in order:
//! repository global scopes, sort, search, filters, local scopes, then the
//! terminal fetch or page, followed by eager loads and counts.

pub mod coerce;
pub mod config;
pub mod eager;
pub mod filterable;
pub mod model;
pub mod paginable;
pub mod query_state;
#[allow(clippy::module_inception)]
pub mod repository;
pub mod scopes;
pub mod searchable;
pub mod sortable;

pub use config::{RepositoryConfig, ResolvedConfig};
pub use model::RepositoryModel;
pub use repository::Repository;
pub use scopes::NamedScope;
