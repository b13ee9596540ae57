//! Request-driven repositories over SeaORM.
//!
//! A repository declares which fields of a model may be sorted, searched,
//! filtered and paginated from request parameters, and [`ResourceRepository::list`]
//! composes those declarations into a single query. The [`synchronization`]
//! side reconciles nested product collections against a desired-state
//! payload.
//!
//! [`ResourceRepository::list`]: domain::repository::ports::ResourceRepository::list
//! [`synchronization`]: domain::synchronization

pub mod domain;
pub mod entity;
pub mod infrastructure;
