pub mod common;
pub mod repository;
pub mod synchronization;
