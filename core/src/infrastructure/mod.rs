pub mod db;
pub mod object_storage;
pub mod product;
pub mod repository;
