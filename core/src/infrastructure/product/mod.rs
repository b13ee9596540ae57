pub mod model;
pub mod repositories;
pub mod synchronizers;

pub use repositories::product_repository::ProductRepository;
pub use synchronizers::ProductSynchronizer;
