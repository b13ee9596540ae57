//! `SeaORM` entities of the catalog schema.

pub mod prelude;

pub mod brands;
pub mod categories;
pub mod category_product;
pub mod collection_product;
pub mod collections;
pub mod feature_product;
pub mod feature_translations;
pub mod option_value_translations;
pub mod option_values;
pub mod product_features;
pub mod product_images;
pub mod product_option_translations;
pub mod product_options;
pub mod product_translations;
pub mod products;
