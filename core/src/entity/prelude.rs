pub use super::brands::Entity as Brands;
pub use super::categories::Entity as Categories;
pub use super::category_product::Entity as CategoryProduct;
pub use super::collection_product::Entity as CollectionProduct;
pub use super::collections::Entity as Collections;
pub use super::feature_product::Entity as FeatureProduct;
pub use super::feature_translations::Entity as FeatureTranslations;
pub use super::option_value_translations::Entity as OptionValueTranslations;
pub use super::option_values::Entity as OptionValues;
pub use super::product_features::Entity as ProductFeatures;
pub use super::product_images::Entity as ProductImages;
pub use super::product_option_translations::Entity as ProductOptionTranslations;
pub use super::product_options::Entity as ProductOptions;
pub use super::product_translations::Entity as ProductTranslations;
pub use super::products::Entity as Products;
