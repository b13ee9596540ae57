pub mod ports;
pub mod value_objects;
