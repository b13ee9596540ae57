pub mod entities;
pub mod policies;
pub mod ports;
pub mod value_objects;
