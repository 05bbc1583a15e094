pub mod bounds;
pub mod data_type;
pub mod error;
pub mod value;
