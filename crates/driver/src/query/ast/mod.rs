pub mod batch;
pub mod common;
pub mod delete;
pub mod insert;
pub mod schema;
pub mod select;
pub mod update;
