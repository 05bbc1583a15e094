pub mod batch;
pub mod delete;
pub mod insert;
pub mod schema;
pub mod select;
pub mod update;

pub use batch::BatchBuilder;
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use schema::{CreateIndexBuilder, CreateTableBuilder, DropTableBuilder};
pub use select::SelectBuilder;
pub use update::UpdateBuilder;
