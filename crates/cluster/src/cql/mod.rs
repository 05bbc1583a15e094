pub mod ast;
pub mod lexer;
pub mod parser;
pub mod script;

pub use parser::parse;
pub use script::split_statements;
