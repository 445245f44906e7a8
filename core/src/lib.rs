pub mod args;
pub mod error;
pub mod records;
pub mod tools;
