pub mod driver;
pub mod report;
