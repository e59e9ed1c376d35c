//! Convert a CSV file to JSON or XML.

pub mod process;
pub mod resolve;
pub mod types;
