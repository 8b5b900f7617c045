// File I/O: input discovery and run-report export (xlsx, csv, json)

pub mod csv;
pub mod discover;
pub mod json;
pub mod table;
pub mod xlsx;
