pub mod diff;
pub mod formatter;
pub mod linter;
pub mod review_service;
pub mod staging;
pub mod tools;
