pub mod query;
pub mod sanitize;
