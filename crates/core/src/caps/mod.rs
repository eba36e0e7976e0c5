pub mod domain;
pub mod schema_resolver;
