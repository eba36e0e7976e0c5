pub mod constants;
pub mod error;
pub mod record;
pub mod source_config;
