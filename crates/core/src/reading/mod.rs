pub mod chunk_reader;
pub mod location_pattern;
pub mod record_cursor;
pub mod record_producer;
pub mod session;
