//! Reads fixed-shape records from a file-backed data repository.
//!
//! A negotiated [`caps::domain::caps::Caps`] is resolved into a media kind and
//! record layout, then [`source::infrastructure::data_repo_source::DataRepoSource`]
//! streams records from the configured location until end of stream.

pub mod caps;
pub mod reading;
pub mod shared;
pub mod source;
