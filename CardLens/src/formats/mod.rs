//! Container formats that can carry card metadata

pub mod png;

pub use png::{ChunkRecord, TextVariant};
