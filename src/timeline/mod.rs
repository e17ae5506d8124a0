/// Movie timeline: definitions arena and per-frame operations.
pub mod movie;
/// Character definitions.
pub mod shape;
