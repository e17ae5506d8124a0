/// Run configuration.
pub mod config;
/// Photo states around pan/zoom effects.
pub mod effects;
/// Movie generation from a show description.
pub mod generator;
/// Serde show description.
pub mod model;
/// Transition states and masks.
pub mod transitions;
