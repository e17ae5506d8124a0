/// Cooperative cancellation.
pub mod cancel;
/// Frame indices, frame rates, stage geometry and color transforms.
pub mod core;
/// Crate error type and result alias.
pub mod error;
/// Small numeric helpers shared by the tween engine and bitmap encoders.
pub mod math;
