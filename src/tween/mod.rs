/// Tween builders: how interpolated states reach the display list.
pub mod builder;
/// Span interpolation.
pub mod engine;
/// Pan/zoom keyframes and their segment plan.
pub mod keyframes;
/// Software rendering of transformed photos.
pub mod raster;
/// Tween spans and endpoint states.
pub mod span;
