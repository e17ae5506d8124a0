/// Easing curves applied to normalized tween progress.
pub mod ease;
