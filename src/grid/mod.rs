// Grid engine
// Geometry metrics, visible-day resolution, the pure render projection,
// and the pointer-driven interaction state machine.

pub mod interactions;
pub mod metrics;
pub mod render;
pub mod visible_days;
