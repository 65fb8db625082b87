//! Streaming, single-pass transforms over command sequences.
//!
//! Every filter is an [`Iterator`] adapter over an upstream command
//! iterator and buffers at most the run of commands it is currently
//! deciding about, so memory use is bounded by the longest run of
//! consecutive state changes, not by the sequence length.
//!
//! Order matters when composing: relative-transform conversion must run
//! before a backend that cannot re-home its transform, and grouping runs
//! last so backends receive maximal per-draw state bundles.

mod group;
mod optimize;
mod paint;
mod transforms;

pub use group::GroupStateChanges;
pub use optimize::OptimizeCommands;
pub use paint::FillPaintedShapeAsImage;
pub use transforms::AbsoluteToRelativeTransforms;
