//! Screen-point to data-point resolution.
//!
//! Plotters fill a [`HitIndex`] while drawing; pointer handling outside this
//! crate queries it and turns the located shape into a [`HitTestResult`].

mod hit_index;
mod hit_result;
mod hit_shapes;

pub use hit_index::{HitCandidate, HitIndex};
pub use hit_result::{HitTestResult, HitValue, SliceLabels};
pub use hit_shapes::{DistanceMode, FunnelSegment, HitArea, HitShape};
