//! Pilot module: the steerable rocket that follows, orbits, and dashes.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `Pilot`, `PilotMode`, `PilotInput`, `BreakRequest` |
//! | [`control`] | Per-tick update: smoothing, mode transitions, steering, dash hit scans |

pub mod control;
pub mod state;

pub use control::{shortest_angle, wrap_angle};
pub use state::{BreakRequest, Pilot, PilotInput, PilotMode};
