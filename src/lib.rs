//! Decorative physics backdrop
//!
//! A mouse-reactive particle field, a handful of floating shapes that bump
//! into each other and the walls, and a small rocket that follows the
//! pointer, orbits it when the pointer rests, and dashes through shapes on
//! click.  The simulation core is plain data driven by
//! [`scene::SceneCoordinator`]; [`plugin::ScenePlugin`] and
//! [`rendering::SceneRenderPlugin`] wire it into a Bevy app.

pub mod config;
pub mod constants;
pub mod controls;
pub mod error;
pub mod field;
pub mod pilot;
pub mod plugin;
pub mod quality;
pub mod rendering;
pub mod scene;
pub mod shapes;
