//! Hand-off between the capture threads and the UI thread
//!
//! Background threads never touch renderer state directly; they publish
//! messages that the UI thread drains before drawing.

pub mod messages;

pub use messages::{OverlaySink, OverlayUpdate};
