//! The radial sweep.
//!
//! A ray from the origin turns counter-clockwise through a full circle,
//! starting at angle zero. Every segment is crossed by the ray for some range
//! of angles; its endpoints become [`Event`]s where it enters and leaves the
//! [`SweepLine`]. Between events, the nearest segment along the ray doesn't
//! change, so reading it off once per event finds every visible segment.
//!
//! The main entry point is [`sweep`] (or [`crate::visible_segments`]). Use
//! [`Sweeper`] to step through the events one at a time.

mod event;
mod observer;
mod sweep_line;
mod sweeper;

pub use event::{oriented_endpoints, Event, EventKind};
pub use observer::SweepObserver;
pub use sweep_line::SweepLine;
pub use sweeper::{sweep, SweepOptions, Sweeper};

pub(crate) use sweeper::check_input;
