//! Cab booking core.
//!
//! Everything in here is platform independent: the browser glue in
//! [`crate::browser`] and the Leptos components only feed events in and read
//! state out, so the whole booking flow can be exercised from plain tests.

pub mod distance;
pub mod draft;
pub mod events;
pub mod places;
pub mod session;
pub mod submission;
pub mod trip;
