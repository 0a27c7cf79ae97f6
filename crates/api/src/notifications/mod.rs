//! Email notifications driven by domain events.
//!
//! The [`NotificationRouter`] subscribes to the event bus and emails
//! feedback owners when a review decision lands.

pub mod router;

pub use router::NotificationRouter;
