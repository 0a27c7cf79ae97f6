//! Fitback event bus and outbound email.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the event envelope published by request handlers.
//! - [`delivery`] — the [`Mailer`] seam with SMTP, logging and in-memory
//!   implementations.
//! - [`templates`] — the transactional emails the platform sends.

pub mod bus;
pub mod delivery;
pub mod templates;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::{EmailMessage, LogMailer, Mailer, RecordingMailer};
