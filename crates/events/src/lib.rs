//! Event bus, audit-trail persistence, and outbound callbacks.
//!
//! Building blocks shared by the API and the worker:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PipelineEvent`] -- the canonical lifecycle event envelope.
//! - [`EventPersistence`] -- background service that durably writes every
//!   event to the `events` table.
//! - [`notifier`] -- completion and failure callbacks to the chat
//!   frontend, with retry.

pub mod bus;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, PipelineEvent};
pub use notifier::{
    CallbackConfig, CompletionNotice, FailureNotice, Notifier, NotifyError, WebhookNotifier,
};
pub use persistence::EventPersistence;
