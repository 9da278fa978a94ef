pub mod notify;
pub mod service;

pub use notify::{NoopNotifier, WebhookNotifier};
pub use service::{DigestService, RunError};
