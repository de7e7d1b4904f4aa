pub mod webhook;

pub use webhook::{RuntimeAlerter, WebhookAlerter};
