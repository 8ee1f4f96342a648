//! Push notifications for fairytale events.

pub mod models;
pub mod push;

pub use models::Device;
pub use push::{fairytale_completed_message, PushNotifier};
