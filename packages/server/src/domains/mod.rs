// Business domains
pub mod auth;
pub mod fairytales;
pub mod notifications;
pub mod stories;
