//! Fairytale domain activities - entry-point business logic
//!
//! Called from the HTTP handlers. Each activity takes the caller's ids and
//! `&ServerDeps`, does its own ownership checks and returns domain results.

pub mod generate;
pub mod manage;
pub mod queries;
pub mod sample;
pub mod worker_callbacks;

pub use generate::start_generation;
pub use manage::{delete_fairytale, rename_fairytale};
pub use queries::{get_fairytale_detail, get_fairytale_status, list_fairytales};
pub use sample::generate_sample_fairytale;
pub use worker_callbacks::{complete_generation, update_status};
