// StoryPool Fairytale Service - API Core
//
// Turns a user's story into an illustrated fairytale by handing it to the
// AI generation worker and recording the worker's callbacks.
//
// Business logic lives in domains/*/activities, infrastructure seams in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
