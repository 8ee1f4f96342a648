//! Stories domain (read-only here): the source text fairytales are made from.

pub mod models;

pub use models::Story;
