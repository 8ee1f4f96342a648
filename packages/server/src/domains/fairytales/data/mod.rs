//! Wire types for the fairytale HTTP API (camelCase JSON).

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
