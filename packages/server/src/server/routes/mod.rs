// HTTP routes
pub mod fairytales;
pub mod health;

pub use fairytales::*;
pub use health::*;
