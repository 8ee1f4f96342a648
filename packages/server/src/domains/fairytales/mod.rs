pub mod activities;
pub mod data;
pub mod errors;
pub mod models;
pub mod store;

pub use errors::{FairytaleError, FairytaleResult};
pub use models::{Fairytale, FairytalePage, FairytaleStatus};
pub use store::PgFairytaleStore;
