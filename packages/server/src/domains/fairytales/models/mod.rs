pub mod fairytale;
pub mod page;
pub mod status;

pub use fairytale::Fairytale;
pub use page::FairytalePage;
pub use status::FairytaleStatus;
