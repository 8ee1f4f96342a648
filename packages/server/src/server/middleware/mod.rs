// HTTP middleware
pub mod jwt_auth;
pub mod service_token;

pub use jwt_auth::*;
pub use service_token::*;
