//! Auth domain - verification of user access tokens
//!
//! Users sign in through the account service, which issues the JWTs this
//! server checks. The generation worker authenticates separately with a
//! static service token (see `server::middleware::service_token`).

pub mod jwt;

pub use jwt::{Claims, JwtService};
