//! Account management: registration, login, password reset, token minting.

mod handlers;
pub mod reset;
mod service;
mod token;

pub use handlers::{forgot_password, login, register, reset_password, AuthResponse};
pub use service::CredentialService;
pub use token::{Claims, TokenService};
