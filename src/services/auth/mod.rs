pub mod bearer;
pub mod core;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use self::core::AuthService;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use verifier::Claims;
