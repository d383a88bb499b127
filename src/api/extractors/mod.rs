mod claims;

pub use claims::AuthClaims;
