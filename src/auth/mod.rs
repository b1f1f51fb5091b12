//! Account credentials and session tokens.

pub mod jwt;
pub mod password;

pub use jwt::{generate_access_token, validate_token, Claims, JwtConfig};
pub use password::{hash_password, verify_password};
