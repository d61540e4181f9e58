pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, HashingParams};
pub use token::TokenSigner;
