// Session tokens, per-request identity and credential hashing.

pub mod identity;
pub mod password;
pub mod token;

pub use identity::Identity;
pub use password::{Argon2Verifier, CredentialError, CredentialVerifier};
pub use token::{Claims, TokenCodec, TokenError};
