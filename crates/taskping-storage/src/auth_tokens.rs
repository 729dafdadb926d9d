// Session token generation and hashing
// Decision: Tokens are prefixed with "tp_" for identification
// Decision: Full token is shown only once at issuance, stored hashed in DB

use rand::Rng;
use sha2::{Digest, Sha256};

/// Session token prefix for identification
pub const SESSION_TOKEN_PREFIX: &str = "tp_";
const SESSION_TOKEN_LENGTH: usize = 32; // 32 random bytes = 64 hex chars

/// Generated session token (full token shown only at issuance)
#[derive(Debug)]
pub struct GeneratedToken {
    /// Full token (tp_<random>)
    pub token: String,
    /// SHA-256 hash for database storage
    pub token_hash: String,
}

/// Generate a new session token
pub fn generate_session_token() -> GeneratedToken {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..SESSION_TOKEN_LENGTH).map(|_| rng.gen()).collect();
    let token = format!("{}{}", SESSION_TOKEN_PREFIX, hex::encode(&random_bytes));
    let token_hash = hash_session_token(&token);

    GeneratedToken { token, token_hash }
}

/// Hash a session token for database storage/lookup
pub fn hash_session_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(hash)
}
