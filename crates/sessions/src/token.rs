//! Session token generation.
//!
//! Tokens are 20 characters drawn uniformly from `[a-zA-Z0-9]`.  They keep
//! sessions apart and are hard to guess in ordinary use, but they are not a
//! security boundary: the generator is a seeded PRNG and collisions are not
//! checked.

use crate::random::RandomSource;

pub const TOKEN_LENGTH: usize = 20;

const SESSION_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Mint a new session token.
pub fn new_session_token(rng: &RandomSource) -> String {
    (0..TOKEN_LENGTH)
        .map(|_| SESSION_CHARS[rng.index(SESSION_CHARS.len())] as char)
        .collect()
}

/// Whether `s` has the shape of a session token.  Lets handlers reject
/// garbage before touching the store.
pub fn is_session_token(s: &str) -> bool {
    s.len() == TOKEN_LENGTH && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn token_shape() {
        let rng = RandomSource::from_seed(3);
        let token = new_session_token(&rng);
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(is_session_token(&token));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let rng = RandomSource::from_entropy();
        let tokens: HashSet<String> = (0..10_000).map(|_| new_session_token(&rng)).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn alphabet_has_62_chars() {
        assert_eq!(SESSION_CHARS.len(), 62);
        let unique: HashSet<u8> = SESSION_CHARS.iter().copied().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(!is_session_token("short"));
        assert!(!is_session_token("abcdefghij-klmnopqrs"));
        assert!(is_session_token("abcdefghijKLMNOPQR12"));
    }
}
