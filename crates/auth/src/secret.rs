//! Client secret generation.

use base64::Engine;

use crate::AuthError;

/// Random bytes behind every client secret.
pub const CLIENT_SECRET_BYTES: usize = 32;

/// Generate a new base64url (unpadded) client secret from the OS RNG.
pub fn generate_client_secret() -> Result<String, AuthError> {
    let mut buf = [0u8; CLIENT_SECRET_BYTES];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AuthError::internal(format!("client secret generation failed: {e}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_url_safe_and_distinct() {
        let a = generate_client_secret().unwrap();
        let b = generate_client_secret().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
