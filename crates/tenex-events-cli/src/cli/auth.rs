use anyhow::{Context, Result};
use nostr_sdk::nips::nip49::EncryptedSecretKey;
use nostr_sdk::prelude::*;

/// Turn an nsec, hex secret or ncryptsec into signing keys.
pub fn keys_from_secret(secret: &str, password: Option<&str>) -> Result<Keys> {
    let secret_key = if secret.starts_with("ncryptsec") {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Credentials are encrypted, password required"))?;
        let encrypted = EncryptedSecretKey::from_bech32(secret).context("Invalid ncryptsec")?;
        encrypted.decrypt(password).context("Failed to decrypt ncryptsec")?
    } else {
        SecretKey::parse(secret).context("Invalid secret key")?
    };

    Ok(Keys::new(secret_key))
}
