// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loading the user's signing key.
//!
//! The key is either a raw hex string (`WALLET_PRIVATE_KEY`) or a PEM file
//! (`WALLET_KEY_PEM_PATH`) in PKCS#8 or SEC1 form.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::wallet::WalletError;

/// Create a signer from a hex private key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, WalletError> {
    let trimmed = private_key_hex.trim();
    let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let key_bytes = alloy::hex::decode(key_hex)
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))
}

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(WalletError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, WalletError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, WalletError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a PEM key file and create a signer from it.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, WalletError> {
    let bytes = std::fs::read(path).map_err(|e| {
        WalletError::InvalidPrivateKey(format!("cannot read {}: {}", path.display(), e))
    })?;
    signer_from_pem(&bytes)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TEST_HEX: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_pem() -> String {
        use k256::pkcs8::{EncodePrivateKey, LineEnding};
        let key = SecretKey::from_slice(&alloy::hex::decode(TEST_HEX).unwrap()).unwrap();
        key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
    }

    #[test]
    fn test_pem_to_hex() {
        let hex = pem_to_hex(test_pem().as_bytes()).expect("PEM parses");
        assert_eq!(hex, TEST_HEX);
    }

    #[test]
    fn test_signer_from_hex_accepts_prefix() {
        let plain = signer_from_hex(TEST_HEX).expect("plain hex");
        let prefixed = signer_from_hex(&format!("0x{TEST_HEX}")).expect("prefixed hex");
        assert_eq!(plain.address(), prefixed.address());
    }

    #[test]
    fn test_signer_from_hex_rejects_garbage() {
        assert!(matches!(
            signer_from_hex("not-a-key"),
            Err(WalletError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_signer_from_pem_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(test_pem().as_bytes()).unwrap();

        let from_file = signer_from_pem_file(file.path()).expect("file signer");
        let from_hex = signer_from_hex(TEST_HEX).expect("hex signer");
        assert_eq!(from_file.address(), from_hex.address());
    }

    #[test]
    fn test_signer_from_missing_file() {
        let err = signer_from_pem_file(Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
