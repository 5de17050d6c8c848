//! Access gate — credential verification in front of every tool.
//!
//! The gate's contract is stable across backends: `authorize(credential)`
//! either grants or returns `Unauthorized`. The default backend checks one
//! process-wide shared secret. Comparison hashes both sides with SHA-256
//! and compares digests with `subtle::ConstantTimeEq`, so neither the
//! secret's length nor its content short-circuits the check.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use medgate_core::error::{GatewayError, Result};

/// Verifies a caller-presented credential. Backends are swappable
/// (shared secret today; token or per-user identity when hardening is in
/// scope) without changing the contract.
pub trait CredentialVerifier: Send + Sync {
    /// Grant or deny. On denial, callers must not touch any record data.
    fn authorize(&self, credential: &str) -> Result<()>;
}

/// The default backend: a single process-wide shared secret.
pub struct SharedSecretGate {
    secret_digest: [u8; 32],
}

impl SharedSecretGate {
    pub fn new(secret: &str) -> Self {
        Self {
            secret_digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }
}

impl CredentialVerifier for SharedSecretGate {
    fn authorize(&self, credential: &str) -> Result<()> {
        let presented: [u8; 32] = Sha256::digest(credential.as_bytes()).into();
        if presented.ct_eq(&self.secret_digest).into() {
            Ok(())
        } else {
            Err(GatewayError::Unauthorized)
        }
    }
}

/// A gate that denies everything. Used when no shared secret is configured:
/// a misconfigured deployment fails closed instead of serving records.
pub struct DenyAllGate;

impl CredentialVerifier for DenyAllGate {
    fn authorize(&self, _credential: &str) -> Result<()> {
        Err(GatewayError::Unauthorized)
    }
}
