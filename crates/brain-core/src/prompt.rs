//! Fingerprints for system prompts, so logs show which prompt version is live.

use sha2::{Digest, Sha256};

/// Length of the hex fingerprint returned by [`hash_prompt`].
const FINGERPRINT_LEN: usize = 16;

/// Compute a short, stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
        .chars()
        .take(FINGERPRINT_LEN)
        .collect()
}
