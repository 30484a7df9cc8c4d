/// Password hashing for the protected bank endpoints.
/// PBKDF2-HMAC-SHA256 with a fixed per-deployment salt and iteration count;
/// only hex-encoded hashes are ever stored or compared.
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const HASH_LEN: usize = 32;

/// Hashing parameters, constant for the process lifetime.
#[derive(Debug, Clone)]
pub struct HashParams {
    pub salt: String,
    pub iterations: u32,
}

/// Derive the hex-encoded hash of a plaintext password.
pub fn hash_password(params: &HashParams, plaintext: &str) -> String {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(
        plaintext.as_bytes(),
        params.salt.as_bytes(),
        params.iterations,
        &mut out,
    );
    hex::encode(out)
}

/// Recompute the hash and compare against the stored one in constant time.
pub fn verify_password(params: &HashParams, plaintext: &str, stored_hex: &str) -> bool {
    let computed = hash_password(params, plaintext);
    computed.as_bytes().ct_eq(stored_hex.as_bytes()).into()
}
