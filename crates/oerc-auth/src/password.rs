use rand::RngCore;

const CONTEXT: &str = "oerc-site 2025 account password v1";

/// Salted BLAKE3 password digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordHash {
    salt: [u8; 16],
    digest: blake3::Hash,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            digest: digest(&salt, password),
            salt,
        }
    }

    /// Constant-time comparison against a candidate password.
    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.digest
    }

    /// `salt$digest`, both hex.
    pub fn to_encoded(&self) -> String {
        format!("{}${}", hex::encode(self.salt), self.digest.to_hex())
    }
}

fn digest(salt: &[u8; 16], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(CONTEXT);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}
