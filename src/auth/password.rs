use super::AuthError;

/// One-way salted password hashing backed by bcrypt.
///
/// Both operations are CPU bound and run on tokio's blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plaintext: String) -> Result<String, AuthError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Any mismatch, including a digest that is not valid bcrypt, is `InvalidCredentials`.
    pub async fn verify(&self, plaintext: String, digest: String) -> Result<(), AuthError> {
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        match verified {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(AuthError::InvalidCredentials),
        }
    }
}
