/// Password hashing and verification
///
/// bcrypt is CPU-bound, so both operations run on the blocking thread pool.
use crate::error::{ApiError, ApiResult};

/// bcrypt work factor for all stored hashes
pub const BCRYPT_COST: u32 = 12;

/// Hash a secret using bcrypt
pub async fn hash(secret: &str) -> ApiResult<String> {
    let secret = secret.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(secret, BCRYPT_COST)
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Verify a secret against a stored bcrypt hash
pub async fn verify(secret: &str, hash: &str) -> ApiResult<bool> {
    let secret = secret.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::verify(secret, &hash)
            .map_err(|e| ApiError::Internal(format!("Password verification failed: {}", e)))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Verification task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hashed = hash("pw123456").await.unwrap();
        assert_ne!(hashed, "pw123456");
        assert!(verify("pw123456", &hashed).await.unwrap());
        assert!(!verify("wrong-password", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let a = hash("pw123456").await.unwrap();
        let b = hash("pw123456").await.unwrap();
        assert_ne!(a, b);
    }
}
