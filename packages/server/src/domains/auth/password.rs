use anyhow::{Context, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Check a password against a stored bcrypt hash. Malformed hashes never verify.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .context("password verification task failed")?;
    Ok(valid)
}

pub fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts, keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("admin123", TEST_COST).await.unwrap();
        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash).await.unwrap());
        assert!(!verify_password("admin124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("admin123", "not-a-bcrypt-hash").await.unwrap());
    }

    #[test]
    fn test_password_length() {
        assert!(password_long_enough("editor123"));
        assert!(password_long_enough("12345678"));
        assert!(!password_long_enough("1234567"));
    }
}
