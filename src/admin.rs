use sha2::{Digest, Sha256};

use crate::logger::log_line;
use crate::models::Config;

/// Lower-case hex SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Gate for destructive list operations. An unset hash denies everything;
/// the input is trimmed before hashing, matching how it is prompted for.
pub fn verify_admin_password(cfg: &Config, input: &str) -> bool {
    if cfg.admin_password_hash.is_empty() {
        log_line("admin gate: no password hash configured, denying");
        return false;
    }
    let ok = hash_password(input.trim()) == cfg.admin_password_hash;
    if !ok {
        log_line("admin gate: password mismatch, denying");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // echo -n "secret" | sha256sum
        assert_eq!(
            hash_password("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn test_verify_trims_and_matches() {
        let cfg = Config {
            admin_password_hash: hash_password("letmein"),
            ..Config::default()
        };
        assert!(verify_admin_password(&cfg, "letmein"));
        assert!(verify_admin_password(&cfg, "  letmein \n"));
        assert!(!verify_admin_password(&cfg, "wrong"));
    }

    #[test]
    fn test_unset_hash_always_denies() {
        let cfg = Config::default();
        assert!(!verify_admin_password(&cfg, ""));
        assert!(!verify_admin_password(&cfg, "anything"));
    }
}
