//! Cache key builders for all MemberHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Prefix applied to all MemberHub cache keys.
const PREFIX: &str = "memberhub";

// ── Token keys ─────────────────────────────────────────────

/// Cache key for a revoked token, addressed by the digest of its wire form.
pub fn revoked_token(token_digest: &str) -> String {
    format!("{PREFIX}:auth:revoked:{token_digest}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoked_token_key() {
        assert_eq!(revoked_token("ab12"), "memberhub:auth:revoked:ab12");
    }
}
