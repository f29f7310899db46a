// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., U_K7NP3X for users)
//!
//! Each entity type owns its own prefix, so identifier generation never
//! couples entity types through a shared counter.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Content artifact (C_)
    Content,
    /// Credit transaction (T_)
    Transaction,
    /// Provider API key (K_)
    ProviderKey,
    /// SEO analysis record (S_)
    SeoAnalysis,
    /// Analytics record (A_)
    Analytics,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Content => "C",
            EntityPrefix::Transaction => "T",
            EntityPrefix::ProviderKey => "K",
            EntityPrefix::SeoAnalysis => "S",
            EntityPrefix::Analytics => "A",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// Returns a string in format "PREFIX_XXXXXX" (e.g., "U_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Content artifact ID (C_XXXXXX)
pub fn generate_content_id() -> String {
    generate_id(EntityPrefix::Content)
}

/// Generate a Credit transaction ID (T_XXXXXX)
pub fn generate_transaction_id() -> String {
    generate_id(EntityPrefix::Transaction)
}

/// Generate a Provider key ID (K_XXXXXX)
pub fn generate_provider_key_id() -> String {
    generate_id(EntityPrefix::ProviderKey)
}

/// Generate an SEO analysis ID (S_XXXXXX)
pub fn generate_seo_analysis_id() -> String {
    generate_id(EntityPrefix::SeoAnalysis)
}

/// Generate an Analytics record ID (A_XXXXXX)
pub fn generate_analytics_id() -> String {
    generate_id(EntityPrefix::Analytics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let user_id = generate_user_id();
        assert!(user_id.starts_with("U_"));
        assert_eq!(user_id.len(), 8); // "U_" + 6 chars

        let tx_id = generate_transaction_id();
        assert!(tx_id.starts_with("T_"));
        assert_eq!(tx_id.len(), 8);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_content_id();
        let random_part = &id[2..]; // Skip "C_"

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }

        // Verify no ambiguous characters
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_user_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_content_id().starts_with("C_"));
        assert!(generate_transaction_id().starts_with("T_"));
        assert!(generate_provider_key_id().starts_with("K_"));
        assert!(generate_seo_analysis_id().starts_with("S_"));
        assert!(generate_analytics_id().starts_with("A_"));
    }
}
