// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., J_K7NP3X for journals)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Journal (J_)
    Journal,
    /// Journal entry (E_)
    Entry,
    /// Mood (M_)
    Mood,
    /// Entry-mood association row (EM_)
    EntryMood,
    /// OAuth state record (ST_)
    OAuthState,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Journal => "J",
            EntityPrefix::Entry => "E",
            EntityPrefix::Mood => "M",
            EntityPrefix::EntryMood => "EM",
            EntityPrefix::OAuthState => "ST",
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
/// # Returns
/// A string in format "PREFIX_XXXXXX" (e.g., "J_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Useful for suffixes or other non-entity identifiers
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Journal ID (J_XXXXXX)
pub fn generate_journal_id() -> String {
    generate_id(EntityPrefix::Journal)
}

/// Generate an Entry ID (E_XXXXXX)
pub fn generate_entry_id() -> String {
    generate_id(EntityPrefix::Entry)
}

/// Generate a Mood ID (M_XXXXXX)
pub fn generate_mood_id() -> String {
    generate_id(EntityPrefix::Mood)
}

/// Generate an EntryMood ID (EM_XXXXXX)
pub fn generate_entry_mood_id() -> String {
    generate_id(EntityPrefix::EntryMood)
}

/// Generate an OAuth state record ID (ST_XXXXXX)
pub fn generate_oauth_state_id() -> String {
    generate_id(EntityPrefix::OAuthState)
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

        let journal_id = generate_journal_id();
        assert!(journal_id.starts_with("J_"));
        assert_eq!(journal_id.len(), 8);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_entry_id();
        let random_part = &id[2..]; // Skip "E_"

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
        assert!(generate_journal_id().starts_with("J_"));
        assert!(generate_entry_id().starts_with("E_"));
        assert!(generate_mood_id().starts_with("M_"));
        assert!(generate_entry_mood_id().starts_with("EM_"));
        assert!(generate_oauth_state_id().starts_with("ST_"));
    }

    #[test]
    fn test_raw_id() {
        let raw = generate_raw_id(8);
        assert_eq!(raw.len(), 8);
        assert!(!raw.contains('_')); // No prefix separator
    }
}
