//! Identifier and token generation.
//!
//! Row ids are lowercase ULIDs: 26 characters, time-prefixed, so a
//! descending sort over the id column doubles as newest-first ordering
//! and keyset pagination can filter on the id alone. Session tokens are
//! random UUIDs with no time component.

use ulid::Ulid;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// New entity id, lowercase ULID.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// New opaque bearer token, 32 hex characters.
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sortable_length() {
        let ids = IdGenerator::new();
        let a = ids.generate();
        let b = ids.generate();
        assert_eq!(a.len(), 26);
        assert_ne!(a, b);
        assert_eq!(a, a.to_lowercase());
    }

    #[test]
    fn tokens_are_hyphenless() {
        let token = IdGenerator::new().generate_token();
        assert_eq!(token.len(), 32);
        assert!(!token.contains('-'));
    }
}
