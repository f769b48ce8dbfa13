//! In-memory relationship cache

use arbiter_domain::traits::RelationshipCache;
use arbiter_domain::{Lei, RelationshipCacheEntry};
use std::collections::HashMap;
use std::convert::Infallible;

/// In-process `RelationshipCache` backed by a map.
///
/// Entries are returned expired or not; staleness is the resolver's call.
/// `put` overwrites any prior entry for the same LEI, which resets the TTL.
#[derive(Debug, Default)]
pub struct MemoryRelationshipCache {
    entries: HashMap<Lei, RelationshipCacheEntry>,
}

impl MemoryRelationshipCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RelationshipCache for MemoryRelationshipCache {
    type Error = Infallible;

    fn get(&self, lei: &Lei) -> Result<Option<RelationshipCacheEntry>, Self::Error> {
        Ok(self.entries.get(lei).cloned())
    }

    fn put(&mut self, entry: RelationshipCacheEntry) -> Result<(), Self::Error> {
        self.entries.insert(entry.lei.clone(), entry);
        Ok(())
    }
}
