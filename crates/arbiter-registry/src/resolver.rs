//! Cache-first corporate-hierarchy resolution

use arbiter_domain::traits::{RelationshipCache, RelationshipRegistry};
use arbiter_domain::{EntityRelationships, HierarchyLevel, Lei, RelationshipCacheEntry};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Maximum parent links followed when walking toward the ultimate parent.
pub const MAX_PARENT_DEPTH: usize = 5;

/// Resolves an entity's corporate-hierarchy position against a registry,
/// with a time-boxed cache in front.
///
/// All failure modes degrade: upstream or parse errors resolve to "no
/// relationships" (standalone for ranking purposes) and cache errors
/// degrade to a miss. None of the resolution methods return errors.
///
/// The resolver is cheap to share behind an `Arc`; the cache sits behind a
/// mutex so concurrent per-claim enrichment can run against one instance.
pub struct RelationshipResolver<R, C> {
    registry: Arc<R>,
    cache: Arc<Mutex<C>>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl<R, C> RelationshipResolver<R, C>
where
    R: RelationshipRegistry,
    C: RelationshipCache,
{
    /// Create a resolver over a registry and a cache
    pub fn new(registry: R, cache: C) -> Self {
        Self {
            registry: Arc::new(registry),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Resolve the relationship set for an entity.
    ///
    /// Cache-first: a non-expired entry short-circuits without any upstream
    /// call. On a miss the registry is queried, records are bucketed into
    /// parents/ultimate-parent/children, and the result is upserted with a
    /// fresh 7-day TTL.
    pub async fn get_relationships(&self, lei: &Lei) -> Option<EntityRelationships> {
        let now = now_unix();

        match self.cache.lock() {
            Ok(cache) => match cache.get(lei) {
                Ok(Some(entry)) if !entry.is_expired(now) => {
                    debug!(%lei, "Relationship cache hit");
                    return Some(entry.relationships);
                }
                Ok(_) => {}
                Err(e) => warn!(%lei, "Cache read failed, treating as miss: {}", e),
            },
            Err(_) => warn!(%lei, "Cache lock poisoned, treating as miss"),
        }

        let records = match self.registry.fetch_relationships(lei).await {
            Ok(records) => records,
            Err(e) => {
                warn!(%lei, "Relationship lookup failed: {}", e);
                return None;
            }
        };

        let relationships = EntityRelationships::from_records(&records);

        let mut entry =
            RelationshipCacheEntry::from_relationships(lei.clone(), relationships.clone(), now);
        if let Some(primary) = records
            .iter()
            .find(|r| entry.parent_lei.as_ref() == Some(&r.related_lei))
        {
            entry.relationship_type = Some(primary.relationship_type.clone());
            entry.relationship_status = primary.relationship_status.clone();
        }

        match self.cache.lock() {
            Ok(mut cache) => {
                if let Err(e) = cache.put(entry) {
                    warn!(%lei, "Cache write failed: {}", e);
                }
            }
            Err(_) => warn!(%lei, "Cache lock poisoned, skipping write"),
        }

        Some(relationships)
    }

    /// Classify an entity's hierarchy position.
    ///
    /// An unresolvable entity is `Standalone`.
    pub async fn get_hierarchy_level(&self, lei: &Lei) -> HierarchyLevel {
        match self.get_relationships(lei).await {
            Some(relationships) => relationships.hierarchy_level(),
            None => HierarchyLevel::Standalone,
        }
    }

    /// Walk toward the top of the ownership chain.
    ///
    /// Follows the first parent link until an explicit ultimate parent is
    /// recorded, parents run out, or `max_depth` links have been followed.
    /// Returns the best-known entity at whichever point the walk stops.
    pub async fn find_ultimate_parent(&self, lei: &Lei, max_depth: usize) -> Lei {
        let mut current = lei.clone();

        for _ in 0..max_depth {
            let relationships = match self.get_relationships(&current).await {
                Some(relationships) => relationships,
                None => return current,
            };

            if let Some(ultimate) = relationships.ultimate_parent {
                return ultimate;
            }

            match relationships.parents.first() {
                Some(parent) => current = parent.clone(),
                None => return current,
            }
        }

        current
    }

    /// The corporate family: ultimate parent, its direct children, and the
    /// original entity, as a set.
    pub async fn get_corporate_family(&self, lei: &Lei) -> HashSet<Lei> {
        let mut family = HashSet::new();
        family.insert(lei.clone());

        let ultimate = self.find_ultimate_parent(lei, MAX_PARENT_DEPTH).await;
        if let Some(relationships) = self.get_relationships(&ultimate).await {
            family.extend(relationships.children);
        }
        family.insert(ultimate);

        family
    }
}
