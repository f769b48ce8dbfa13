//! Corporate-hierarchy types: relationship records, cache entries, levels

use crate::lei::Lei;
use serde::{Deserialize, Serialize};

/// Cache TTL for resolved relationships: 7 days, in seconds.
pub const RELATIONSHIP_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// An entity's position in its corporate family.
///
/// Derived purely from the shape of its relationships:
/// - no parents, at least one child: `UltimateParent`
/// - no parents, no children: `Standalone`
/// - an explicit ultimate-parent reference: `Subsidiary`
/// - parents but no recorded ultimate parent: `Parent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    /// Top of an ownership chain with known children
    UltimateParent,

    /// Has parents of its own but no recorded ultimate parent
    Parent,

    /// Consolidated under an ultimate parent
    Subsidiary,

    /// No recorded relationships in either direction
    Standalone,
}

impl HierarchyLevel {
    /// Get the level as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            HierarchyLevel::UltimateParent => "ultimate_parent",
            HierarchyLevel::Parent => "parent",
            HierarchyLevel::Subsidiary => "subsidiary",
            HierarchyLevel::Standalone => "standalone",
        }
    }

    /// Parse a level from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ultimate_parent" => Some(HierarchyLevel::UltimateParent),
            "parent" => Some(HierarchyLevel::Parent),
            "subsidiary" => Some(HierarchyLevel::Subsidiary),
            "standalone" => Some(HierarchyLevel::Standalone),
            _ => None,
        }
    }

    /// Human-readable label used in assembled reasoning text
    pub fn label(&self) -> &'static str {
        match self {
            HierarchyLevel::UltimateParent => "ultimate parent entity",
            HierarchyLevel::Parent => "parent entity",
            HierarchyLevel::Subsidiary => "subsidiary",
            HierarchyLevel::Standalone => "standalone entity",
        }
    }
}

/// Direction tag on a relationship record from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipDirection {
    /// The subject entity is directly consolidated by the related entity
    DirectConsolidation,

    /// The subject entity is ultimately consolidated by the related entity
    UltimateConsolidation,

    /// The subject entity directly consolidates the related entity
    DirectlyConsolidates,
}

impl RelationshipDirection {
    /// Classify a registry relationship-type tag.
    ///
    /// Tags vary in punctuation across registry endpoints
    /// (`IS_DIRECTLY_CONSOLIDATED_BY`, `direct-parent`, ...), so matching is
    /// on normalized substrings.
    pub fn classify(tag: &str) -> Option<Self> {
        let tag = tag.to_lowercase().replace(['_', '-'], " ");
        if tag.contains("ultimately consolidated") || tag.contains("ultimate parent") {
            Some(RelationshipDirection::UltimateConsolidation)
        } else if tag.contains("directly consolidated") || tag.contains("direct parent") {
            Some(RelationshipDirection::DirectConsolidation)
        } else if tag.contains("consolidates") || tag.contains("child") {
            Some(RelationshipDirection::DirectlyConsolidates)
        } else {
            None
        }
    }
}

/// One relationship record as returned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// The entity on the other side of the relationship
    pub related_lei: Lei,

    /// Registry relationship-type tag, verbatim
    pub relationship_type: String,

    /// Registry relationship status (e.g. "ACTIVE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
}

/// An entity's resolved corporate-hierarchy position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRelationships {
    /// Direct parents
    pub parents: Vec<Lei>,

    /// Ultimate parent, when the registry records one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimate_parent: Option<Lei>,

    /// Direct children
    pub children: Vec<Lei>,
}

impl EntityRelationships {
    /// Bucket raw registry records into parents/ultimate-parent/children.
    ///
    /// Records with an unrecognized relationship-type tag are dropped.
    pub fn from_records(records: &[RelationshipRecord]) -> Self {
        let mut resolved = Self::default();
        for record in records {
            match RelationshipDirection::classify(&record.relationship_type) {
                Some(RelationshipDirection::DirectConsolidation) => {
                    resolved.parents.push(record.related_lei.clone());
                }
                Some(RelationshipDirection::UltimateConsolidation) => {
                    resolved.ultimate_parent = Some(record.related_lei.clone());
                }
                Some(RelationshipDirection::DirectlyConsolidates) => {
                    resolved.children.push(record.related_lei.clone());
                }
                None => {}
            }
        }
        resolved
    }

    /// Derive the four-way hierarchy classification.
    pub fn hierarchy_level(&self) -> HierarchyLevel {
        if self.parents.is_empty() && !self.children.is_empty() {
            HierarchyLevel::UltimateParent
        } else if self.parents.is_empty() && self.children.is_empty() {
            HierarchyLevel::Standalone
        } else if self.ultimate_parent.is_some() {
            HierarchyLevel::Subsidiary
        } else {
            HierarchyLevel::Parent
        }
    }
}

/// A cached relationship resolution, keyed uniquely by LEI.
///
/// A fresh resolution always overwrites the prior entry and resets the TTL
/// (upsert semantics; last writer wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCacheEntry {
    /// The entity this entry describes
    pub lei: Lei,

    /// First direct parent, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_lei: Option<Lei>,

    /// Ultimate parent, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimate_parent_lei: Option<Lei>,

    /// Relationship-type tag of the primary parent record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,

    /// Relationship status of the primary parent record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,

    /// The full resolved relationship set
    pub relationships: EntityRelationships,

    /// Unix seconds at write time
    pub cached_at: u64,

    /// Unix seconds after which the entry is stale
    pub expires_at: u64,
}

impl RelationshipCacheEntry {
    /// Build an entry from a resolution, stamping the 7-day TTL from `now`.
    pub fn from_relationships(lei: Lei, relationships: EntityRelationships, now: u64) -> Self {
        Self {
            lei,
            parent_lei: relationships.parents.first().cloned(),
            ultimate_parent_lei: relationships.ultimate_parent.clone(),
            relationship_type: None,
            relationship_status: None,
            relationships,
            cached_at: now,
            expires_at: now + RELATIONSHIP_CACHE_TTL_SECS,
        }
    }

    /// Whether the entry has passed its expiry
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}
