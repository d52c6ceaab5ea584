//! Interned dimensional contexts.
//!
//! A context is a path from the root through a sequence of dimensions
//! (entity, segments, period, instant). Every `with_*` call adds exactly one
//! layer and is interned on `(parent, dimension key)`, so walking the same
//! dimensional path twice yields the same [`ContextId`]. Downstream consumers
//! group facts by that identity.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use generational_arena::{Arena, Index};
use sha2::{Digest, Sha256};
use tracing::{instrument, trace};

use crate::domain::period::Period;

/// Stable handle of an interned context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(Index);

/// Reporting entity, e.g. a company registration number within a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    pub scheme: String,
    pub id: String,
}

/// The single dimension a context node adds to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    Entity(Entity),
    /// Classification segments, sorted by key.
    Segments(Vec<(String, String)>),
    Period(Period),
    Instant(NaiveDate),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Entity(e) => write!(f, "entity {}#{}", e.scheme, e.id),
            Dimension::Segments(segs) => {
                write!(f, "segments ")?;
                for (i, (k, v)) in segs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                Ok(())
            }
            Dimension::Period(p) => write!(f, "period {}..{}", p.start, p.end),
            Dimension::Instant(d) => write!(f, "instant {}", d),
        }
    }
}

/// Interning key: kind of dimension plus its canonical value.
///
/// Periods are keyed on their dates only, so a named reporting period and an
/// anonymous evaluation window covering the same days share one context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DimensionKey {
    Entity { scheme: String, id: String },
    Segments(String),
    Period(String),
    Instant(String),
}

impl Dimension {
    fn key(&self) -> DimensionKey {
        match self {
            Dimension::Entity(e) => DimensionKey::Entity {
                scheme: e.scheme.clone(),
                id: e.id.clone(),
            },
            Dimension::Segments(segs) => DimensionKey::Segments(segment_hash(segs)),
            Dimension::Period(p) => DimensionKey::Period(format!("{}/{}", p.start, p.end)),
            Dimension::Instant(d) => DimensionKey::Instant(d.to_string()),
        }
    }
}

/// Hex SHA-256 over the sorted `key=value` lines of a segment set.
pub fn segment_hash(segments: &[(String, String)]) -> String {
    let mut hasher = Sha256::new();
    for (k, v) in segments {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Context node stored in the arena.
#[derive(Debug)]
pub struct ContextNode {
    /// Parent context, None for the root
    pub parent: Option<ContextId>,
    /// Dimension added by this layer, None for the root
    pub dimension: Option<Dimension>,
}

/// Arena owning every context together with the interning table.
#[derive(Debug)]
pub struct ContextArena {
    arena: Arena<ContextNode>,
    root: ContextId,
    interned: HashMap<(ContextId, DimensionKey), ContextId>,
}

impl Default for ContextArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextArena {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = ContextId(arena.insert(ContextNode {
            parent: None,
            dimension: None,
        }));
        Self {
            arena,
            root,
            interned: HashMap::new(),
        }
    }

    /// The dimensionless root context.
    pub fn root(&self) -> ContextId {
        self.root
    }

    pub fn get_node(&self, id: ContextId) -> Option<&ContextNode> {
        self.arena.get(id.0)
    }

    /// Number of contexts allocated so far, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn with_entity(&mut self, parent: ContextId, scheme: &str, id: &str) -> ContextId {
        self.with_dimension(
            parent,
            Dimension::Entity(Entity {
                scheme: scheme.to_string(),
                id: id.to_string(),
            }),
        )
    }

    pub fn with_period(&mut self, parent: ContextId, period: &Period) -> ContextId {
        self.with_dimension(parent, Dimension::Period(period.clone()))
    }

    pub fn with_instant(&mut self, parent: ContextId, instant: NaiveDate) -> ContextId {
        self.with_dimension(parent, Dimension::Instant(instant))
    }

    /// Segments are canonicalised by key order before interning.
    pub fn with_segments(&mut self, parent: ContextId, segments: &[(String, String)]) -> ContextId {
        let mut sorted = segments.to_vec();
        sorted.sort();
        self.with_dimension(parent, Dimension::Segments(sorted))
    }

    #[instrument(level = "trace", skip(self))]
    fn with_dimension(&mut self, parent: ContextId, dimension: Dimension) -> ContextId {
        let key = (parent, dimension.key());
        if let Some(&existing) = self.interned.get(&key) {
            return existing;
        }
        let child = ContextId(self.arena.insert(ContextNode {
            parent: Some(parent),
            dimension: Some(dimension),
        }));
        trace!("allocated context {:?} under {:?}", child, parent);
        self.interned.insert(key, child);
        child
    }

    /// Iterate from `id` up to the root.
    pub fn ancestors(&self, id: ContextId) -> AncestorIterator<'_> {
        AncestorIterator::new(self, id)
    }

    /// Dimensions along the path, root first.
    pub fn get_dimensions(&self, id: ContextId) -> Vec<&Dimension> {
        let mut dims: Vec<&Dimension> = self
            .ancestors(id)
            .filter_map(|(_, node)| node.dimension.as_ref())
            .collect();
        dims.reverse();
        dims
    }

    /// Nearest dimension on the path satisfying `pick`.
    fn nearest<'a, T>(
        &'a self,
        id: ContextId,
        pick: impl Fn(&'a Dimension) -> Option<T>,
    ) -> Option<T> {
        self.ancestors(id)
            .filter_map(|(_, node)| node.dimension.as_ref())
            .find_map(pick)
    }

    pub fn entity(&self, id: ContextId) -> Option<&Entity> {
        self.nearest(id, |d| match d {
            Dimension::Entity(e) => Some(e),
            _ => None,
        })
    }

    pub fn period(&self, id: ContextId) -> Option<&Period> {
        self.nearest(id, |d| match d {
            Dimension::Period(p) => Some(p),
            _ => None,
        })
    }

    pub fn instant(&self, id: ContextId) -> Option<NaiveDate> {
        self.nearest(id, |d| match d {
            Dimension::Instant(i) => Some(*i),
            _ => None,
        })
    }

    pub fn segments(&self, id: ContextId) -> Option<&[(String, String)]> {
        self.nearest(id, |d| match d {
            Dimension::Segments(s) => Some(s.as_slice()),
            _ => None,
        })
    }
}

pub struct AncestorIterator<'a> {
    arena: &'a ContextArena,
    next: Option<ContextId>,
}

impl<'a> AncestorIterator<'a> {
    fn new(arena: &'a ContextArena, start: ContextId) -> Self {
        Self {
            arena,
            next: Some(start),
        }
    }
}

impl<'a> Iterator for AncestorIterator<'a> {
    type Item = (ContextId, &'a ContextNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let node = self.arena.get_node(current)?;
        self.next = node.parent;
        Some((current, node))
    }
}
