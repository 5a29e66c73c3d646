//! Sparse Merkle map over 256-bit keys.
//!
//! The map is a complete binary tree of depth [`MAP_DEPTH`]. Leaf `k` holds
//! the value stored at key `k` (or [`EMPTY_VALUE`] when absent), and each key
//! bit, starting from the least significant one, selects left (`0`) or right
//! (`1`) on the way from the leaf to the root.
//!
//! Only non-empty nodes are stored; empty subtrees are filled in from a
//! precomputed table of default hashes.
//!
//! ```text
//! level 256            root
//!                    /      \
//!   ...           ...        ...
//! level 0   leaf(k=0..0)  ...  leaf(k=1..1)
//! ```
//!
//! A [`MapWitness`] is the sibling path of one key. It recomputes the root for
//! any claimed value at that key and recovers the key from its left/right
//! choices, so a verifier holding only the root can check both.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    digest::Digest,
    error::{CommonError, Result},
    hash::hash_pair,
    MapKey, MapValue, Root, EMPTY_VALUE,
};

/// Number of levels between a leaf and the root.
pub const MAP_DEPTH: usize = 256;

/// `EMPTY_SUBTREES[h]` is the root of an empty subtree of height `h`.
static EMPTY_SUBTREES: Lazy<Vec<Digest>> = Lazy::new(|| {
    let mut levels = Vec::with_capacity(MAP_DEPTH + 1);
    levels.push(EMPTY_VALUE);
    for h in 0..MAP_DEPTH {
        let below = levels[h];
        levels.push(hash_pair(&below, &below));
    }
    levels
});

fn empty_subtree(height: usize) -> Digest {
    EMPTY_SUBTREES[height]
}

/// Root of a map with no entries.
pub fn empty_root() -> Root {
    empty_subtree(MAP_DEPTH)
}

/// Full off-circuit copy of an authenticated map.
///
/// Whoever holds this structure produces witnesses; state machines only ever
/// see roots and witnesses.
#[derive(Clone, Debug, Default)]
pub struct AuthenticatedMap {
    /// Non-empty nodes keyed by `(height, key prefix)`.
    nodes: HashMap<(u16, Digest), Digest>,
    /// Number of keys holding a non-empty value.
    len: usize,
}

impl AuthenticatedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current root.
    pub fn root(&self) -> Root {
        self.node(MAP_DEPTH, &Digest::ZERO)
    }

    /// Number of keys holding a non-empty value.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value at `key`, [`EMPTY_VALUE`] when absent.
    pub fn get(&self, key: &MapKey) -> MapValue {
        self.node(0, key)
    }

    /// Store `value` at `key` and return the new root.
    ///
    /// Setting [`EMPTY_VALUE`] removes the entry.
    pub fn set(&mut self, key: MapKey, value: MapValue) -> Root {
        let previous = self.get(&key);
        match (previous == EMPTY_VALUE, value == EMPTY_VALUE) {
            (true, false) => self.len += 1,
            (false, true) => self.len -= 1,
            _ => {}
        }

        self.store(0, key, value);

        let mut current = value;
        for height in 0..MAP_DEPTH {
            let sibling = self.node(height, &sibling_prefix(&key, height));
            current = if key.bit(height) {
                hash_pair(&sibling, &current)
            } else {
                hash_pair(&current, &sibling)
            };
            self.store(height + 1, key.clear_low_bits(height + 1), current);
        }

        current
    }

    /// Sibling path for `key` against the current root.
    pub fn witness(&self, key: &MapKey) -> MapWitness {
        let mut siblings = Vec::with_capacity(MAP_DEPTH);
        let mut is_left = Vec::with_capacity(MAP_DEPTH);
        for height in 0..MAP_DEPTH {
            siblings.push(self.node(height, &sibling_prefix(key, height)));
            is_left.push(!key.bit(height));
        }
        MapWitness { siblings, is_left }
    }

    fn node(&self, height: usize, prefix: &Digest) -> Digest {
        self.nodes
            .get(&(height as u16, *prefix))
            .copied()
            .unwrap_or_else(|| empty_subtree(height))
    }

    fn store(&mut self, height: usize, prefix: Digest, value: Digest) {
        if value == empty_subtree(height) {
            self.nodes.remove(&(height as u16, prefix));
        } else {
            self.nodes.insert((height as u16, prefix), value);
        }
    }
}

/// Prefix of the sibling of the node containing `key` at `height`.
fn sibling_prefix(key: &MapKey, height: usize) -> Digest {
    key.clear_low_bits(height).with_bit(height, !key.bit(height))
}

/// Sibling path from one leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWitness {
    /// Sibling hash at each level, leaf level first.
    pub siblings: Vec<Digest>,
    /// Whether the path node is the left child at each level.
    pub is_left: Vec<bool>,
}

impl MapWitness {
    /// Root the map would have if the witnessed key held `value`.
    pub fn compute_root(&self, value: &MapValue) -> Root {
        self.compute_root_and_key(value).0
    }

    /// Root for `value`, together with the key encoded by the path.
    ///
    /// Never fails: a malformed witness simply derives a root that will not
    /// match any committed one.
    pub fn compute_root_and_key(&self, value: &MapValue) -> (Root, MapKey) {
        let mut current = *value;
        let mut key = Digest::ZERO;
        for (height, (sibling, is_left)) in self.siblings.iter().zip(&self.is_left).enumerate() {
            if *is_left {
                current = hash_pair(&current, sibling);
            } else {
                current = hash_pair(sibling, &current);
                if height < MAP_DEPTH {
                    key = key.with_bit(height, true);
                }
            }
        }
        (current, key)
    }

    /// Key encoded by the path.
    pub fn key(&self) -> MapKey {
        self.compute_root_and_key(&EMPTY_VALUE).1
    }

    /// Check that the witness spans exactly [`MAP_DEPTH`] levels.
    pub fn ensure_well_formed(&self) -> Result<()> {
        let actual = self.siblings.len().min(self.is_left.len());
        if self.siblings.len() != MAP_DEPTH || self.is_left.len() != MAP_DEPTH {
            return Err(CommonError::MalformedWitness {
                expected: MAP_DEPTH,
                actual,
            });
        }
        Ok(())
    }
}
