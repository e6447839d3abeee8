//! Value-interning pool for immutable block words.
//!
//! A 24-bit word has far fewer distinct values than a blueprint has
//! positions, so the spatial index shares one allocation per distinct
//! value. Purely a memory optimization: equality stays by value
//! everywhere, never by pointer identity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::word::BlockWord;

#[derive(Default, Debug)]
pub struct BlockPool {
    map: HashMap<(u8, u32), Arc<BlockWord>>,
}

impl BlockPool {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Returns the shared instance for this word's packed value, creating
    /// it on first sight. Equal packed value and version yield the
    /// identical `Arc`.
    pub fn canonicalize(&mut self, word: BlockWord) -> Arc<BlockWord> {
        Arc::clone(
            self.map
                .entry((word.version(), word.packed()))
                .or_insert_with(|| Arc::new(word)),
        )
    }

    /// Number of distinct interned values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops entries nothing outside the pool references anymore.
    pub fn purge(&mut self) {
        self.map.retain(|_, word| Arc::strong_count(word) > 1);
    }

    /// Empties the pool entirely (e.g. between blueprint loads).
    pub fn clear(&mut self) {
        self.map.clear();
    }
}
