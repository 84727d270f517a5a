use crate::index::types::{FragmentId, PathHash};
use rustc_hash::FxHashMap;
use std::borrow::Cow;

/// Deduplicating store for fragment text.
///
/// Lookup is ASCII case-insensitive: `"Doors"` and `"doors"` share one id,
/// and the spelling seen first is the one kept. Each id carries the hash
/// it was registered with.
#[derive(Debug, Default)]
pub struct FragmentPool {
    lookup: FxHashMap<Box<str>, FragmentId>,
    entries: Vec<PoolEntry>,
}

#[derive(Debug)]
struct PoolEntry {
    text: Box<str>,
    hash: PathHash,
}

impl FragmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `text`, registering it with `hash` if unseen.
    ///
    /// Panics when the id space is exhausted.
    pub fn intern(&mut self, text: &str, hash: PathHash) -> FragmentId {
        let key = fold_case(text);
        if let Some(&id) = self.lookup.get(key.as_ref()) {
            return id;
        }

        let id = FragmentId::try_from(self.entries.len())
            .unwrap_or_else(|_| panic!("fragment pool exhausted at {} entries", self.entries.len()));
        self.entries.push(PoolEntry {
            text: text.into(),
            hash,
        });
        self.lookup.insert(key.into_owned().into_boxed_str(), id);
        id
    }

    /// Id of `text` if it has been interned
    pub fn id_of(&self, text: &str) -> Option<FragmentId> {
        self.lookup.get(fold_case(text).as_ref()).copied()
    }

    /// Text registered for `id`
    #[inline]
    pub fn text(&self, id: FragmentId) -> &str {
        &self.entries[id as usize].text
    }

    /// Hash registered for `id`
    #[inline]
    pub fn hash(&self, id: FragmentId) -> PathHash {
        self.entries[id as usize].hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.lookup.clear();
        self.entries.clear();
    }
}

fn fold_case(text: &str) -> Cow<'_, str> {
    if text.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(text.to_ascii_lowercase())
    } else {
        Cow::Borrowed(text)
    }
}
