use compare::{Compare, Natural};
use std::mem::replace;
use std::ptr::NonNull;
use crate::alloc::{AllocError, Global, NodeAllocator};
use crate::error::Result;
use crate::node::{self, Link, Node, Side};
use super::{CursorMut, Map};

/// An entry in the map.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub enum Entry<'a, K: 'a, V: 'a, C: 'a = Natural<K>, A: 'a = Global>
    where C: Compare<K>, A: NodeAllocator {

    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, C, A>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, C, A>),
}

impl<'a, K, V, C, A> Entry<'a, K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K {
        match *self {
            Entry::Occupied(ref e) => e.key(),
            Entry::Vacant(ref e) => e.key(),
        }
    }

    /// Returns a mutable reference to the entry's value, inserting the given value first if the
    /// entry is vacant.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default),
        }
    }

    /// Returns a mutable reference to the entry's value, inserting the value returned by `default`
    /// first if the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V where F: FnOnce() -> V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default()),
        }
    }

    /// Returns a mutable reference to the entry's value, inserting the default value first if the
    /// entry is vacant.
    pub fn or_default(self) -> &'a mut V where V: Default {
        self.or_insert_with(V::default)
    }

    /// Calls `f` on the entry's value if the entry is occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.entry("a").and_modify(|v| *v += 1).or_insert(10);
    /// map.entry("a").and_modify(|v| *v += 1).or_insert(10);
    ///
    /// assert_eq!(map[&"a"], 11);
    /// ```
    pub fn and_modify<F>(self, f: F) -> Self where F: FnOnce(&mut V) {
        match self {
            Entry::Occupied(mut e) => { f(e.get_mut()); Entry::Occupied(e) }
            Entry::Vacant(e) => Entry::Vacant(e),
        }
    }
}

/// An occupied entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct OccupiedEntry<'a, K: 'a, V: 'a, C: 'a = Natural<K>, A: 'a = Global>
    where C: Compare<K>, A: NodeAllocator {

    map: &'a mut Map<K, V, C, A>,
    node: NonNull<Node<K, V>>,
}

impl<'a, K, V, C, A> OccupiedEntry<'a, K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    pub(super) fn new(map: &'a mut Map<K, V, C, A>, node: NonNull<Node<K, V>>) -> Self {
        OccupiedEntry { map: map, node: node }
    }

    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K { unsafe { node::key(self.node) } }

    /// Returns a reference to the entry's value.
    pub fn get(&self) -> &V { unsafe { node::value(self.node) } }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self) -> &mut V { unsafe { node::value_mut(self.node) } }

    /// Returns a mutable reference to the entry's value with the same lifetime as the map.
    pub fn into_mut(self) -> &'a mut V { unsafe { node::value_mut(self.node) } }

    /// Replaces the entry's value with the given value, returning the old one.
    pub fn insert(&mut self, value: V) -> V { replace(self.get_mut(), value) }

    /// Removes the entry from the map and returns its key and value.
    pub fn remove(self) -> (K, V) { unsafe { self.map.unlink(self.node).0 } }

    /// Converts the entry into a mutable cursor resting on it.
    pub fn into_cursor(self) -> CursorMut<'a, K, V, C, A> {
        CursorMut::new(self.map, Some(self.node))
    }
}

/// A vacant entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct VacantEntry<'a, K: 'a, V: 'a, C: 'a = Natural<K>, A: 'a = Global>
    where C: Compare<K>, A: NodeAllocator {

    map: &'a mut Map<K, V, C, A>,
    key: K,
    parent: Link<K, V>,
    side: Side,
}

impl<'a, K, V, C, A> VacantEntry<'a, K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    pub(super) fn new(map: &'a mut Map<K, V, C, A>, key: K, parent: Link<K, V>, side: Side)
        -> Self {

        VacantEntry { map: map, key: key, parent: parent, side: side }
    }

    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K { &self.key }

    /// Returns the entry's key without inserting anything.
    pub fn into_key(self) -> K { self.key }

    /// Inserts the entry into the map with its key and the given value, returning a mutable
    /// reference to the value with the same lifetime as the map.
    ///
    /// # Panics
    ///
    /// Aborts through `std::alloc::handle_alloc_error` if a node cannot be allocated.
    pub fn insert(self, value: V) -> &'a mut V {
        self.attach(value).unwrap_or_else(|e| node::oom::<K, V>(e))
    }

    /// Inserts the entry into the map with its key and the given value, returning a mutable
    /// reference to the value with the same lifetime as the map, or an error if a node cannot be
    /// allocated. On failure the map is left unchanged.
    pub fn try_insert(self, value: V) -> Result<&'a mut V> {
        Ok(self.attach(value)?)
    }

    fn attach(self, value: V) -> ::std::result::Result<&'a mut V, AllocError> {
        let VacantEntry { map, key, parent, side } = self;
        let node = node::attach(&mut map.root, &map.alloc, parent, side, key, value)?;
        map.len += 1;
        Ok(unsafe { node::value_mut(node) })
    }
}
