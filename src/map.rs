//! An ordered map based on a binary search tree.

mod cursor;
mod entry;

use compare::{Compare, Natural};
use std::cmp::Ordering::{self, *};
use std::fmt::{self, Debug};
use std::hash::{self, Hash};
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ops::{self, Bound};
use std::ptr::NonNull;
use crate::alloc::{Global, NodeAllocator};
use crate::error::{Error, Result};
use crate::node::{self, Dir, Left, Link, Node, Right, Search};

pub use self::cursor::{Cursor, CursorMut};
pub use self::entry::{Entry, OccupiedEntry, VacantEntry};

/// An ordered map based on a binary search tree.
///
/// Entries are kept in ascending order of their keys according to the map's comparator `C`, and
/// every key appears at most once. Nodes are allocated one at a time through the map's
/// [`NodeAllocator`](../alloc/trait.NodeAllocator.html) `A`.
///
/// The tree is never rebalanced: its depth depends on the order of insertions, and inserting keys
/// in sorted order degenerates it into a chain. Lookups and updates take time proportional to the
/// depth of the tree.
///
/// The behavior of this map is undefined if a key's ordering relative to any other key changes
/// while the key is in the map. This is normally only possible through `Cell`, `RefCell`, or
/// unsafe code.
pub struct Map<K, V, C = Natural<K>, A = Global> where C: Compare<K>, A: NodeAllocator {
    root: Link<K, V>,
    len: usize,
    cmp: C,
    alloc: A,
    _marker: PhantomData<Box<Node<K, V>>>,
}

unsafe impl<K, V, C, A> Send for Map<K, V, C, A>
    where K: Send, V: Send, C: Compare<K> + Send, A: NodeAllocator + Send {}

unsafe impl<K, V, C, A> Sync for Map<K, V, C, A>
    where K: Sync, V: Sync, C: Compare<K> + Sync, A: NodeAllocator + Sync {}

impl<K, V> Map<K, V> where K: Ord {
    /// Creates an empty map ordered according to the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn new() -> Self { Map::with_cmp(compare::natural()) }
}

impl<K, V, A> Map<K, V, Natural<K>, A> where K: Ord, A: NodeAllocator {
    /// Creates an empty map ordered according to the natural order of its keys, whose nodes are
    /// allocated through `alloc`.
    pub fn new_in(alloc: A) -> Self { Map::with_cmp_in(compare::natural(), alloc) }
}

impl<K, V, C> Map<K, V, C> where C: Compare<K> {
    /// Creates an empty map ordered according to the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let mut map = tree_map::Map::with_cmp(natural().rev());
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn with_cmp(cmp: C) -> Self { Map::with_cmp_in(cmp, Global) }
}

impl<K, V, C, A> Map<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    /// Creates an empty map ordered according to the given comparator, whose nodes are allocated
    /// through `alloc`.
    pub fn with_cmp_in(cmp: C, alloc: A) -> Self {
        Map { root: None, len: 0, cmp: cmp, alloc: alloc, _marker: PhantomData }
    }

    /// Checks if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert!(map.is_empty());
    ///
    /// map.insert(2, "b");
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool { self.root.is_none() }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert_eq!(map.len(), 0);
    ///
    /// map.insert(2, "b");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize { self.len }

    /// Returns a reference to the map's comparator, the ordering relation over its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    /// use tree_map::Map;
    ///
    /// let map: Map<i32, &str> = Map::new();
    /// assert!(map.key_comp().compares_lt(&1, &2));
    ///
    /// let map: Map<i32, &str, _> = Map::with_cmp(natural().rev());
    /// assert!(map.key_comp().compares_gt(&1, &2));
    /// ```
    pub fn key_comp(&self) -> &C { &self.cmp }

    /// Returns the ordering relation over whole entries induced by the map's comparator.
    ///
    /// Entries are compared by key only.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::Compare;
    ///
    /// let map: tree_map::Map<i32, &str> = tree_map::Map::new();
    /// assert!(map.value_comp().compares_lt(&(&1, &"z"), &(&2, &"a")));
    /// assert!(map.value_comp().compares_eq(&(&1, &"z"), &(&1, &"a")));
    /// ```
    pub fn value_comp(&self) -> EntryCompare<'_, C> { EntryCompare(&self.cmp) }

    /// Returns a reference to the map's node allocator.
    pub fn allocator(&self) -> &A { &self.alloc }

    /// Removes all entries from the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.iter().next(), Some((&1, &"a")));
    ///
    /// map.clear();
    ///
    /// assert_eq!(map.len(), 0);
    /// assert!(map.begin() == map.end());
    /// ```
    pub fn clear(&mut self) {
        let count = unsafe { node::clear(&mut self.root, &self.alloc) };
        debug_assert_eq!(count, self.len);
        if count > 0 { tracing::trace!(count, "cleared map"); }
        self.len = 0;
    }

    /// Inserts an entry into the map unless the map already contains an equal key.
    ///
    /// Returns a cursor at the entry holding the key and whether this call inserted it. If the
    /// key was already present, the map is not modified and the given key and value are dropped.
    ///
    /// # Panics
    ///
    /// Aborts through `std::alloc::handle_alloc_error` if a node cannot be allocated. See
    /// [`try_insert`](#method.try_insert) for a fallible version.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// let (cursor, inserted) = map.insert(1, "a");
    /// assert_eq!(cursor.key_value(), Some((&1, &"a")));
    /// assert!(inserted);
    ///
    /// let (cursor, inserted) = map.insert(1, "b");
    /// assert_eq!(cursor.key_value(), Some((&1, &"a")));
    /// assert!(!inserted);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (CursorMut<'_, K, V, C, A>, bool) {
        let (node, inserted) = node::insert(&mut self.root, &self.cmp, &self.alloc, key, value)
            .unwrap_or_else(|e| node::oom::<K, V>(e));
        if inserted { self.len += 1; }
        (CursorMut::new(self, Some(node)), inserted)
    }

    /// Inserts an entry into the map unless the map already contains an equal key, reporting
    /// allocation failure instead of aborting.
    ///
    /// On failure the map is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert!(map.try_insert(1, "a").unwrap().1);
    /// assert!(!map.try_insert(1, "b").unwrap().1);
    /// assert_eq!(map[&1], "a");
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(CursorMut<'_, K, V, C, A>, bool)> {
        let (node, inserted) = node::insert(&mut self.root, &self.cmp, &self.alloc, key, value)?;
        if inserted { self.len += 1; }
        Ok((CursorMut::new(self, Some(node)), inserted))
    }

    /// Returns a mutable reference to the value associated with the given key, inserting the
    /// default value first if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// *map.get_or_insert(7) += 3;
    /// *map.get_or_insert(7) += 4;
    ///
    /// assert_eq!(map.get(&7), Some(&7));
    /// ```
    pub fn get_or_insert(&mut self, key: K) -> &mut V where V: Default {
        self.entry(key).or_default()
    }

    /// Returns the entry for the given key, which is either occupied or vacant.
    ///
    /// The tree is descended only once, whatever is done with the entry afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_map::map::Entry;
    ///
    /// let mut counts = tree_map::Map::new();
    ///
    /// for s in vec!["a", "b", "a", "c", "a", "b"] {
    ///     match counts.entry(s) {
    ///         Entry::Occupied(mut e) => { *e.get_mut() += 1; }
    ///         Entry::Vacant(e) => { e.insert(1); }
    ///     }
    /// }
    ///
    /// assert_eq!(counts[&"a"], 3);
    /// assert_eq!(counts[&"b"], 2);
    /// assert_eq!(counts[&"c"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, C, A> {
        match node::search(self.root, &self.cmp, &key) {
            Search::Found(node) => Entry::Occupied(OccupiedEntry::new(self, node)),
            Search::Vacant(parent, side) =>
                Entry::Vacant(VacantEntry::new(self, key, parent, side)),
        }
    }

    /// Removes the entry whose key is equal to the given key, returning the number of entries
    /// removed (zero or one).
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// map.insert(1, "a");
    ///
    /// assert_eq!(map.erase(&1), 1);
    /// assert_eq!(map.erase(&1), 0);
    /// assert!(map.is_empty());
    /// ```
    pub fn erase<Q: ?Sized>(&mut self, key: &Q) -> usize where C: Compare<Q, K> {
        if self.remove(key).is_some() { 1 } else { 0 }
    }

    /// Removes and returns the entry whose key is equal to the given key, returning `None` if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.remove(&1), Some((1, "a")));
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), None);
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)> where C: Compare<Q, K> {
        let node = node::find(self.root, &self.cmp, key)?;
        Some(unsafe { self.unlink(node).0 })
    }

    /// Removes every entry whose key lies within the given bounds, returning how many were
    /// removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::{Excluded, Included, Unbounded};
    ///
    /// let mut map: tree_map::Map<_, _> = (1..10).map(|i| (i, i * 10)).collect();
    ///
    /// assert_eq!(map.erase_range(Included(&3), Excluded(&6)), 3);
    /// assert_eq!(map.erase_range(Excluded(&8), Unbounded::<&i32>), 1);
    /// assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [1, 2, 6, 7, 8]);
    /// ```
    pub fn erase_range<Min: ?Sized, Max: ?Sized>(&mut self, min: Bound<&Min>, max: Bound<&Max>)
        -> usize where C: Compare<Min, K> + Compare<Max, K> {

        let mut link = node::start(self.root, &self.cmp, min);
        let end = node::stop(self.root, &self.cmp, max);

        if let (Some(first), Some(end)) = (link, end) {
            let order = <C as Compare<K>>::compare(&self.cmp, unsafe { node::key(first) },
                                                   unsafe { node::key(end) });
            if order == Greater { return 0; }
        }

        let mut count = 0;

        while let Some(node) = link {
            if link == end { break; }

            let succ = unsafe { Right::step(node) };
            let (_, next) = unsafe { self.unlink(node) };
            count += 1;

            // The end's entry may have just been moved into `node`.
            if succ == end { break; }
            link = next;
        }

        if count > 0 { tracing::trace!(count, "erased range"); }
        count
    }

    /// Returns a cursor at the entry whose key is equal to the given key, or at the end if the map
    /// does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: tree_map::Map<_, _> = vec![(1, "a"), (2, "b"), (3, "c")].into_iter().collect();
    ///
    /// assert_eq!(map.find(&2).key_value(), Some((&2, &"b")));
    /// assert!(map.find(&99) == map.end());
    /// ```
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Cursor<'_, K, V> where C: Compare<Q, K> {
        Cursor::new(self.root, node::find(self.root, &self.cmp, key))
    }

    /// Returns a mutable cursor at the entry whose key is equal to the given key, or at the end if
    /// the map does not contain the key.
    pub fn find_mut<Q: ?Sized>(&mut self, key: &Q) -> CursorMut<'_, K, V, C, A>
        where C: Compare<Q, K> {

        let node = node::find(self.root, &self.cmp, key);
        CursorMut::new(self, node)
    }

    /// Returns the number of entries whose key is equal to the given key (zero or one).
    pub fn count<Q: ?Sized>(&self, key: &Q) -> usize where C: Compare<Q, K> {
        if self.contains_key(key) { 1 } else { 0 }
    }

    /// Checks if the map contains the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert!(!map.contains_key(&1));
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool where C: Compare<Q, K> {
        node::find(self.root, &self.cmp, key).is_some()
    }

    /// Returns a reference to the value associated with the given key, or `None` if the map does
    /// not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V> where C: Compare<Q, K> {
        node::find(self.root, &self.cmp, key).map(|node| unsafe { node::value(node) })
    }

    /// Returns a mutable reference to the value associated with the given key, or `None` if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    ///
    /// {
    ///     let value = map.get_mut(&1).unwrap();
    ///     assert_eq!(*value, "a");
    ///     *value = "b";
    /// }
    ///
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V> where C: Compare<Q, K> {
        node::find(self.root, &self.cmp, key).map(|node| unsafe { node::value_mut(node) })
    }

    /// Returns a reference to the value associated with the given key, or
    /// `Error::OutOfRange` if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_map::Error;
    ///
    /// let mut map = tree_map::Map::new();
    /// map.insert(1, "a");
    ///
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(Error::OutOfRange));
    /// ```
    pub fn at<Q: ?Sized>(&self, key: &Q) -> Result<&V> where C: Compare<Q, K> {
        self.get(key).ok_or(Error::OutOfRange)
    }

    /// Returns a mutable reference to the value associated with the given key, or
    /// `Error::OutOfRange` if the map does not contain the key.
    pub fn at_mut<Q: ?Sized>(&mut self, key: &Q) -> Result<&mut V> where C: Compare<Q, K> {
        self.get_mut(key).ok_or(Error::OutOfRange)
    }

    /// Returns a reference to the map's minimum key and a reference to its associated value, or
    /// `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert_eq!(map.first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.first(), Some((&1, &"a")));
    /// ```
    pub fn first(&self) -> Option<(&K, &V)> {
        Left::extremum(self.root).map(|node| unsafe { node::key_value(node) })
    }

    /// Returns a reference to the map's maximum key and a reference to its associated value, or
    /// `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    /// assert_eq!(map.last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.last(), Some((&3, &"c")));
    /// ```
    pub fn last(&self) -> Option<(&K, &V)> {
        Right::extremum(self.root).map(|node| unsafe { node::key_value(node) })
    }

    /// Removes and returns the entry with the minimum key, or `None` if the map is empty.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = Left::extremum(self.root)?;
        Some(unsafe { self.unlink(node).0 })
    }

    /// Removes and returns the entry with the maximum key, or `None` if the map is empty.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = Right::extremum(self.root)?;
        Some(unsafe { self.unlink(node).0 })
    }

    /// Returns a cursor at the first entry whose key is not less than the given key, or at the end
    /// if there is none.
    ///
    /// The given key need not itself be present in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: tree_map::Map<_, _> = vec![(2, 'b'), (4, 'd'), (6, 'f')].into_iter().collect();
    ///
    /// assert_eq!(map.lower_bound(&4).key(), Some(&4));
    /// assert_eq!(map.lower_bound(&5).key(), Some(&6));
    /// assert!(map.lower_bound(&7) == map.end());
    /// ```
    pub fn lower_bound<Q: ?Sized>(&self, key: &Q) -> Cursor<'_, K, V> where C: Compare<Q, K> {
        Cursor::new(self.root, node::lower_bound(self.root, &self.cmp, key))
    }

    /// Returns a cursor at the first entry whose key is greater than the given key, or at the end
    /// if there is none.
    ///
    /// The given key need not itself be present in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: tree_map::Map<_, _> = vec![(2, 'b'), (4, 'd'), (6, 'f')].into_iter().collect();
    ///
    /// assert_eq!(map.upper_bound(&4).key(), Some(&6));
    /// assert_eq!(map.upper_bound(&5).key(), Some(&6));
    /// assert!(map.upper_bound(&6) == map.end());
    /// ```
    pub fn upper_bound<Q: ?Sized>(&self, key: &Q) -> Cursor<'_, K, V> where C: Compare<Q, K> {
        Cursor::new(self.root, node::upper_bound(self.root, &self.cmp, key))
    }

    /// Returns a mutable cursor at the first entry whose key is not less than the given key, or at
    /// the end if there is none.
    pub fn lower_bound_mut<Q: ?Sized>(&mut self, key: &Q) -> CursorMut<'_, K, V, C, A>
        where C: Compare<Q, K> {

        let node = node::lower_bound(self.root, &self.cmp, key);
        CursorMut::new(self, node)
    }

    /// Returns a mutable cursor at the first entry whose key is greater than the given key, or at
    /// the end if there is none.
    pub fn upper_bound_mut<Q: ?Sized>(&mut self, key: &Q) -> CursorMut<'_, K, V, C, A>
        where C: Compare<Q, K> {

        let node = node::upper_bound(self.root, &self.cmp, key);
        CursorMut::new(self, node)
    }

    /// Returns the pair `(lower_bound(key), upper_bound(key))`.
    ///
    /// The cursors delimit the entries equal to the given key: they are one entry apart if the map
    /// contains the key, and equal (at the position where it would be inserted) if it does not.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: tree_map::Map<_, _> = vec![(2, 'b'), (4, 'd'), (6, 'f')].into_iter().collect();
    ///
    /// let (lower, upper) = map.equal_range(&4);
    /// assert_eq!((lower.key(), upper.key()), (Some(&4), Some(&6)));
    ///
    /// let (lower, upper) = map.equal_range(&5);
    /// assert!(lower == upper);
    /// assert_eq!(lower.key(), Some(&6));
    /// ```
    pub fn equal_range<Q: ?Sized>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
        where C: Compare<Q, K> {

        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns a cursor at the entry with the minimum key, or at the end if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let map: tree_map::Map<_, _> = vec![(5, ()), (3, ()), (8, ())].into_iter().collect();
    ///
    /// let mut cursor = map.begin();
    /// let mut keys = vec![];
    ///
    /// while cursor != map.end() {
    ///     keys.push(*cursor.key().unwrap());
    ///     cursor.move_next();
    /// }
    ///
    /// assert_eq!(keys, [3, 5, 8]);
    /// ```
    pub fn begin(&self) -> Cursor<'_, K, V> { Cursor::new(self.root, Left::extremum(self.root)) }

    /// Returns a cursor at the end of the map, the position one past the last entry (and one
    /// before the first).
    pub fn end(&self) -> Cursor<'_, K, V> { Cursor::new(self.root, None) }

    /// Returns a cursor at the entry with the maximum key, or at the end if the map is empty.
    ///
    /// Moving it backwards visits the entries in descending order.
    pub fn rbegin(&self) -> Cursor<'_, K, V> { Cursor::new(self.root, Right::extremum(self.root)) }

    /// Returns a mutable cursor at the entry with the minimum key, or at the end if the map is
    /// empty.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, C, A> {
        let node = Left::extremum(self.root);
        CursorMut::new(self, node)
    }

    /// Returns a mutable cursor at the end of the map.
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, C, A> { CursorMut::new(self, None) }

    /// Returns an iterator over the map's entries with immutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next_back(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { iter: node::Iter::new(self.root, self.len), _marker: PhantomData }
    }

    /// Returns an iterator over the map's entries with mutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = tree_map::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// let mut i = 1;
    ///
    /// for (_, value) in map.iter_mut() {
    ///     assert_eq!(i, *value);
    ///     *value *= 2;
    ///     i += 1;
    /// }
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 4);
    /// assert_eq!(map[&"c"], 6);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut { iter: node::Iter::new(self.root, self.len), _marker: PhantomData }
    }

    /// Returns an iterator over the map's keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> { Keys(self.iter()) }

    /// Returns an iterator over the map's values in ascending order of their keys.
    pub fn values(&self) -> Values<'_, K, V> { Values(self.iter()) }

    /// Returns an iterator over mutable references to the map's values in ascending order of
    /// their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> { ValuesMut(self.iter_mut()) }

    /// Returns an iterator that consumes the map, yielding its entries in ascending order.
    pub fn into_iter(self) -> IntoIter<K, V, C, A> { IntoIter::new(self) }

    /// Returns an iterator over the map's entries whose keys lie in the given range with
    /// immutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator. An
    /// empty iterator is returned if the lower bound lies above the upper bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::{Excluded, Included, Unbounded};
    ///
    /// let map: tree_map::Map<_, _> = (1..8).map(|i| (i, ())).collect();
    ///
    /// let keys: Vec<_> = map.range(Included(&2), Excluded(&5)).map(|e| *e.0).collect();
    /// assert_eq!(keys, [2, 3, 4]);
    ///
    /// let keys: Vec<_> = map.range(Excluded(&4), Unbounded::<&i32>).rev().map(|e| *e.0).collect();
    /// assert_eq!(keys, [7, 6, 5]);
    ///
    /// assert_eq!(map.range(Included(&5), Included(&2)).count(), 0);
    /// ```
    pub fn range<Min: ?Sized, Max: ?Sized>(&self, min: Bound<&Min>, max: Bound<&Max>)
        -> Range<'_, K, V> where C: Compare<Min, K> + Compare<Max, K> {

        let iter = node::Iter::range(self.root, self.len, &self.cmp, min, max);
        Range { iter: iter, _marker: PhantomData }
    }

    /// Returns an iterator over the map's entries whose keys lie in the given range with mutable
    /// references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::Included;
    ///
    /// let mut map: tree_map::Map<_, _> = (1..6).map(|i| (i, i)).collect();
    ///
    /// for (_, value) in map.range_mut(Included(&2), Included(&3)) { *value *= 10; }
    ///
    /// assert_eq!(map.values().cloned().collect::<Vec<_>>(), [1, 20, 30, 4, 5]);
    /// ```
    pub fn range_mut<Min: ?Sized, Max: ?Sized>(&mut self, min: Bound<&Min>, max: Bound<&Max>)
        -> RangeMut<'_, K, V> where C: Compare<Min, K> + Compare<Max, K> {

        let iter = node::Iter::range(self.root, self.len, &self.cmp, min, max);
        RangeMut { iter: iter, _marker: PhantomData }
    }

    /// Unlinks `node` from the tree, returning its entry and the node now holding the in-order
    /// successor of that entry.
    ///
    /// # Safety
    ///
    /// `node` must belong to this map's tree.
    unsafe fn unlink(&mut self, node: NonNull<Node<K, V>>) -> ((K, V), Link<K, V>) {
        self.len -= 1;
        node::remove(&mut self.root, &self.alloc, node)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Link<K, V> { self.root }
}

impl<K, V, C, A> Drop for Map<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    fn drop(&mut self) { self.clear(); }
}

impl<K, V, C, A> Clone for Map<K, V, C, A>
    where K: Clone, V: Clone, C: Compare<K> + Clone, A: NodeAllocator + Clone {

    fn clone(&self) -> Self {
        let mut map = Map::with_cmp_in(self.cmp.clone(), self.alloc.clone());
        map.root = unsafe { node::copy(self.root, &map.alloc) }
            .unwrap_or_else(|e| node::oom::<K, V>(e));
        map.len = self.len;
        map
    }
}

impl<K, V, C, A> Debug for Map<K, V, C, A>
    where K: Debug, V: Debug, C: Compare<K>, A: NodeAllocator {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, A> Default for Map<K, V, C, A>
    where C: Compare<K> + Default, A: NodeAllocator + Default {

    fn default() -> Self { Map::with_cmp_in(Default::default(), Default::default()) }
}

impl<K, V, C, A> Extend<(K, V)> for Map<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, it: I) {
        for (k, v) in it { self.insert(k, v); }
    }
}

impl<K, V, C, A> FromIterator<(K, V)> for Map<K, V, C, A>
    where C: Compare<K> + Default, A: NodeAllocator + Default {

    fn from_iter<I: IntoIterator<Item = (K, V)>>(it: I) -> Self {
        let mut map: Self = Default::default();
        map.extend(it);
        map
    }
}

impl<K, V, C, A> Hash for Map<K, V, C, A>
    where K: Hash, V: Hash, C: Compare<K>, A: NodeAllocator {

    fn hash<H: hash::Hasher>(&self, h: &mut H) {
        self.len.hash(h);
        for e in self.iter() { e.hash(h); }
    }
}

impl<'a, K, V, C, A, Q: ?Sized> ops::Index<&'a Q> for Map<K, V, C, A>
    where C: Compare<K> + Compare<Q, K>, A: NodeAllocator {

    type Output = V;
    fn index(&self, key: &Q) -> &V { self.get(key).expect("key not found") }
}

impl<'a, K, V, C, A> IntoIterator for &'a Map<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

impl<'a, K, V, C, A> IntoIterator for &'a mut Map<K, V, C, A>
    where C: Compare<K>, A: NodeAllocator {

    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> IterMut<'a, K, V> { self.iter_mut() }
}

impl<K, V, C, A> IntoIterator for Map<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C, A>;
    fn into_iter(self) -> IntoIter<K, V, C, A> { IntoIter::new(self) }
}

impl<K, V, C, A> PartialEq for Map<K, V, C, A>
    where V: PartialEq, C: Compare<K>, A: NodeAllocator {

    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(l, r)| {
            self.cmp.compares_eq(l.0, r.0) && l.1 == r.1
        })
    }
}

impl<K, V, C, A> Eq for Map<K, V, C, A> where V: Eq, C: Compare<K>, A: NodeAllocator {}

impl<K, V, C, A> PartialOrd for Map<K, V, C, A>
    where V: PartialOrd, C: Compare<K>, A: NodeAllocator {

    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Some(Equal),
                (None, Some(_)) => return Some(Less),
                (Some(_), None) => return Some(Greater),
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.partial_cmp(r.1) {
                        Some(Equal) => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return Some(non_eq),
                },
            }
        }
    }
}

impl<K, V, C, A> Ord for Map<K, V, C, A> where V: Ord, C: Compare<K>, A: NodeAllocator {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Equal,
                (None, Some(_)) => return Less,
                (Some(_), None) => return Greater,
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.cmp(r.1) {
                        Equal => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return non_eq,
                },
            }
        }
    }
}

/// The ordering relation over a map's entries, comparing them by key only.
///
/// Acquire through [`Map::value_comp`](struct.Map.html#method.value_comp).
pub struct EntryCompare<'a, C: 'a>(&'a C);

impl<'a, C> Clone for EntryCompare<'a, C> {
    fn clone(&self) -> Self { EntryCompare(self.0) }
}

impl<'a, C> Copy for EntryCompare<'a, C> {}

impl<'a, 'b, K, V, C> Compare<(&'b K, &'b V)> for EntryCompare<'a, C> where C: Compare<K> {
    fn compare(&self, l: &(&'b K, &'b V), r: &(&'b K, &'b V)) -> Ordering {
        self.0.compare(l.0, r.0)
    }
}

/// An iterator that consumes the map.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::into_iter`](struct.Map.html#method.into_iter) or the `IntoIterator`
/// trait:
///
/// ```
/// let mut map = tree_map::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct IntoIter<K, V, C = Natural<K>, A = Global> where C: Compare<K>, A: NodeAllocator {
    map: Map<K, V, C, A>,
    front: Link<K, V>,
    back: Link<K, V>,
}

unsafe impl<K, V, C, A> Send for IntoIter<K, V, C, A>
    where K: Send, V: Send, C: Compare<K> + Send, A: NodeAllocator + Send {}

unsafe impl<K, V, C, A> Sync for IntoIter<K, V, C, A>
    where K: Sync, V: Sync, C: Compare<K> + Sync, A: NodeAllocator + Sync {}

impl<K, V, C, A> IntoIter<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    fn new(map: Map<K, V, C, A>) -> Self {
        let front = Left::extremum(map.root);
        let back = Right::extremum(map.root);
        IntoIter { map: map, front: front, back: back }
    }

    // The extremes have at most one child, so unlinking one never moves another entry between
    // nodes and the opposite end stays valid.
    fn take<D: Dir>(&mut self, end: Link<K, V>) -> Option<((K, V), Link<K, V>)> {
        if self.map.len == 0 { return None; }
        let node = end?;
        let next = unsafe { D::step(node) };
        Some((unsafe { self.map.unlink(node).0 }, next))
    }
}

impl<K, V, C, A> Iterator for IntoIter<K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let (entry, next) = self.take::<Right>(self.front)?;
        self.front = next;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.map.len, Some(self.map.len)) }
}

impl<K, V, C, A> DoubleEndedIterator for IntoIter<K, V, C, A>
    where C: Compare<K>, A: NodeAllocator {

    fn next_back(&mut self) -> Option<(K, V)> {
        let (entry, next) = self.take::<Left>(self.back)?;
        self.back = next;
        Some(entry)
    }
}

impl<K, V, C, A> ExactSizeIterator for IntoIter<K, V, C, A> where C: Compare<K>, A: NodeAllocator {}

impl<K, V, C, A> FusedIterator for IntoIter<K, V, C, A> where C: Compare<K>, A: NodeAllocator {}

/// An iterator over the map's entries with immutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter`](struct.Map.html#method.iter) or the `IntoIterator` trait:
///
/// ```
/// let mut map = tree_map::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct Iter<'a, K: 'a, V: 'a> {
    iter: node::Iter<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

unsafe impl<'a, K, V> Send for Iter<'a, K, V> where K: Sync, V: Sync {}
unsafe impl<'a, K, V> Sync for Iter<'a, K, V> where K: Sync, V: Sync {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self { Iter { iter: self.iter.clone(), _marker: PhantomData } }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.iter.next().map(|node| unsafe { node::key_value(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.iter.next_back().map(|node| unsafe { node::key_value(node) })
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An iterator over the map's entries with mutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter_mut`](struct.Map.html#method.iter_mut) or the `IntoIterator`
/// trait:
///
/// ```
/// let mut map = tree_map::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &mut map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct IterMut<'a, K: 'a, V: 'a> {
    iter: node::Iter<K, V>,
    _marker: PhantomData<&'a mut Node<K, V>>,
}

unsafe impl<'a, K, V> Send for IterMut<'a, K, V> where K: Sync, V: Send {}
unsafe impl<'a, K, V> Sync for IterMut<'a, K, V> where K: Sync, V: Sync {}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        self.iter.next().map(|node| unsafe { node::key_value_mut(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        self.iter.next_back().map(|node| unsafe { node::key_value_mut(node) })
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// An iterator over the map's keys in ascending order.
///
/// Acquire through [`Map::keys`](struct.Map.html#method.keys).
pub struct Keys<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Self { Keys(self.0.clone()) }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<&'a K> { self.0.next().map(|e| e.0) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> { self.0.next_back().map(|e| e.0) }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}

/// An iterator over the map's values in ascending order of their keys.
///
/// Acquire through [`Map::values`](struct.Map.html#method.values).
pub struct Values<'a, K: 'a, V: 'a>(Iter<'a, K, V>);

impl<'a, K, V> Clone for Values<'a, K, V> {
    fn clone(&self) -> Self { Values(self.0.clone()) }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<&'a V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

impl<'a, K, V> FusedIterator for Values<'a, K, V> {}

/// An iterator over mutable references to the map's values in ascending order of their keys.
///
/// Acquire through [`Map::values_mut`](struct.Map.html#method.values_mut).
pub struct ValuesMut<'a, K: 'a, V: 'a>(IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<&'a mut V> { self.0.next().map(|e| e.1) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> { self.0.next_back().map(|e| e.1) }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for ValuesMut<'a, K, V> {}

/// An iterator over the map's entries whose keys lie in a given range with immutable references to
/// the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// Acquire through [`Map::range`](struct.Map.html#method.range).
pub struct Range<'a, K: 'a, V: 'a> {
    iter: node::Iter<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

unsafe impl<'a, K, V> Send for Range<'a, K, V> where K: Sync, V: Sync {}
unsafe impl<'a, K, V> Sync for Range<'a, K, V> where K: Sync, V: Sync {}

impl<'a, K, V> Clone for Range<'a, K, V> {
    fn clone(&self) -> Self { Range { iter: self.iter.clone(), _marker: PhantomData } }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.iter.next().map(|node| unsafe { node::key_value(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.range_size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.iter.next_back().map(|node| unsafe { node::key_value(node) })
    }
}

impl<'a, K, V> FusedIterator for Range<'a, K, V> {}

/// An iterator over the map's entries whose keys lie in a given range with mutable references to
/// the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// Acquire through [`Map::range_mut`](struct.Map.html#method.range_mut).
pub struct RangeMut<'a, K: 'a, V: 'a> {
    iter: node::Iter<K, V>,
    _marker: PhantomData<&'a mut Node<K, V>>,
}

unsafe impl<'a, K, V> Send for RangeMut<'a, K, V> where K: Sync, V: Send {}
unsafe impl<'a, K, V> Sync for RangeMut<'a, K, V> where K: Sync, V: Sync {}

impl<'a, K, V> Iterator for RangeMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        self.iter.next().map(|node| unsafe { node::key_value_mut(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.range_size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for RangeMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        self.iter.next_back().map(|node| unsafe { node::key_value_mut(node) })
    }
}

impl<'a, K, V> FusedIterator for RangeMut<'a, K, V> {}
