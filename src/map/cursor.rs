use compare::{Compare, Natural};
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use crate::alloc::{Global, NodeAllocator};
use crate::node::{self, Dir, Left, Link, Node, Right};
use super::Map;

/// A position in a map, over a shared borrow of it.
///
/// A cursor either rests on an entry or at the end of the map, a single ghost position that lies
/// both one past the last entry and one before the first. Moving forward from the last entry or
/// backward from the first reaches the end; moving from the end wraps around to the first (forward)
/// or last (backward) entry.
///
/// Cursors compare equal when they rest on the same entry or are both at the end.
///
/// # Examples
///
/// ```
/// let map: tree_map::Map<_, _> = vec![(5, 'e'), (3, 'c'), (8, 'h')].into_iter().collect();
///
/// let mut cursor = map.rbegin();
/// assert_eq!(cursor.key_value(), Some((&8, &'h')));
///
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&5));
///
/// cursor.move_next();
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert!(cursor == map.end());
///
/// cursor.move_next();
/// assert!(cursor == map.begin());
/// ```
pub struct Cursor<'a, K: 'a, V: 'a> {
    root: Link<K, V>,
    current: Link<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

unsafe impl<'a, K, V> Send for Cursor<'a, K, V> where K: Sync, V: Sync {}
unsafe impl<'a, K, V> Sync for Cursor<'a, K, V> where K: Sync, V: Sync {}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self { *self }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(super) fn new(root: Link<K, V>, current: Link<K, V>) -> Self {
        Cursor { root: root, current: current, _marker: PhantomData }
    }

    /// Checks if the cursor is at the end of the map.
    pub fn is_end(&self) -> bool { self.current.is_none() }

    /// Returns a reference to the key of the entry the cursor rests on, or `None` at the end.
    pub fn key(&self) -> Option<&'a K> { self.current.map(|node| unsafe { node::key(node) }) }

    /// Returns a reference to the value of the entry the cursor rests on, or `None` at the end.
    pub fn value(&self) -> Option<&'a V> {
        self.current.map(|node| unsafe { node::value(node) })
    }

    /// Returns references to the entry the cursor rests on, or `None` at the end.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|node| unsafe { node::key_value(node) })
    }

    /// Moves the cursor to the next entry in key order.
    pub fn move_next(&mut self) {
        self.current = match self.current {
            Some(node) => unsafe { Right::step(node) },
            None => Left::extremum(self.root),
        };
    }

    /// Moves the cursor to the previous entry in key order.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(node) => unsafe { Left::step(node) },
            None => Right::extremum(self.root),
        };
    }

    /// Returns references to the entry after the cursor's position without moving it.
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let mut next = *self;
        next.move_next();
        next.key_value()
    }

    /// Returns references to the entry before the cursor's position without moving it.
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let mut prev = *self;
        prev.move_prev();
        prev.key_value()
    }
}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool { self.current == other.current }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> Debug for Cursor<'a, K, V> where K: Debug, V: Debug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

/// A position in a map, over an exclusive borrow of it.
///
/// Moves like a [`Cursor`](struct.Cursor.html), and can also modify the value of the entry it
/// rests on or remove that entry from the map.
///
/// # Examples
///
/// ```
/// let mut map: tree_map::Map<_, _> = (1..6).map(|i| (i, i * 10)).collect();
///
/// let mut cursor = map.begin_mut();
///
/// while let Some(&key) = cursor.key() {
///     if key % 2 == 0 {
///         cursor.remove_current();
///     } else {
///         *cursor.value_mut().unwrap() += 1;
///         cursor.move_next();
///     }
/// }
///
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &11), (&3, &31), (&5, &51)]);
/// ```
pub struct CursorMut<'a, K: 'a, V: 'a, C: 'a = Natural<K>, A: 'a = Global>
    where C: Compare<K>, A: NodeAllocator {

    map: &'a mut Map<K, V, C, A>,
    current: Link<K, V>,
}

impl<'a, K, V, C, A> CursorMut<'a, K, V, C, A> where C: Compare<K>, A: NodeAllocator {
    pub(super) fn new(map: &'a mut Map<K, V, C, A>, current: Link<K, V>) -> Self {
        CursorMut { map: map, current: current }
    }

    /// Checks if the cursor is at the end of the map.
    pub fn is_end(&self) -> bool { self.current.is_none() }

    /// Returns a reference to the key of the entry the cursor rests on, or `None` at the end.
    pub fn key(&self) -> Option<&K> { self.current.map(|node| unsafe { node::key(node) }) }

    /// Returns a reference to the value of the entry the cursor rests on, or `None` at the end.
    pub fn value(&self) -> Option<&V> { self.current.map(|node| unsafe { node::value(node) }) }

    /// Returns a mutable reference to the value of the entry the cursor rests on, or `None` at
    /// the end.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|node| unsafe { node::value_mut(node) })
    }

    /// Returns references to the entry the cursor rests on, or `None` at the end.
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.current.map(|node| unsafe { node::key_value(node) })
    }

    /// Returns a reference to the key and a mutable reference to the value of the entry the
    /// cursor rests on, or `None` at the end.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.current.map(|node| unsafe { node::key_value_mut(node) })
    }

    /// Converts the cursor into a mutable reference to the value of the entry it rests on, with
    /// the same lifetime as the map, or `None` at the end.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.current.map(|node| unsafe { node::value_mut(node) })
    }

    /// Moves the cursor to the next entry in key order.
    pub fn move_next(&mut self) {
        self.current = match self.current {
            Some(node) => unsafe { Right::step(node) },
            None => Left::extremum(self.map.root),
        };
    }

    /// Moves the cursor to the previous entry in key order.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(node) => unsafe { Left::step(node) },
            None => Right::extremum(self.map.root),
        };
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> { Cursor::new(self.map.root, self.current) }

    /// Removes the entry the cursor rests on from the map and returns it, moving the cursor to
    /// the next entry in key order. Does nothing and returns `None` at the end.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let node = self.current?;
        let (key_value, next) = unsafe { self.map.unlink(node) };
        self.current = next;
        Some(key_value)
    }
}

impl<'a, K, V, C, A> Debug for CursorMut<'a, K, V, C, A>
    where K: Debug, V: Debug, C: Compare<K>, A: NodeAllocator {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.key_value()).finish()
    }
}
