//! The tree engine.
//!
//! Nodes are linked in both directions: `left` and `right` own their subtrees, while `parent` is a
//! plain back-reference used only for walking. Memory is only ever released by following child
//! links (or by unlinking a single node), never through `parent`.
//!
//! The tree is not rebalanced. Inserting keys in sorted order yields a chain, so every walk here is
//! iterative rather than recursive.

mod iter;


use compare::Compare;
use std::alloc::{handle_alloc_error, Layout};
use std::cmp::Ordering::*;
use std::mem::replace;
use std::ops::Bound;
use std::ptr::NonNull;
use crate::alloc::{AllocError, NodeAllocator};

pub use self::iter::Iter;

pub type Link<K, V> = Option<NonNull<Node<K, V>>>;

pub struct Node<K, V> {
    left: Link<K, V>,
    right: Link<K, V>,
    parent: Link<K, V>,
    key: K,
    value: V,
}

impl<K, V> Node<K, V> {
    fn layout() -> Layout { Layout::new::<Self>() }

    /// Allocates a childless node holding the given entry below `parent`.
    ///
    /// Nothing is linked to the new node yet; on failure no memory is held.
    pub fn create<A>(alloc: &A, parent: Link<K, V>, key: K, value: V)
        -> Result<NonNull<Self>, AllocError> where A: NodeAllocator {

        let ptr = match alloc.allocate(Self::layout()) {
            Ok(ptr) => ptr.cast::<Self>(),
            Err(e) => {
                tracing::warn!(size = Self::layout().size(), "tree node allocation failed");
                return Err(e);
            }
        };

        unsafe {
            ptr.as_ptr()
                .write(Node { left: None, right: None, parent: parent, key: key, value: value });
        }

        Ok(ptr)
    }

    /// Moves the entry out of an unlinked node and releases the node's memory.
    ///
    /// # Safety
    ///
    /// `node` must have been created by `create` on `alloc` and must no longer be reachable from
    /// any tree.
    pub unsafe fn destroy<A>(alloc: &A, node: NonNull<Self>) -> (K, V) where A: NodeAllocator {
        let Node { key, value, .. } = node.as_ptr().read();
        alloc.deallocate(node.cast(), Self::layout());
        (key, value)
    }
}

/// Reports a failed node allocation on an infallible code path.
pub fn oom<K, V>(_: AllocError) -> ! {
    handle_alloc_error(Node::<K, V>::layout())
}

// The accessors below hand out references with a caller-chosen lifetime. Callers tie it to a
// borrow of the map that owns `node`.

pub unsafe fn key<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a K { &(*node.as_ptr()).key }

pub unsafe fn value<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a V { &(*node.as_ptr()).value }

pub unsafe fn value_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a mut V {
    &mut (*node.as_ptr()).value
}

pub unsafe fn key_value<'a, K, V>(node: NonNull<Node<K, V>>) -> (&'a K, &'a V) {
    let node = node.as_ptr();
    (&(*node).key, &(*node).value)
}

pub unsafe fn key_value_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> (&'a K, &'a mut V) {
    let node = node.as_ptr();
    (&(*node).key, &mut (*node).value)
}

/// A direction of travel through the tree.
///
/// `Left` walks towards smaller keys and `Right` towards larger ones; every walk is written once
/// and instantiated for both.
pub trait Dir: Sized {
    type Opposite: Dir<Opposite = Self>;

    /// The child of `node` in this direction.
    unsafe fn forward<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V>;

    unsafe fn forward_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a mut Link<K, V>;

    /// Follows links in this direction from `link` until none remain.
    ///
    /// `Left::extremum` finds the smallest entry of a subtree, `Right::extremum` the largest.
    fn extremum<K, V>(mut link: Link<K, V>) -> Link<K, V> {
        while let Some(node) = link {
            match unsafe { Self::forward(node) } {
                None => break,
                child => link = child,
            }
        }

        link
    }

    /// Returns the neighbor of `node` in this direction in key order, or `None` if `node` is the
    /// extremum of the whole tree.
    ///
    /// `Right::step` is the in-order successor and `Left::step` the in-order predecessor.
    unsafe fn step<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V> {
        if let Some(child) = Self::forward(node) {
            return Self::Opposite::extremum(Some(child));
        }

        let mut node = node;

        while let Some(parent) = (*node.as_ptr()).parent {
            if Self::forward(parent) != Some(node) { return Some(parent); }
            node = parent;
        }

        None
    }
}

#[allow(unused)]
pub enum Left {}

impl Dir for Left {
    type Opposite = Right;

    unsafe fn forward<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V> { (*node.as_ptr()).left }

    unsafe fn forward_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a mut Link<K, V> {
        &mut (*node.as_ptr()).left
    }
}

#[allow(unused)]
pub enum Right {}

impl Dir for Right {
    type Opposite = Left;

    unsafe fn forward<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V> { (*node.as_ptr()).right }

    unsafe fn forward_mut<'a, K, V>(node: NonNull<Node<K, V>>) -> &'a mut Link<K, V> {
        &mut (*node.as_ptr()).right
    }
}

/// Which child slot of a parent a vacant position occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    unsafe fn slot<'a, K, V>(self, node: NonNull<Node<K, V>>) -> &'a mut Link<K, V> {
        match self {
            Side::Left => Left::forward_mut(node),
            Side::Right => Right::forward_mut(node),
        }
    }
}

/// The outcome of descending the tree towards a key.
pub enum Search<K, V> {
    /// A node holds an equal key.
    Found(NonNull<Node<K, V>>),
    /// No node holds an equal key; one would be attached below `parent` (or become the root, if
    /// `parent` is `None`) on the given side.
    Vacant(Link<K, V>, Side),
}

pub fn search<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, key: &Q) -> Search<K, V>
    where C: Compare<Q, K> {

    let mut parent = None;
    let mut side = Side::Left;
    let mut link = root;

    while let Some(node) = link {
        parent = link;

        match cmp.compare(key, unsafe { self::key(node) }) {
            Equal => return Search::Found(node),
            Less => { side = Side::Left; link = unsafe { Left::forward(node) }; }
            Greater => { side = Side::Right; link = unsafe { Right::forward(node) }; }
        }
    }

    Search::Vacant(parent, side)
}

pub fn find<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, key: &Q) -> Link<K, V>
    where C: Compare<Q, K> {

    match search(root, cmp, key) {
        Search::Found(node) => Some(node),
        Search::Vacant(..) => None,
    }
}

/// Creates a node for the given entry in a vacant position found by `search`.
///
/// The tree is untouched if allocation fails.
pub fn attach<K, V, A>(root: &mut Link<K, V>, alloc: &A, parent: Link<K, V>, side: Side, key: K,
                       value: V) -> Result<NonNull<Node<K, V>>, AllocError>
    where A: NodeAllocator {

    let node = Node::create(alloc, parent, key, value)?;

    let slot = match parent {
        None => root,
        Some(parent) => unsafe { side.slot(parent) },
    };

    debug_assert!(slot.is_none());
    *slot = Some(node);
    Ok(node)
}

/// Inserts an entry unless an equal key is already present.
///
/// Returns the node holding the key and whether it was created by this call. An existing entry is
/// left untouched and the given key and value are dropped.
pub fn insert<K, V, C, A>(root: &mut Link<K, V>, cmp: &C, alloc: &A, key: K, value: V)
    -> Result<(NonNull<Node<K, V>>, bool), AllocError> where C: Compare<K>, A: NodeAllocator {

    match search(*root, cmp, &key) {
        Search::Found(node) => Ok((node, false)),
        Search::Vacant(parent, side) =>
            attach(root, alloc, parent, side, key, value).map(|node| (node, true)),
    }
}

/// Puts `new` in the place `old` occupies under its parent (or at the root).
///
/// `old` keeps its own links; the caller is responsible for it afterwards.
unsafe fn replace_child<K, V>(root: &mut Link<K, V>, old: NonNull<Node<K, V>>, new: Link<K, V>) {
    let parent = (*old.as_ptr()).parent;

    match parent {
        None => *root = new,
        Some(parent) =>
            if Left::forward(parent) == Some(old) {
                *Left::forward_mut(parent) = new;
            } else {
                *Right::forward_mut(parent) = new;
            },
    }

    if let Some(new) = new { (*new.as_ptr()).parent = parent; }
}

/// Removes the entry held by `node` from the tree and returns it.
///
/// - A node with at most one child is unlinked, its child (if any) taking its place, and freed.
/// - A node with two children stays where it is: the entry of its in-order successor (the smallest
///   key of its right subtree, which has no left child) is moved into it, and the successor's node
///   is unlinked and freed instead.
///
/// Also returns the node that holds the in-order successor of the removed entry afterwards, or
/// `None` if the removed entry was the largest.
///
/// # Safety
///
/// `node` must belong to the tree rooted at `root`, whose nodes were created on `alloc`.
pub unsafe fn remove<K, V, A>(root: &mut Link<K, V>, alloc: &A, node: NonNull<Node<K, V>>)
    -> ((K, V), Link<K, V>) where A: NodeAllocator {

    let raw = node.as_ptr();

    match ((*raw).left, (*raw).right) {
        (Some(_), Some(right)) => {
            let mut succ = right;
            while let Some(left) = (*succ.as_ptr()).left { succ = left; }

            replace_child(root, succ, (*succ.as_ptr()).right);
            let (key, value) = Node::destroy(alloc, succ);
            let key_value = (replace(&mut (*raw).key, key), replace(&mut (*raw).value, value));
            (key_value, Some(node))
        }
        (left, right) => {
            let next = Right::step(node);
            replace_child(root, node, left.or(right));
            (Node::destroy(alloc, node), next)
        }
    }
}

/// Frees every node of the tree, leaving it empty, and returns how many there were.
///
/// Runs in linear time and constant space by descending through child links and climbing back
/// through parent links.
///
/// # Safety
///
/// Every node of the tree rooted at `root` must have been created on `alloc`.
pub unsafe fn clear<K, V, A>(root: &mut Link<K, V>, alloc: &A) -> usize where A: NodeAllocator {
    let mut count = 0;
    let mut link = root.take();

    while let Some(node) = link {
        let raw = node.as_ptr();

        link = if let Some(left) = (*raw).left.take() {
            Some(left)
        } else if let Some(right) = (*raw).right.take() {
            Some(right)
        } else {
            let parent = (*raw).parent;
            drop(Node::destroy(alloc, node));
            count += 1;
            parent
        };
    }

    count
}

/// Builds a copy of the tree rooted at `root` with the same shape, allocating its nodes on
/// `alloc`.
///
/// The source and the copy are walked in step: descend into a child of the source once its
/// counterpart exists in the copy, and climb both through parent links when a node is done. On
/// allocation failure every node copied so far is freed.
///
/// # Safety
///
/// `root` must be the root of a well-formed tree.
pub unsafe fn copy<K, V, A>(root: Link<K, V>, alloc: &A) -> Result<Link<K, V>, AllocError>
    where K: Clone, V: Clone, A: NodeAllocator {

    let mut copy = None;
    let mut parent = None;
    let mut side = Side::Left;
    let mut src = match root {
        None => return Ok(None),
        Some(root) => root,
    };

    loop {
        let (key, value) = key_value(src);

        let dst = match attach(&mut copy, alloc, parent, side, key.clone(), value.clone()) {
            Ok(dst) => dst,
            Err(e) => {
                clear(&mut copy, alloc);
                return Err(e);
            }
        };

        let (mut src_at, mut dst_at) = (src, dst);

        // Find the next source child without a counterpart, climbing as needed.
        loop {
            if let (Some(child), None) = (Left::forward(src_at), Left::forward(dst_at)) {
                side = Side::Left;
                src = child;
                break;
            }

            if let (Some(child), None) = (Right::forward(src_at), Right::forward(dst_at)) {
                side = Side::Right;
                src = child;
                break;
            }

            match ((*src_at.as_ptr()).parent, (*dst_at.as_ptr()).parent) {
                (Some(src_up), Some(dst_up)) => { src_at = src_up; dst_at = dst_up; }
                _ => return Ok(copy),
            }
        }

        parent = Some(dst_at);
    }
}

/// Returns the first node whose key is not less than `key`.
pub fn lower_bound<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, key: &Q) -> Link<K, V>
    where C: Compare<Q, K> {

    let mut bound = None;
    let mut link = root;

    while let Some(node) = link {
        link = if cmp.compares_gt(key, unsafe { self::key(node) }) {
            unsafe { Right::forward(node) }
        } else {
            bound = link;
            unsafe { Left::forward(node) }
        };
    }

    bound
}

/// Returns the first node whose key is greater than `key`.
pub fn upper_bound<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, key: &Q) -> Link<K, V>
    where C: Compare<Q, K> {

    let mut bound = None;
    let mut link = root;

    while let Some(node) = link {
        link = if cmp.compares_lt(key, unsafe { self::key(node) }) {
            bound = link;
            unsafe { Left::forward(node) }
        } else {
            unsafe { Right::forward(node) }
        };
    }

    bound
}

/// Returns the first node inside the lower bound `min`.
pub fn start<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, min: Bound<&Q>) -> Link<K, V>
    where C: Compare<Q, K> {

    match min {
        Bound::Unbounded => Left::extremum(root),
        Bound::Included(key) => lower_bound(root, cmp, key),
        Bound::Excluded(key) => upper_bound(root, cmp, key),
    }
}

/// Returns the first node past the upper bound `max`, or `None` if no node is.
pub fn stop<K, V, C, Q: ?Sized>(root: Link<K, V>, cmp: &C, max: Bound<&Q>) -> Link<K, V>
    where C: Compare<Q, K> {

    match max {
        Bound::Unbounded => None,
        Bound::Included(key) => upper_bound(root, cmp, key),
        Bound::Excluded(key) => lower_bound(root, cmp, key),
    }
}
