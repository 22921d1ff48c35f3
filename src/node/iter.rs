use compare::Compare;
use std::ops::Bound;
use std::ptr::NonNull;
use super::{Dir, Left, Link, Node, Right};

/// A double-ended walk over the nodes between `front` and `back`, both inclusive, in key order.
///
/// Each step follows the successor/predecessor links of the tree, so the walk needs no auxiliary
/// storage. `size` is the number of nodes left for full walks and an upper bound for ranges.
pub struct Iter<K, V> {
    front: Link<K, V>,
    back: Link<K, V>,
    size: usize,
}

impl<K, V> Clone for Iter<K, V> {
    fn clone(&self) -> Self { Iter { front: self.front, back: self.back, size: self.size } }
}

impl<K, V> Iter<K, V> {
    pub fn new(root: Link<K, V>, size: usize) -> Self {
        Iter { front: Left::extremum(root), back: Right::extremum(root), size: size }
    }

    pub fn range<C, Min: ?Sized, Max: ?Sized>(root: Link<K, V>, size: usize, cmp: &C,
                                              min: Bound<&Min>, max: Bound<&Max>) -> Self
        where C: Compare<K> + Compare<Min, K> + Compare<Max, K> {

        let front = super::start(root, cmp, min);
        let back = match super::stop(root, cmp, max) {
            Some(node) => unsafe { Left::step(node) },
            None => Right::extremum(root),
        };

        match (front, back) {
            (Some(f), Some(b))
                if <C as Compare<K>>::compares_le(cmp, unsafe { super::key(f) },
                                                  unsafe { super::key(b) }) =>
                Iter { front: front, back: back, size: size },
            _ => Iter { front: None, back: None, size: 0 },
        }
    }

    pub fn range_size_hint(&self) -> (usize, Option<usize>) {
        (if self.front.is_some() { 1 } else { 0 }, Some(self.size))
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<K, V> Iterator for Iter<K, V> {
    type Item = NonNull<Node<K, V>>;

    fn next(&mut self) -> Option<NonNull<Node<K, V>>> {
        let node = self.front?;

        if self.front == self.back {
            self.finish();
        } else {
            self.front = unsafe { Right::step(node) };
        }

        self.size = self.size.saturating_sub(1);
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<K, V> DoubleEndedIterator for Iter<K, V> {
    fn next_back(&mut self) -> Option<NonNull<Node<K, V>>> {
        let node = self.back?;

        if self.front == self.back {
            self.finish();
        } else {
            self.back = unsafe { Left::step(node) };
        }

        self.size = self.size.saturating_sub(1);
        Some(node)
    }
}
