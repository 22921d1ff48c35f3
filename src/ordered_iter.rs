use ::ordered_iter::OrderedMapIterator;
use compare::Compare;
use crate::alloc::NodeAllocator;
use crate::map;

impl<K, V, C, A> OrderedMapIterator for map::IntoIter<K, V, C, A>
    where K: Ord, C: Compare<K>, A: NodeAllocator {

    type Key = K;
    type Val = V;
}

impl<'a, K, V> OrderedMapIterator for map::Iter<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a V;
}

impl<'a, K, V> OrderedMapIterator for map::IterMut<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a mut V;
}

impl<'a, K, V> OrderedMapIterator for map::Range<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a V;
}

impl<'a, K, V> OrderedMapIterator for map::RangeMut<'a, K, V> where K: Ord {
    type Key = &'a K;
    type Val = &'a mut V;
}
