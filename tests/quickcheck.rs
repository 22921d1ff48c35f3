use compare::Compare;
use quickcheck::{Arbitrary, Gen};
use tree_map::map::{self, Map};

/// A way of removing an entry from a map.
pub trait Remove<K, C> where C: Compare<K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)>;
}

macro_rules! remove {
    ($K:ty, $V:ty, $R:ty) => {
        mod remove {
            use crate::Remove;
            use quickcheck::{quickcheck, TestResult};
            use tree_map::Map;

            #[test]
            fn removes_key() {
                fn test(mut map: Map<$K, $V>, removal: $R) -> TestResult {
                    match removal.remove(&mut map) {
                        None => TestResult::discard(),
                        Some((ref key, _)) => TestResult::from_bool(
                            !map.contains_key(key) &&
                            map.get(key).is_none() &&
                            map.find(key).is_end() &&
                            map.iter().find(|e| e.0 == key).is_none()
                        ),
                    }
                }

                quickcheck(test as fn(Map<$K, $V>, $R) -> TestResult);
            }

            #[test]
            fn affects_no_others() {
                fn test(mut map: Map<$K, $V>, removal: $R) -> bool {
                    let old_map = map.clone();

                    match removal.remove(&mut map) {
                        None => map == old_map,
                        Some((ref key, _)) =>
                            map.iter().collect::<Vec<_>>() ==
                                old_map.iter().filter(|e| e.0 != key).collect::<Vec<_>>(),
                    }
                }

                quickcheck(test as fn(Map<$K, $V>, $R) -> bool);
            }

            #[test]
            fn sets_len() {
                fn test(mut map: Map<$K, $V>, removal: $R) -> bool {
                    let old_len = map.len();

                    match removal.remove(&mut map) {
                        None => map.len() == old_len,
                        Some(_) => map.len() == old_len - 1,
                    }
                }

                quickcheck(test as fn(Map<$K, $V>, $R) -> bool);
            }
        }
    }
}

/// A way of inserting an entry into a map.
pub trait Insert<K> {
    fn key(&self) -> K;

    /// Returns whether the entry was inserted.
    fn insert<V, C>(self, map: &mut Map<K, V, C>, value: V) -> bool where C: Compare<K>;
}

macro_rules! insert {
    ($K:ty, $V:ty, $R:ty) => {
        mod insert {
            use crate::Insert;
            use quickcheck::quickcheck;
            use tree_map::Map;

            #[test]
            fn sets_len() {
                fn test(mut map: Map<$K, $V>, r: $R, value: $V) -> bool {
                    let old_len = map.len();

                    if r.insert(&mut map, value) {
                        map.len() == old_len + 1
                    } else {
                        map.len() == old_len
                    }
                }

                quickcheck(test as fn(Map<$K, $V>, $R, $V) -> bool);
            }

            #[test]
            fn keeps_existing_value() {
                fn test(mut map: Map<$K, $V>, r: $R, value: $V) -> bool {
                    let key = r.key();
                    let old_value = map.get(&key).cloned();
                    let inserted = r.insert(&mut map, value);

                    match old_value {
                        Some(ref old) => !inserted && map.get(&key) == Some(old),
                        None => inserted && map.get(&key) == Some(&value),
                    }
                }

                quickcheck(test as fn(Map<$K, $V>, $R, $V) -> bool);
            }

            #[test]
            fn inserts_key_once() {
                fn test(mut map: Map<$K, $V>, r: $R, value: $V) -> bool {
                    let key = r.key();
                    r.insert(&mut map, value);

                    map.contains_key(&key) &&
                    map.count(&key) == 1 &&
                    map.iter().filter(|e| *e.0 == key).count() == 1
                }

                quickcheck(test as fn(Map<$K, $V>, $R, $V) -> bool);
            }

            #[test]
            fn affects_no_others() {
                fn test(mut map: Map<$K, $V>, r: $R, value: $V) -> bool {
                    let old_map = map.clone();
                    let key = r.key();
                    r.insert(&mut map, value);

                    map.iter().filter(|e| *e.0 != key).collect::<Vec<_>>() ==
                        old_map.iter().filter(|e| *e.0 != key).collect::<Vec<_>>()
                }

                quickcheck(test as fn(Map<$K, $V>, $R, $V) -> bool);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Find<Q>(Q);

impl<Q> Arbitrary for Find<Q> where Q: Arbitrary {
    fn arbitrary(gen: &mut Gen) -> Self { Find(Q::arbitrary(gen)) }
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> { Box::new(self.0.shrink().map(Find)) }
}

impl<Q, K, C> Remove<K, C> for Find<Q> where C: Compare<K> + Compare<Q, K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)> { map.remove(&self.0) }
}

impl<K> Insert<K> for Find<K> where K: Clone {
    fn key(&self) -> K { self.0.clone() }

    fn insert<V, C>(self, map: &mut Map<K, V, C>, value: V) -> bool where C: Compare<K> {
        map.insert(self.0, value).1
    }
}

#[derive(Clone, Debug)]
pub struct FindEntry<K>(K);

impl<K> Arbitrary for FindEntry<K> where K: Arbitrary {
    fn arbitrary(gen: &mut Gen) -> Self { FindEntry(K::arbitrary(gen)) }
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> { Box::new(self.0.shrink().map(FindEntry)) }
}

impl<K, C> Remove<K, C> for FindEntry<K> where K: Clone, C: Compare<K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)> {
        match map.entry(self.0.clone()) {
            map::Entry::Occupied(e) => Some(e.remove()),
            map::Entry::Vacant(_) => None,
        }
    }
}

impl<K> Insert<K> for FindEntry<K> where K: Clone {
    fn key(&self) -> K { self.0.clone() }

    fn insert<V, C>(self, map: &mut Map<K, V, C>, value: V) -> bool where C: Compare<K> {
        match map.entry(self.0) {
            map::Entry::Occupied(_) => false,
            map::Entry::Vacant(e) => { e.insert(value); true }
        }
    }
}

#[derive(Clone, Debug)]
pub struct FindCursor<Q>(Q);

impl<Q> Arbitrary for FindCursor<Q> where Q: Arbitrary {
    fn arbitrary(gen: &mut Gen) -> Self { FindCursor(Q::arbitrary(gen)) }
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> { Box::new(self.0.shrink().map(FindCursor)) }
}

impl<Q, K, C> Remove<K, C> for FindCursor<Q> where C: Compare<K> + Compare<Q, K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)> {
        map.find_mut(&self.0).remove_current()
    }
}

mod find {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn agrees_with_get() {
        fn test(map: Map<u32, u16>, key: u32) -> bool {
            map.find(&key).value() == map.get(&key) &&
            map.find(&key).is_end() != map.contains_key(&key)
        }

        quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
    }

    mod entry {
        use quickcheck::quickcheck;
        use tree_map::map::{Entry, Map};

        #[test]
        fn agrees_with_get() {
            fn test(mut map: Map<u32, u16>, key: u32) -> bool {
                let value = map.get(&key).cloned();

                match map.entry(key) {
                    Entry::Occupied(e) => value == Some(*e.get()),
                    Entry::Vacant(_) => value.is_none(),
                }
            }

            quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
        }

        insert!{u32, u16, crate::FindEntry<u32>}
        remove!{u32, u16, crate::FindEntry<u32>}
    }

    mod cursor {
        remove!{u32, u16, crate::FindCursor<u32>}
    }

    insert!{u32, u16, crate::Find<u32>}
    remove!{u32, u16, crate::Find<u32>}
}

#[derive(Clone, Debug)]
struct Max;

impl Arbitrary for Max { fn arbitrary(_gen: &mut Gen) -> Self { Max } }

impl<K, C> Remove<K, C> for Max where C: Compare<K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)> { map.pop_last() }
}

mod last {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn agrees_with_iter() {
        fn test(map: Map<u32, u16>) -> bool {
            map.last() == map.iter().rev().next() && map.last() == map.rbegin().key_value()
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    remove!{u32, u16, crate::Max}
}

#[derive(Clone, Debug)]
struct Min;

impl Arbitrary for Min { fn arbitrary(_gen: &mut Gen) -> Self { Min } }

impl<K, C> Remove<K, C> for Min where C: Compare<K> {
    fn remove<V>(&self, map: &mut Map<K, V, C>) -> Option<(K, V)> { map.pop_first() }
}

mod first {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn agrees_with_iter() {
        fn test(map: Map<u32, u16>) -> bool {
            map.first() == map.iter().next() && map.first() == map.begin().key_value()
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    remove!{u32, u16, crate::Min}
}

mod bounds {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn lower_bound_agrees_with_iter() {
        fn test(map: Map<u32, u16>, key: u32) -> bool {
            map.lower_bound(&key).key_value() == map.iter().find(|e| *e.0 >= key)
        }

        quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
    }

    #[test]
    fn upper_bound_agrees_with_iter() {
        fn test(map: Map<u32, u16>, key: u32) -> bool {
            map.upper_bound(&key).key_value() == map.iter().find(|e| *e.0 > key)
        }

        quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
    }

    #[test]
    fn equal_range_is_empty_iff_absent() {
        fn test(map: Map<u32, u16>, key: u32) -> bool {
            let (lower, mut upper) = map.equal_range(&key);

            if map.contains_key(&key) {
                upper.move_prev();
                lower.key() == Some(&key) && upper == lower
            } else {
                lower == upper
            }
        }

        quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
    }
}

mod iter {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn ascends() {
        fn test(map: Map<u32, u16>) -> bool {
            map.iter().zip(map.iter().skip(1)).all(|(e1, e2)| e1.0 < e2.0)
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    #[test]
    fn descends_when_reversed() {
        fn test(map: Map<u32, u16>) -> bool {
            map.iter().rev().zip(map.iter().rev().skip(1)).all(|(e2, e1)| e2.0 > e1.0)
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    #[test]
    fn size_hint_is_exact() {
        fn test(map: Map<u32, u16>) -> bool {
            let mut len = map.len();
            let mut it = map.iter();

            loop {
                if it.size_hint() != (len, Some(len)) { return false; }
                if it.next().is_none() { break; }
                len -= 1;
            }

            len == 0 && it.size_hint() == (0, Some(0))
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    #[test]
    fn meets_in_the_middle() {
        fn test(map: Map<u32, u16>, fronts: Vec<bool>) -> bool {
            let mut it = map.iter();
            let mut seen = vec![];

            for front in fronts.into_iter().chain(::std::iter::repeat(true)) {
                let e = if front { it.next() } else { it.next_back() };

                match e {
                    Some(e) => seen.push(e),
                    None => break,
                }
            }

            seen.sort();
            seen == map.iter().collect::<Vec<_>>()
        }

        quickcheck(test as fn(Map<u32, u16>, Vec<bool>) -> bool);
    }
}

mod cursor {
    use quickcheck::quickcheck;
    use tree_map::Map;

    #[test]
    fn walks_like_iter() {
        fn test(map: Map<u32, u16>) -> bool {
            let mut forward = vec![];
            let mut cursor = map.begin();

            while let Some(e) = cursor.key_value() {
                forward.push(e);
                cursor.move_next();
            }

            let mut backward = vec![];
            let mut cursor = map.rbegin();

            while let Some(e) = cursor.key_value() {
                backward.push(e);
                cursor.move_prev();
            }

            forward == map.iter().collect::<Vec<_>>() &&
            backward == map.iter().rev().collect::<Vec<_>>()
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    #[test]
    fn steps_are_symmetric() {
        fn test(map: Map<u32, u16>) -> bool {
            let mut cursor = map.end();

            for _ in 0..map.len() + 1 {
                let mut there_and_back = cursor;
                there_and_back.move_next();
                there_and_back.move_prev();

                let mut back_and_there = cursor;
                back_and_there.move_prev();
                back_and_there.move_next();

                if there_and_back != cursor || back_and_there != cursor { return false; }
                cursor.move_next();
            }

            cursor == map.end()
        }

        quickcheck(test as fn(Map<u32, u16>) -> bool);
    }

    #[test]
    fn remove_current_rests_on_successor() {
        fn test(mut map: Map<u32, u16>, key: u32) -> bool {
            let succ = map.upper_bound(&key).key().cloned();
            let mut cursor = map.find_mut(&key);

            match cursor.remove_current() {
                None => cursor.is_end(),
                Some(_) => cursor.key().cloned() == succ,
            }
        }

        quickcheck(test as fn(Map<u32, u16>, u32) -> bool);
    }
}

mod range {
    use quickcheck::{quickcheck, Arbitrary, Gen};
    use std::ops::Bound::{self, Excluded, Included, Unbounded};
    use tree_map::Map;

    #[derive(Clone, Debug)]
    struct Limit<T>(Bound<T>);

    impl<T> Arbitrary for Limit<T> where T: Arbitrary {
        fn arbitrary(gen: &mut Gen) -> Self {
            Limit(match u8::arbitrary(gen) % 3 {
                0 => Included(T::arbitrary(gen)),
                1 => Excluded(T::arbitrary(gen)),
                _ => Unbounded,
            })
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            match self.0 {
                Included(ref t) => Box::new(t.shrink().map(|t| Limit(Included(t)))),
                Excluded(ref t) => Box::new(t.shrink().map(|t| Limit(Excluded(t)))),
                Unbounded => Box::new(None.into_iter()),
            }
        }
    }

    fn contains(min: &Limit<u32>, max: &Limit<u32>, key: u32) -> bool {
        (match min.0 {
            Included(t) => key >= t,
            Excluded(t) => key > t,
            Unbounded => true,
        }) && (match max.0 {
            Included(t) => key <= t,
            Excluded(t) => key < t,
            Unbounded => true,
        })
    }

    #[test]
    fn range() {
        fn test(map: Map<u32, u16>, min: Limit<u32>, max: Limit<u32>) -> bool {
            let r = map.range(min.0.as_ref(), max.0.as_ref());
            let i = map.iter().filter(|e| contains(&min, &max, *e.0));
            r.collect::<Vec<_>>() == i.collect::<Vec<_>>()
        }

        quickcheck(test as fn(Map<u32, u16>, Limit<u32>, Limit<u32>) -> bool);
    }

    #[test]
    fn range_rev() {
        fn test(map: Map<u32, u16>, min: Limit<u32>, max: Limit<u32>) -> bool {
            let r = map.range(min.0.as_ref(), max.0.as_ref()).rev();
            let i = map.iter().rev().filter(|e| contains(&min, &max, *e.0));
            r.collect::<Vec<_>>() == i.collect::<Vec<_>>()
        }

        quickcheck(test as fn(Map<u32, u16>, Limit<u32>, Limit<u32>) -> bool);
    }

    #[test]
    fn erase_range() {
        fn test(mut map: Map<u32, u16>, min: Limit<u32>, max: Limit<u32>) -> bool {
            let kept: Vec<_> = map.iter().filter(|e| !contains(&min, &max, *e.0))
                .map(|(&k, &v)| (k, v)).collect();
            let old_len = map.len();

            let count = map.erase_range(min.0.as_ref(), max.0.as_ref());

            count == old_len - kept.len() &&
            map.len() == kept.len() &&
            map.into_iter().collect::<Vec<_>>() == kept
        }

        quickcheck(test as fn(Map<u32, u16>, Limit<u32>, Limit<u32>) -> bool);
    }
}

mod model {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use std::collections::BTreeMap;
    use tree_map::Map;

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u8, u16),
        Erase(u8),
        PopFirst,
        PopLast,
    }

    impl Arbitrary for Op {
        fn arbitrary(gen: &mut Gen) -> Self {
            match u8::arbitrary(gen) % 6 {
                0 | 1 | 2 => Op::Insert(u8::arbitrary(gen), u16::arbitrary(gen)),
                3 => Op::Erase(u8::arbitrary(gen)),
                4 => Op::PopFirst,
                _ => Op::PopLast,
            }
        }
    }

    #[quickcheck]
    fn agrees_with_btree_map(ops: Vec<Op>) -> bool {
        let mut map = Map::new();
        let mut model = BTreeMap::new();

        for op in ops {
            let agrees = match op {
                Op::Insert(k, v) => {
                    let absent = !model.contains_key(&k);
                    model.entry(k).or_insert(v);
                    map.insert(k, v).1 == absent
                }
                Op::Erase(k) => {
                    let expected = if model.remove(&k).is_some() { 1 } else { 0 };
                    map.erase(&k) == expected
                }
                Op::PopFirst => map.pop_first() == model.pop_first(),
                Op::PopLast => map.pop_last() == model.pop_last(),
            };

            if !agrees || map.len() != model.len() { return false; }
        }

        map.iter().eq(model.iter())
    }

    #[quickcheck]
    fn erases_to_empty(keys: Vec<u32>, picks: Vec<usize>) -> bool {
        let mut map: Map<u32, ()> = keys.iter().map(|&k| (k, ())).collect();
        let mut keys: Vec<u32> = map.keys().cloned().collect();
        let mut picks = picks.into_iter();

        while !keys.is_empty() {
            let index = picks.next().unwrap_or(0) % keys.len();
            if map.erase(&keys.swap_remove(index)) != 1 { return false; }
        }

        map.is_empty() && map.len() == 0 && map.begin() == map.end()
    }

    #[quickcheck]
    fn into_iter_agrees_with_btree_map(map: Map<u8, u16>, fronts: Vec<bool>) -> bool {
        let model: BTreeMap<u8, u16> = map.iter().map(|(&k, &v)| (k, v)).collect();
        let mut it = map.into_iter();
        let mut expected = model.into_iter();

        for front in fronts {
            let (l, r) = if front {
                (it.next(), expected.next())
            } else {
                (it.next_back(), expected.next_back())
            };

            if l != r || it.len() != expected.len() { return false; }
        }

        it.eq(expected)
    }

    #[quickcheck]
    fn clone_is_equal(map: Map<u32, u16>) -> bool {
        map.clone() == map
    }

    #[quickcheck]
    fn orders_like_entries(l: Map<u8, u8>, r: Map<u8, u8>) -> bool {
        l.cmp(&r) == l.iter().cmp(r.iter()) && (l == r) == l.iter().eq(r.iter())
    }
}
