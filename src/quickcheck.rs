use ::quickcheck::{Arbitrary, Gen};
use compare::Compare;
use crate::alloc::NodeAllocator;
use crate::map::Map;

impl<K, V, C, A> Arbitrary for Map<K, V, C, A>
    where K: Arbitrary, V: Arbitrary, C: 'static + Clone + Compare<K> + Default + Send,
          A: 'static + Clone + NodeAllocator + Default + Send {

    fn arbitrary(gen: &mut Gen) -> Self {
        Vec::<(K, V)>::arbitrary(gen).into_iter().collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let vec: Vec<(K, V)> = self.clone().into_iter().collect();
        Box::new(vec.shrink().map(|vec| vec.into_iter().collect()))
    }
}
