use fnv::FnvBuildHasher;
use std::{
    collections::{HashMap, HashSet},
    hash::Hash
};

pub type FnvHashSet<T> = HashSet<T, FnvBuildHasher>;
pub type FnvHashMap<K, V> = HashMap<K, V, FnvBuildHasher>;

/// Hash map keyed with FNV, which beats the default SipHash on the small integer and position
/// keys used throughout the graph.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    FnvHashMap::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
}
