use crate::core::SmallKeyHashMap;
use crate::key::TileKey;
use crate::quantize::MeshArtifact;

#[derive(Clone, Debug)]
struct CacheEntry {
    artifact: MeshArtifact,
    last_access: u64,
}

/// A bounded map of finished tiles that evicts the least recently used entries.
///
/// Recency is a logical clock that ticks on every `get` hit and `put`, so ties are impossible.
#[derive(Debug)]
pub struct TileCache {
    capacity: usize,
    clock: u64,
    entries: SmallKeyHashMap<TileKey, CacheEntry>,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            clock: 0,
            entries: SmallKeyHashMap::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: TileKey) -> bool {
        self.entries.contains_key(&key)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// A copy of the cached artifact for `key`, marking it as most recently used.
    pub fn get(&mut self, key: TileKey) -> Option<MeshArtifact> {
        let now = self.tick();
        let entry = self.entries.get_mut(&key)?;
        entry.last_access = now;
        Some(entry.artifact.clone())
    }

    /// Inserts or overwrites the artifact for `key`, then evicts down to capacity.
    pub fn put(&mut self, key: TileKey, artifact: MeshArtifact) {
        let last_access = self.tick();
        self.entries.insert(
            key,
            CacheEntry {
                artifact,
                last_access,
            },
        );
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(&key, _)| key);
            match oldest {
                Some(key) => {
                    log::trace!("Evicting {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampling::HeightGrid;

    use parking_lot::Mutex;

    fn key(x: u32) -> TileKey {
        TileKey::new(10, x, 0)
    }

    fn artifact(h: f32) -> MeshArtifact {
        MeshArtifact::Heightmap(HeightGrid::flat(2, h))
    }

    #[test]
    fn overflow_evicts_least_recently_used() {
        let mut cache = TileCache::new(3);
        for x in 0..4 {
            cache.put(key(x), artifact(x as f32));
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(key(0)));
        assert!((1..4).all(|x| cache.contains(key(x))));
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = TileCache::new(2);
        cache.put(key(0), artifact(0.0));
        cache.put(key(1), artifact(1.0));
        assert_eq!(cache.get(key(0)), Some(artifact(0.0)));
        cache.put(key(2), artifact(2.0));
        assert!(cache.contains(key(0)));
        assert!(!cache.contains(key(1)));
    }

    #[test]
    fn overwrite_replaces_value_without_growing() {
        let mut cache = TileCache::new(2);
        cache.put(key(0), artifact(0.0));
        cache.put(key(0), artifact(5.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(key(0)), Some(artifact(5.0)));
        assert_eq!(cache.get(key(1)), None);
    }

    #[test]
    fn returned_values_are_independent_copies() {
        let mut cache = TileCache::new(1);
        cache.put(key(0), artifact(1.0));
        let mut copy = cache.get(key(0)).unwrap();
        if let MeshArtifact::Heightmap(grid) = &mut copy {
            *grid = HeightGrid::flat(2, 99.0);
        }
        assert_eq!(cache.get(key(0)), Some(artifact(1.0)));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = TileCache::new(0);
        cache.put(key(0), artifact(1.0));
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_cache_never_exceeds_capacity() {
        let cache = Mutex::new(TileCache::new(8));
        crossbeam::scope(|s| {
            for t in 0..4 {
                let cache = &cache;
                s.spawn(move |_| {
                    for x in 0..100 {
                        let mut cache = cache.lock();
                        cache.put(TileKey::new(t, x, 0), artifact(x as f32));
                        assert!(cache.len() <= 8);
                        cache.get(TileKey::new(t, x / 2, 0));
                    }
                });
            }
        })
        .unwrap();
        assert_eq!(cache.lock().len(), 8);
    }
}
