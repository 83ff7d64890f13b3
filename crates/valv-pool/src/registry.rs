//! Per-element-type pool registry.

use std::any::{Any, TypeId};
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;

use valv_buffer::Element;

use crate::config::PoolConfig;
use crate::pool::BufferPool;

/// An explicitly constructed set of buffer pools, one per element type.
///
/// The registry is the dependency-injection answer to "one pool per
/// element type, shared by the whole program": construct one where the
/// program composes its services, hand clones of the per-type pools to
/// whoever needs them, and let test code build its own isolated
/// registry instead of sharing process globals.
///
/// All pools created through a registry share its [`PoolConfig`].
pub struct PoolRegistry {
    pools: Mutex<IndexMap<TypeId, Box<dyn Any + Send + Sync>>>,
    config: PoolConfig,
}

impl PoolRegistry {
    /// Create a registry whose pools use the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            pools: Mutex::new(IndexMap::new()),
            config,
        }
    }

    /// The pool for element type `T`, created on first use.
    ///
    /// Returns a cheap clone sharing the registry's free list for `T`,
    /// so repeated calls hand out handles to the same pool.
    pub fn pool<T: Element>(&self) -> BufferPool<T> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(BufferPool::<T>::new(self.config.clone())));
        entry
            .downcast_ref::<BufferPool<T>>()
            .expect("registry entries are keyed by their exact element type")
            .clone()
    }

    /// Number of element types with a pool so far.
    pub fn pool_count(&self) -> usize {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The configuration shared by every pool in this registry.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_resolves_to_the_same_pool() {
        let registry = PoolRegistry::default();

        let first = registry.pool::<u32>();
        let buf = first.rent(4).unwrap();
        let id = buf.id();
        first.recycle(buf).unwrap();

        // A second resolution shares the free list, so it sees the object.
        let second = registry.pool::<u32>();
        let reused = second.rent(4).unwrap();
        assert_eq!(reused.id(), id);
        second.recycle(reused).unwrap();

        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn distinct_types_get_distinct_pools() {
        let registry = PoolRegistry::default();

        let bytes = registry.pool::<u8>();
        let words = registry.pool::<u64>();
        assert_eq!(registry.pool_count(), 2);

        let buf = bytes.rent(4).unwrap();
        bytes.recycle(buf).unwrap();
        assert_eq!(bytes.idle_count(), 1);
        assert_eq!(words.idle_count(), 0);

        let drain = bytes.rent(1).unwrap();
        bytes.recycle(drain).unwrap();
    }

    #[test]
    fn registries_are_isolated_from_each_other() {
        let a = PoolRegistry::new(PoolConfig::new(4));
        let b = PoolRegistry::new(PoolConfig::new(4));

        let pool_a = a.pool::<u16>();
        let buf = pool_a.rent(2).unwrap();
        pool_a.recycle(buf).unwrap();

        assert_eq!(pool_a.idle_count(), 1);
        assert_eq!(b.pool::<u16>().idle_count(), 0);
    }
}
