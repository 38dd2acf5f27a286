use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Type-safe handle to a resource held by a [`ResourceRegistry`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle<T> {
    id: u64,
    _phantom: PhantomData<T>,
}

// Manual impls: a handle is always copyable regardless of what it points at.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    pub(crate) fn next() -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Registry mapping handles to resources, keyed by resource type then id.
///
/// Holds wgpu objects (buffers, pipelines, bind groups) as well as
/// crate-level types like render targets; anything `'static` qualifies.
#[derive(Default)]
pub struct ResourceRegistry {
    inner: HashMap<TypeId, HashMap<u64, Box<dyn Any>>>,
}

impl ResourceRegistry {
    /// Store a resource and mint a fresh handle for it.
    pub fn insert<T: Any>(&mut self, resource: T) -> Handle<T> {
        let handle = Handle::next();
        self.inner
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(handle.id, Box::new(resource));
        handle
    }

    pub fn get<T: Any>(&self, handle: Handle<T>) -> Option<&T> {
        self.inner
            .get(&TypeId::of::<T>())?
            .get(&handle.id)?
            .downcast_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_roundtrips() {
        let mut registry = ResourceRegistry::default();
        let handle = registry.insert("scene target".to_string());
        assert_eq!(registry.get(handle).map(String::as_str), Some("scene target"));
    }

    #[test]
    fn handles_are_unique_per_insert() {
        let mut registry = ResourceRegistry::default();
        let a = registry.insert(1u32);
        let b = registry.insert(1u32);
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.get(a), Some(&1u32));
        assert_eq!(registry.get(b), Some(&1u32));
    }

    #[test]
    fn get_with_foreign_handle_is_none() {
        let mut registry = ResourceRegistry::default();
        let _ = registry.insert(7u64);
        let stale = Handle::<u64>::next();
        assert!(registry.get(stale).is_none());
    }
}
