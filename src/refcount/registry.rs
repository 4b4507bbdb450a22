//! Per-key storage of class records.

use std::sync::Arc;

use parking_lot::Mutex;

use super::class::ClassCounter;
use super::key::ClassKey;

/// Get-or-create collection of [`ClassCounter`] records.
///
/// Records are boxed behind an `Arc` so their address is stable for the whole
/// life of the registry; entries are never removed one by one. The mutex only
/// guards the shape of the collection: counters inside the records are
/// updated without it.
#[derive(Default)]
pub(crate) struct ClassRegistry {
    classes: Mutex<Vec<Arc<ClassCounter>>>,
}

impl ClassRegistry {
    /// Returns the record for `key`, creating it with `make` if absent.
    pub(crate) fn get_or_insert_with(
        &self,
        key: &ClassKey,
        make: impl FnOnce() -> ClassCounter,
    ) -> Arc<ClassCounter> {
        let mut classes = self.classes.lock();
        if let Some(existing) = classes.iter().find(|class| class.key() == key) {
            return Arc::clone(existing);
        }
        let class = Arc::new(make());
        classes.push(Arc::clone(&class));
        class
    }

    /// Returns the record for `key` without creating it.
    pub(crate) fn get(&self, key: &ClassKey) -> Option<Arc<ClassCounter>> {
        self.classes
            .lock()
            .iter()
            .find(|class| class.key() == key)
            .cloned()
    }

    /// Returns every record, in creation order.
    pub(crate) fn entries(&self) -> Vec<Arc<ClassCounter>> {
        self.classes.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Drops every record, returning how many were released.
    pub(crate) fn release(&mut self) -> usize {
        let classes = std::mem::take(self.classes.get_mut());
        classes.len()
    }
}
