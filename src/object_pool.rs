use std::vec::Vec;

/// One item in a datapool with a used flag
#[derive(Clone)]
struct ReusableItem<T> {
    reserved: bool,
    item: T,
}

/// The key value used to signal the lack of an item
pub fn key_none_value() -> u32 {
    u32::MAX
}

pub fn key_might_be_some(key: u32) -> bool {
    key != key_none_value()
}

///####################################################################################
/// ObjectPool
///####################################################################################

/// Stores re-usable objects to eliminate allocation overhead when inserting and removing Nodes.
/// Freed slots are collected in an explicit free-list and handed out again before the buffer grows,
/// so keys stay stable for as long as the item they point to is reserved.
#[derive(Default, Clone)]
pub(crate) struct ObjectPool<T> {
    buffer: Vec<ReusableItem<T>>, // Pool of objects to be reused
    free_keys: Vec<usize>,        // slots not reserved, most recently freed last
}

impl<T> ObjectPool<T>
where
    T: Default,
{
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        ObjectPool {
            buffer: Vec::with_capacity(capacity),
            free_keys: Vec::new(),
        }
    }

    /// Number of slots, reserved or not
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Number of reserved slots
    pub(crate) fn count(&self) -> usize {
        self.buffer.len() - self.free_keys.len()
    }

    pub(crate) fn push(&mut self, item: T) -> usize {
        if let Some(key) = self.free_keys.pop() {
            debug_assert!(!self.buffer[key].reserved);
            self.buffer[key] = ReusableItem {
                reserved: true,
                item,
            };
            key
        } else {
            self.buffer.push(ReusableItem {
                reserved: true,
                item,
            });
            self.buffer.len() - 1
        }
    }

    /// Takes the item out of the pool, and makes its slot available for reuse
    pub(crate) fn pop(&mut self, key: usize) -> Option<T> {
        if self.key_is_valid(key) {
            self.buffer[key].reserved = false;
            self.free_keys.push(key);
            Some(std::mem::take(&mut self.buffer[key].item))
        } else {
            None
        }
    }

    pub(crate) fn free(&mut self, key: usize) -> bool {
        self.pop(key).is_some()
    }

    pub(crate) fn get(&self, key: usize) -> &T {
        debug_assert!(self.key_is_valid(key));
        &self.buffer[key].item
    }

    pub(crate) fn get_mut(&mut self, key: usize) -> &mut T {
        debug_assert!(self.key_is_valid(key));
        &mut self.buffer[key].item
    }

    pub(crate) fn key_is_valid(&self, key: usize) -> bool {
        key < self.buffer.len() && self.buffer[key].reserved
    }

    /// Provides the keys of every reserved item
    pub(crate) fn reserved_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.buffer
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.reserved)
            .map(|(key, _)| key)
    }
}
