use core::cell::RefCell;

use heapless::{LinearMap, String, Vec};

use super::{KeyValueStore, StoreError};

/// Longest key accepted
pub const MAX_KEY_LEN: usize = 8;

/// Largest value accepted
pub const MAX_VALUE_LEN: usize = 16;

type Key = String<MAX_KEY_LEN>;
type Value = Vec<u8, MAX_VALUE_LEN>;

/// Volatile key-value store holding up to `N` entries
///
/// Useful for bring-up before a real medium is wired in, and in tests.
/// Oversized keys or values and a full table are reported as `Io`.
pub struct RamStore<const N: usize> {
    entries: RefCell<LinearMap<Key, Value, N>>,
}

impl<const N: usize> RamStore<N> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(LinearMap::new()),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Whether a value is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        match make_key(key) {
            Ok(k) => self.entries.borrow().contains_key(&k),
            Err(_) => false,
        }
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn make_key(key: &str) -> Result<Key, StoreError> {
    let mut k = Key::new();
    k.push_str(key).map_err(|_| StoreError::Io)?;
    Ok(k)
}

impl<const N: usize> KeyValueStore for RamStore<N> {
    fn get(&self, key: &str, buf: &mut [u8]) -> Result<(), StoreError> {
        let k = make_key(key)?;
        let entries = self.entries.borrow();
        let value = entries.get(&k).ok_or(StoreError::NotFound)?;
        if value.len() != buf.len() {
            return Err(StoreError::SizeMismatch {
                expected: buf.len(),
                actual: value.len(),
            });
        }
        buf.copy_from_slice(value);
        Ok(())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let k = make_key(key)?;
        let v = Value::from_slice(value).map_err(|_| StoreError::Io)?;
        self.entries
            .borrow_mut()
            .insert(k, v)
            .map_err(|_| StoreError::Io)?;
        Ok(())
    }
}
