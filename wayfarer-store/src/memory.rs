//! Auto-increment tables backing the in-memory repositories.

use std::collections::BTreeMap;

/// Rows keyed by a store-assigned id. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    /// Assign the next id, build the row from it and store it.
    pub fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.next_id += 1;
        let row = build(self.next_id);
        self.rows.insert(self.next_id, row.clone());
        row
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Rows in id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn cloned_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
