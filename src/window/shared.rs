use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Run of records shared between versions
///
/// Cloning is cheap and every clone is an independent version: pushing onto
/// one version never changes what another version sees. Versions share one
/// append-only backing vector and each sees only its first `len` records, so
/// the newest version appends in place. Only a version that fell behind the
/// backing (a fork of an older version) copies its records on append.
#[derive(Debug)]
pub struct SharedRun<R> {
    records: Arc<RwLock<Vec<R>>>,
    len: usize,
}

impl<R> SharedRun<R> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Records below every version's len are never written again, so a guard
    // recovered from a poisoned lock still holds them intact.
    fn read(&self) -> RwLockReadGuard<'_, Vec<R>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn shares_backing_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl<R: Clone> SharedRun<R> {
    /// Records of this version, oldest first
    pub fn to_vec(&self) -> Vec<R> {
        self.read()[..self.len].to_vec()
    }

    /// Append a record to this version only
    pub fn push(&mut self, record: R) {
        {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            if records.len() == self.len {
                records.push(record);
                self.len += 1;
                return;
            }
        }

        let mut records = Vec::with_capacity((self.len + 1).next_power_of_two());
        records.extend_from_slice(&self.read()[..self.len]);
        records.push(record);
        *self = Self::from(records);
    }

    /// New version holding everything after the first `committed` records
    pub fn without_committed(&self, committed: usize) -> Self {
        let committed = committed.min(self.len);
        Self::from(self.read()[committed..self.len].to_vec())
    }
}

impl<R> Clone for SharedRun<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            len: self.len,
        }
    }
}

impl<R> Default for SharedRun<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> From<Vec<R>> for SharedRun<R> {
    fn from(records: Vec<R>) -> Self {
        let len = records.len();
        Self {
            records: Arc::new(RwLock::new(records)),
            len,
        }
    }
}
