use chrono::{DateTime, Utc};

/// Open window of the mutable buffer: an anchor and the records accepted
/// since it was opened, oldest first
#[derive(Debug, Clone)]
pub struct Window<R> {
    anchor: Option<DateTime<Utc>>,
    records: Vec<R>,
}

impl<R> Window<R> {
    /// Create an empty window with no anchor
    pub fn new() -> Self {
        Self {
            anchor: None,
            records: Vec::new(),
        }
    }

    /// Anchor of the open window, `None` while nothing is buffered
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Buffered records in arrival order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Append a record, opening the window at `anchor` if it is empty
    ///
    /// The anchor of a non-empty window never moves, so records retained
    /// after a short write keep the window they were accepted into.
    pub fn push(&mut self, anchor: DateTime<Utc>, record: R) {
        if self.records.is_empty() {
            self.anchor = Some(anchor);
        }
        self.records.push(record);
    }

    /// Drop the first `committed` records and keep the rest at the front
    pub fn discard_committed(&mut self, committed: usize) {
        let committed = committed.min(self.records.len());
        self.records.drain(..committed);
        if self.records.is_empty() {
            self.anchor = None;
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.anchor = None;
    }
}

impl<R> Default for Window<R> {
    fn default() -> Self {
        Self::new()
    }
}
