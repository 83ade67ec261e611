//! Bounded snapshot history for single-step undo

use std::collections::VecDeque;

use crate::document::Document;

/// How many snapshots are retained before the oldest is evicted
pub const HISTORY_CAPACITY: usize = 20;

/// A bounded LIFO stack of deep snapshots of the document store.
///
/// A snapshot is pushed immediately before every mutating operation; undo
/// pops the most recent one. Snapshots are structurally independent copies,
/// so later mutation of the live store cannot corrupt a stored state.
#[derive(Debug, Default)]
pub struct HistoryStack {
    snapshots: VecDeque<Vec<Document>>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a deep snapshot, evicting the oldest entry past capacity
    pub fn push(&mut self, store: &[Document]) {
        self.snapshots.push_front(store.to_vec());
        self.snapshots.truncate(HISTORY_CAPACITY);
    }

    /// Pop the most recent snapshot, or `None` when the stack is empty
    pub fn pop(&mut self) -> Option<Vec<Document>> {
        self.snapshots.pop_front()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Document {
        Document::new(name, "<p>body</p>")
    }

    #[test]
    fn test_pop_returns_most_recent_first() {
        let mut history = HistoryStack::new();
        history.push(&[doc("first")]);
        history.push(&[doc("second")]);

        assert_eq!(history.pop().unwrap()[0].name, "second");
        assert_eq!(history.pop().unwrap()[0].name, "first");
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStack::new();
        for i in 0..HISTORY_CAPACITY + 5 {
            history.push(&[doc(&format!("snap_{}", i))]);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);

        // The newest snapshot is intact; the five oldest are gone
        assert_eq!(history.pop().unwrap()[0].name, "snap_24");
        let mut last = None;
        while let Some(snapshot) = history.pop() {
            last = Some(snapshot);
        }
        assert_eq!(last.unwrap()[0].name, "snap_5");
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let mut store = vec![doc("original")];
        let mut history = HistoryStack::new();
        history.push(&store);

        store[0].name = "mutated".to_string();
        store[0].body = "<p>changed</p>".to_string();

        let snapshot = history.pop().unwrap();
        assert_eq!(snapshot[0].name, "original");
        assert_eq!(snapshot[0].body, "<p>body</p>");
    }
}
