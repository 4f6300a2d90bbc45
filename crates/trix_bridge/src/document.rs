//! Caller-visible handle over one opened store.

use crate::dispatcher::{Dispatcher, TaskId};
use crate::errors::Result;
use crate::marshal::TripleRecord;
use crate::search::{self, SearchTarget};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trix_core::{TripleIndex, TriplePattern, TripleStore};

enum DocumentState<S> {
    /// Created, store not attached yet.
    Pending,
    Open(Arc<S>),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Open,
    Closed,
}

/// A document backed by a read-only triple store.
///
/// Searches clone the store reference when submitted. Closing drops the
/// document's own reference; the store is released once the last search that
/// was already in flight has finished, and those searches still deliver their
/// full results.
pub struct Document<S: TripleStore = TripleIndex> {
    path: PathBuf,
    dispatcher: Dispatcher,
    state: RefCell<DocumentState<S>>,
}

impl<S: TripleStore> Document<S> {
    pub(crate) fn pending(path: PathBuf, dispatcher: Dispatcher) -> Self {
        Self { path, dispatcher, state: RefCell::new(DocumentState::Pending) }
    }

    /// Pending -> Open. A store arriving for a document that is no longer
    /// pending is dropped.
    pub(crate) fn attach(&self, store: S) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, DocumentState::Pending) {
            *state = DocumentState::Open(Arc::new(store));
        } else {
            tracing::warn!(path = %self.path.display(), "store arrived for a settled document; releasing it");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> DocumentStatus {
        match *self.state.borrow() {
            DocumentState::Pending => DocumentStatus::Pending,
            DocumentState::Open(_) => DocumentStatus::Open,
            DocumentState::Closed => DocumentStatus::Closed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == DocumentStatus::Pending
    }

    /// True iff no store reference is held.
    pub fn is_closed(&self) -> bool {
        self.status() != DocumentStatus::Open
    }

    /// Release the store reference and disable further searches. Idempotent.
    pub fn destroy(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), DocumentState::Closed);
        if let DocumentState::Open(store) = previous {
            let in_flight = Arc::strong_count(&store) - 1;
            tracing::info!(path = %self.path.display(), in_flight, "document closed");
        }
    }

    pub fn close(&self) {
        self.destroy();
    }

    /// Close, then report to `callback` (never with an error).
    pub fn close_then<F>(&self, callback: F)
    where
        F: FnOnce(Result<()>),
    {
        self.destroy();
        callback(Ok(()));
    }

    /// Search for `pattern` on a worker; `callback` receives the matches in
    /// store order.
    ///
    /// On a closed document the callback receives an empty list. On a pending
    /// one it receives `BridgeError::NotReady`.
    pub fn search<F>(&self, pattern: TriplePattern, callback: F) -> TaskId
    where
        F: FnOnce(Result<Vec<TripleRecord>>) + 'static,
    {
        let target = match &*self.state.borrow() {
            DocumentState::Pending => SearchTarget::Pending,
            DocumentState::Open(store) => SearchTarget::Open(Arc::clone(store)),
            DocumentState::Closed => SearchTarget::Closed,
        };
        search::submit(&self.dispatcher, target, pattern, callback)
    }

    /// `search` with the three terms given separately; empty means any.
    pub fn search_terms<F>(&self, subject: &str, predicate: &str, object: &str, callback: F) -> TaskId
    where
        F: FnOnce(Result<Vec<TripleRecord>>) + 'static,
    {
        self.search(TriplePattern::new(subject, predicate, object), callback)
    }
}

impl<S: TripleStore> Drop for Document<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: TripleStore> fmt::Debug for Document<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::errors::BridgeError;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};
    use trix_core::IndexWriter;

    fn fixture() -> (TempDir, PathBuf) {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("doc.trix");
        let mut w = IndexWriter::create(&path).unwrap();
        w.add("a", "b", "c").unwrap();
        w.finalize().unwrap();
        (tmp, path)
    }

    #[test]
    fn pending_document_rejects_search() {
        let (_tmp, path) = fixture();
        let d = Dispatcher::new(&BridgeConfig::default()).unwrap();
        let doc: Document = Document::pending(path, d.clone());
        assert!(doc.is_pending());
        assert!(doc.is_closed());

        let got = Rc::new(RefCell::new(None));
        let slot = got.clone();
        doc.search(TriplePattern::any(), move |r| *slot.borrow_mut() = Some(r));
        d.run_until_idle();
        assert!(matches!(got.borrow_mut().take(), Some(Err(BridgeError::NotReady))));
    }

    #[test]
    fn attach_opens_then_destroy_closes() {
        let (_tmp, path) = fixture();
        let d = Dispatcher::new(&BridgeConfig::default()).unwrap();
        let doc: Document = Document::pending(path.clone(), d);
        doc.attach(TripleIndex::open(&path).unwrap());
        assert_eq!(doc.status(), DocumentStatus::Open);
        assert!(!doc.is_closed());

        doc.destroy();
        assert_eq!(doc.status(), DocumentStatus::Closed);
        doc.destroy();
        assert_eq!(doc.status(), DocumentStatus::Closed);
    }

    #[test]
    fn late_attach_does_not_reopen() {
        let (_tmp, path) = fixture();
        let d = Dispatcher::new(&BridgeConfig::default()).unwrap();
        let doc: Document = Document::pending(path.clone(), d);
        doc.close();
        doc.attach(TripleIndex::open(&path).unwrap());
        assert_eq!(doc.status(), DocumentStatus::Closed);
    }
}
