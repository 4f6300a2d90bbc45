#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::{tempdir, TempDir};
use trix_bridge::{create_document, BridgeConfig, Dispatcher, Document, TripleIndex, TripleRecord};
use trix_core::IndexWriter;

pub fn index_with(triples: &[(&str, &str, &str)]) -> (TempDir, PathBuf) {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("store.trix");
    let mut w = IndexWriter::create(&path).unwrap();
    for (s, p, o) in triples {
        w.add(s, p, o).unwrap();
    }
    w.finalize().unwrap();
    (tmp, path)
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(&BridgeConfig::default()).unwrap()
}

pub type Opened = Calls<trix_bridge::Result<Document<TripleIndex>>>;
pub type Found = Calls<trix_bridge::Result<Vec<TripleRecord>>>;
pub type Closed = Calls<trix_bridge::Result<()>>;

/// Records every invocation of the callbacks it hands out.
pub struct Calls<T>(Rc<RefCell<Vec<T>>>);

impl<T: 'static> Calls<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn sink(&self) -> impl FnOnce(T) + 'static {
        let calls = self.0.clone();
        move |v| calls.borrow_mut().push(v)
    }

    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }

    /// The single recorded value; fails when the callback ran zero or several times.
    pub fn only(&self) -> T {
        let mut calls = self.0.borrow_mut();
        assert_eq!(calls.len(), 1, "callback must fire exactly once");
        calls.pop().unwrap()
    }
}

pub fn open(d: &Dispatcher, path: &Path) -> Document<TripleIndex> {
    let calls = Opened::new();
    create_document::<TripleIndex, _>(d, path, calls.sink());
    d.run_until_idle();
    calls.only().expect("document opens")
}
