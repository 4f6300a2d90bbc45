//! Close while a search is running on a worker.

mod common;

use common::{dispatcher, Calls, Found};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use trix_bridge::{create_document, Document, TripleRecord, TriplePattern, TripleStore};
use trix_core::TripleRef;

static STARTED: AtomicBool = AtomicBool::new(false);
static RELEASE: AtomicBool = AtomicBool::new(false);
static DROPPED: AtomicBool = AtomicBool::new(false);

/// Blocks every search until `RELEASE` is set.
struct GatedStore;

impl Drop for GatedStore {
    fn drop(&mut self) {
        DROPPED.store(true, Ordering::SeqCst);
    }
}

impl TripleStore for GatedStore {
    type Matches<'a> = std::vec::IntoIter<trix_core::Result<TripleRef<'a>>>;

    fn open(_path: &Path) -> trix_core::Result<Self> {
        Ok(GatedStore)
    }

    fn search<'a>(&'a self, _pattern: &TriplePattern) -> trix_core::Result<Self::Matches<'a>> {
        STARTED.store(true, Ordering::SeqCst);
        while !RELEASE.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(vec![Ok(TripleRef { subject: "a", predicate: "b", object: "c" })].into_iter())
    }
}

#[test]
fn in_flight_search_outlives_close() {
    let d = dispatcher();
    let opened: Calls<trix_bridge::Result<Document<GatedStore>>> = Calls::new();
    create_document::<GatedStore, _>(&d, "gated", opened.sink());
    d.run_until_idle();
    let doc = opened.only().unwrap();

    let in_flight = Found::new();
    doc.search(TriplePattern::any(), in_flight.sink());

    let deadline = Instant::now() + Duration::from_secs(10);
    while !STARTED.load(Ordering::SeqCst) {
        assert!(Instant::now() < deadline, "search never started");
        thread::sleep(Duration::from_millis(1));
    }

    doc.close();
    assert!(doc.is_closed());
    assert!(!DROPPED.load(Ordering::SeqCst), "store released under a running search");

    let after_close = Found::new();
    doc.search(TriplePattern::any(), after_close.sink());

    RELEASE.store(true, Ordering::SeqCst);
    d.run_until_idle();

    assert_eq!(in_flight.only().unwrap(), vec![TripleRecord::new("a", "b", "c")]);
    assert_eq!(after_close.only().unwrap(), vec![]);
    assert!(DROPPED.load(Ordering::SeqCst));
}
