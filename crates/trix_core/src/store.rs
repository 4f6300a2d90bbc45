//! Adapter trait between the bridge and a concrete triple store.

use crate::errors::Result;
use crate::index::{Matches, TripleIndex};
use crate::triple::{TriplePattern, TripleRef};
use std::path::Path;

/// A read-only triple store that can be opened from a path and searched by pattern.
///
/// Implementations must tolerate concurrent `search` calls on one instance.
/// The iterator returned by `search` borrows the store and may yield an error
/// for an individual item if the store detects a fault while scanning.
///
/// Concrete stores may expose an inherent API that differs from this trait.
/// Inherent methods win method resolution on a concrete type, so one sharing a
/// trait method's name must also share its return type (`TripleIndex::open`
/// does; its search is `scan`).
pub trait TripleStore: Send + Sync + Sized + 'static {
    type Matches<'a>: Iterator<Item = Result<TripleRef<'a>>>
    where
        Self: 'a;

    fn open(path: &Path) -> Result<Self>;

    fn search<'a>(&'a self, pattern: &TriplePattern) -> Result<Self::Matches<'a>>;
}

impl TripleStore for TripleIndex {
    type Matches<'a> = Matches<'a>;

    fn open(path: &Path) -> Result<Self> {
        TripleIndex::open(path)
    }

    fn search<'a>(&'a self, pattern: &TriplePattern) -> Result<Matches<'a>> {
        Ok(self.scan(pattern))
    }
}
