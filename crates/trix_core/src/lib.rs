pub mod consts;
pub mod errors;
pub mod utils;
pub mod triple;
pub mod store;
pub mod index;
pub mod writer;

pub use errors::{Result, StoreError};
pub use index::{Matches, TripleIndex};
pub use store::TripleStore;
pub use triple::{Triple, TriplePattern, TripleRef};
pub use writer::IndexWriter;
