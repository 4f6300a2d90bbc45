use crate::dispatcher::{Dispatcher, TaskId};
use crate::document::Document;
use crate::errors::{BridgeError, Result, TaskError};
use std::path::{Path, PathBuf};
use trix_core::TripleStore;

/// Open the store at `path` on a worker and hand the new document to `callback`.
///
/// The path is copied before this returns. The document itself is built on the
/// control thread; only the opened store crosses over from the worker.
pub fn create_document<S, F>(dispatcher: &Dispatcher, path: impl AsRef<Path>, callback: F) -> TaskId
where
    S: TripleStore,
    F: FnOnce(Result<Document<S>>) + 'static,
{
    let path = path.as_ref().to_path_buf();
    let requested = path.clone();
    tracing::debug!(path = %path.display(), "opening document");
    dispatcher.submit(
        path,
        |path: PathBuf| S::open(&path).map_err(TaskError::from),
        move |dispatcher, outcome| match outcome {
            Ok(store) => {
                let document = Document::pending(requested, dispatcher.clone());
                document.attach(store);
                tracing::info!(path = %document.path().display(), "document opened");
                callback(Ok(document))
            }
            Err(err) => {
                tracing::warn!(path = %requested.display(), error = %err, "document open failed");
                callback(Err(BridgeError::Open { path: requested, message: err.to_string() }))
            }
        },
    )
}

impl Dispatcher {
    /// Same as [`create_document`].
    pub fn open<S, F>(&self, path: impl AsRef<Path>, callback: F) -> TaskId
    where
        S: TripleStore,
        F: FnOnce(Result<Document<S>>) + 'static,
    {
        create_document(self, path, callback)
    }
}
