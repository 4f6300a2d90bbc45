use crate::dispatcher::{Dispatcher, Outcome, TaskId};
use crate::errors::{BridgeError, Result, TaskError};
use crate::marshal::{self, TripleRecord};
use std::sync::Arc;
use trix_core::{Triple, TriplePattern, TripleStore};

/// What a search sees of its document, captured at submission.
pub(crate) enum SearchTarget<S> {
    Pending,
    Open(Arc<S>),
    Closed,
}

/// Drain a store search into owned triples.
///
/// The store's iterator borrows the store, so nothing it yields may outlive
/// this call.
pub fn materialize<S: TripleStore>(
    store: &S,
    pattern: &TriplePattern,
) -> trix_core::Result<Vec<Triple>> {
    store.search(pattern)?.map(|t| t.map(|t| t.to_triple())).collect()
}

fn run<S: TripleStore>(target: SearchTarget<S>, pattern: &TriplePattern) -> Outcome<Vec<Triple>> {
    let store = match target {
        SearchTarget::Open(store) => store,
        SearchTarget::Closed => return Ok(Vec::new()),
        SearchTarget::Pending => {
            return Err(TaskError::Rejected("document is still opening".into()))
        }
    };
    let triples = materialize(store.as_ref(), pattern)?;
    tracing::debug!(?pattern, matches = triples.len(), "search finished");
    Ok(triples)
}

pub(crate) fn submit<S, F>(
    dispatcher: &Dispatcher,
    target: SearchTarget<S>,
    pattern: TriplePattern,
    callback: F,
) -> TaskId
where
    S: TripleStore,
    F: FnOnce(Result<Vec<TripleRecord>>) + 'static,
{
    dispatcher.submit(
        (target, pattern),
        |(target, pattern)| run(target, &pattern),
        move |_, outcome| {
            let result = match outcome {
                Ok(triples) => Ok(marshal::records(triples)),
                Err(TaskError::Rejected(_)) => Err(BridgeError::NotReady),
                Err(err) => Err(BridgeError::Search(err.to_string())),
            };
            callback(result)
        },
    )
}
