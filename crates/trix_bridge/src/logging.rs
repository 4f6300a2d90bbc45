use crate::errors::{BridgeError, Result};

/// Install a fmt subscriber at `level`.
///
/// A no-op when the host already installed a global subscriber.
pub fn init(level: &str) -> Result<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| BridgeError::Config(format!("unknown log level {level:?}")))?;
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_thread_names(true)
        .try_init();
    Ok(())
}
