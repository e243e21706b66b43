//! Shared helpers for commands that produce sound.

use std::sync::Arc;

use chiptone_config::EngineConfig;
use chiptone_io::ToneEngine;

/// Open the system output and close it again on Ctrl+C.
///
/// Closing from the handler makes any blocked `play_notes` return
/// `AlreadyClosed` at its next note.
pub fn start_engine(config: EngineConfig, device: Option<String>) -> anyhow::Result<Arc<ToneEngine>> {
    let config = match device {
        Some(name) => config.with_device(name),
        None => config,
    };

    let engine = Arc::new(ToneEngine::with_cpal(config)?);
    engine.init()?;

    let handler_engine = Arc::clone(&engine);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        if let Err(e) = handler_engine.close() {
            tracing::warn!(error = %e, "failed to close engine");
        }
    })?;

    Ok(engine)
}
