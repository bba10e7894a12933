//! Generation service abstraction layer.
//!
//! Provides a unified interface over the HTTP interaction-node service and the offline
//! echo generator, plus the worker-thread dispatch used by the event loop.

pub mod echo;
pub mod error;
pub mod http;

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use bf_core::{GenerationJob, GenerationOutcome, GenerationReply, GenerationRequest};
use log::{debug, warn};

use crate::config::Settings;
pub use error::GenerationError;

/// Trait for generation backends
pub trait GenerationClient: Send + Sync {
    /// Run one blocking request
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError>;

    /// Short label for the status bar
    fn name(&self) -> &'static str;
}

/// Get the client selected by the settings
pub fn get_client(settings: &Settings) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    if settings.offline {
        return Ok(Arc::new(echo::EchoGenerationClient::new(settings.offline_delay)));
    }
    Ok(Arc::new(http::HttpGenerationClient::new(settings)?))
}

/// Run `job` on a worker thread and send exactly one outcome back on `tx`.
///
/// The worker never sees the session; if the receiver is gone (app shutting down) the
/// outcome is dropped.
pub fn spawn_generation(
    client: Arc<dyn GenerationClient>,
    job: GenerationJob,
    tx: Sender<GenerationOutcome>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        debug!("worker started for {} (epoch {})", job.turn_id, job.epoch);
        let result = client.generate(&job.request).map_err(Into::into);
        if tx.send(job.outcome(result)).is_err() {
            warn!("outcome for {} dropped: event loop gone", job.turn_id);
        }
    })
}
