//! Compression orchestration.
//!
//! Builds compression requests for the current session, coalesces slider
//! changes through a [`Debouncer`], and decides what to do with results as
//! they come back.
//!
//! Requests are never cancelled once started. Within a session the most
//! recent *completion* defines the displayed artifact, even if it came from
//! an older request. Results tagged with a session that no longer exists
//! are dropped.

pub mod debounce;

pub use debounce::{DebounceTicket, Debouncer};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::compress::{self, Compress, CompressOptions};
use crate::error::CompressionError;
use crate::state::{CompressedArtifact, Quality, Session, SessionId, Settings};

/// Identifies one compression call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Everything needed to run one compression off the UI thread
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub id: RequestId,
    pub session: SessionId,
    pub quality: Quality,
    pub data: Arc<Vec<u8>>,
    pub options: CompressOptions,
}

/// Result of a request, tagged so it can be matched to its session
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub id: RequestId,
    pub session: SessionId,
    pub quality: Quality,
    pub result: Result<Vec<u8>, CompressionError>,
}

/// What happened when an outcome was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The artifact is now displayed; `superseded` is the one it replaced
    Installed {
        artifact: CompressedArtifact,
        superseded: Option<CompressedArtifact>,
    },
    /// The compressor failed; the session is untouched
    Failed(CompressionError),
    /// The outcome belongs to a session that is gone
    Stale,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    settings: Settings,
    debouncer: Debouncer,
    next_request: u64,
}

impl Orchestrator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            debouncer: Debouncer::new(settings.debounce_window()),
            next_request: 0,
        }
    }

    pub fn debounce_window(&self) -> Duration {
        self.debouncer.window()
    }

    pub fn has_pending_change(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Build a request for the session's source at `quality`
    pub fn request(&mut self, session: &Session, quality: Quality) -> CompressionRequest {
        self.next_request += 1;
        let source = session.source();
        let request = CompressionRequest {
            id: RequestId(self.next_request),
            session: session.id(),
            quality,
            data: Arc::clone(&source.data),
            options: CompressOptions::new(&self.settings, quality, &source.media_type),
        };

        debug!(
            "Request {} for {} at {} ({})",
            request.id.0, source.name, quality, request.options.output_type
        );
        request
    }

    /// The slider moved; returns the ticket whose timer should be started
    pub fn quality_changed(&mut self) -> DebounceTicket {
        self.debouncer.schedule()
    }

    /// A debounce timer expired. Yields a request only for the latest
    /// ticket and only while a file is loaded.
    pub fn debounce_elapsed(
        &mut self,
        ticket: DebounceTicket,
        session: Option<&Session>,
        quality: Quality,
    ) -> Option<CompressionRequest> {
        if !self.debouncer.fire(ticket) {
            return None;
        }
        session.map(|session| self.request(session, quality))
    }

    /// Forget any pending slider change (new file or reset)
    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    /// Apply a finished request to the current session
    pub fn complete(&mut self, session: Option<&mut Session>, outcome: CompressionOutcome) -> Completion {
        let Some(session) = session.filter(|s| s.id() == outcome.session) else {
            debug!("Dropping result of request {} for a closed session", outcome.id.0);
            return Completion::Stale;
        };

        let data = match outcome.result {
            Ok(data) => data,
            Err(e) => {
                warn!("Request {} failed: {}", outcome.id.0, e);
                return Completion::Failed(e);
            }
        };

        let artifact = CompressedArtifact {
            data: Arc::new(data),
            quality: outcome.quality,
            request: outcome.id,
        };

        let original = session.source().size();
        info!(
            "Compressed {}: {} -> {} bytes at {} ({:.2}% saved)",
            session.source().name,
            original,
            artifact.size(),
            artifact.quality,
            savings_percent(original, artifact.size())
        );

        let superseded = session.install(artifact.clone());
        Completion::Installed { artifact, superseded }
    }
}

/// Share of the original size saved by compression (negative if it grew)
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

/// Run a request through the compressor
pub async fn execute(compressor: Arc<dyn Compress>, request: CompressionRequest) -> CompressionOutcome {
    let result = compress::run(compressor, request.data, request.options).await;
    CompressionOutcome {
        id: request.id,
        session: request.session,
        quality: request.quality,
        result,
    }
}
