//! Structured progress reporting for ingestion.
//!
//! Provides incremental feedback while documents are loaded, chunked,
//! embedded, indexed and persisted.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Step of an ingestion run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Load,
    Chunk,
    Embed,
    Build,
    Persist,
}

impl IngestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestPhase::Load => "load",
            IngestPhase::Chunk => "chunk",
            IngestPhase::Embed => "embed",
            IngestPhase::Build => "build",
            IngestPhase::Persist => "persist",
        }
    }
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress event emitted during ingestion.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: IngestPhase,

    /// Current progress (documents loaded, chunks embedded, etc.)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    /// Create a new progress event.
    pub fn new(
        phase: IngestPhase,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        let percentage = total.map(|t| {
            if t > 0 {
                (current as f64 / t as f64) * 100.0
            } else {
                0.0
            }
        });

        Self {
            phase,
            current,
            total,
            percentage,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    /// Set elapsed time.
    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => format!("{}", self.current),
        };

        let pct = self
            .percentage
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let event = event.with_elapsed(elapsed);

            tracing::debug!(
                phase = %event.phase,
                current = event.current,
                total = ?event.total,
                message = %event.message,
                elapsed_secs = elapsed,
                "Progress event"
            );

            callback(event);
        }
    }

    /// Documents loaded from the source directory.
    pub fn load(&self, documents: u64, dir: &str) {
        self.emit(ProgressEvent::new(
            IngestPhase::Load,
            documents,
            None,
            format!("documents from {}", dir),
        ));
    }

    /// Chunks produced from the loaded documents.
    pub fn chunk(&self, chunks: u64, documents: u64) {
        self.emit(ProgressEvent::new(
            IngestPhase::Chunk,
            chunks,
            None,
            format!("chunks from {} documents", documents),
        ));
    }

    /// Chunks embedded so far.
    pub fn embed(&self, current: u64, total: u64, model: &str) {
        self.emit(ProgressEvent::new(
            IngestPhase::Embed,
            current,
            Some(total),
            format!("model={}", model),
        ));
    }

    /// Vector index built.
    pub fn build(&self, vectors: u64, dimension: usize) {
        self.emit(ProgressEvent::new(
            IngestPhase::Build,
            vectors,
            Some(vectors),
            format!("dimension {}", dimension),
        ));
    }

    /// Index pair written to disk.
    pub fn persist(&self, dir: &str) {
        self.emit(ProgressEvent::new(IngestPhase::Persist, 1, Some(1), format!("wrote {}", dir)));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}
