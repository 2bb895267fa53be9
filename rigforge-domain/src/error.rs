use rigforge_types::Category;
use thiserror::Error;

/// Fatal synthesis failures.
///
/// A category without compatible candidates, a budget overshoot and validator findings
/// are not errors; they are reported in the result.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("candidate oracle failed for {category}: {source:#}")]
    Oracle {
        category: Category,
        #[source]
        source: anyhow::Error,
    },
}
