//! Error types for the pitch analyzer

/// Errors that can occur while driving a [`crate::analyzer::PitchAnalyzer`]
/// or calling one of the free post-processing functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchError {
    /// An internal allocation failed; the analyzer remains consistent and
    /// the caller may retry.
    AllocationFailed,
    /// A frame cutter needs more samples than are currently buffered. Not
    /// surfaced from `add_samples`: the step loop treats this as a reason
    /// to stop advancing, not a failure.
    NeedMoreData,
    /// `compute_path` was called before any step had completed.
    EmptyResult,
    /// A MIDI number observed during note bucketing fell outside `[0, 128]`.
    /// Carries the offending value; the sample is skipped and a warning is
    /// logged, this is not a fatal condition.
    OutOfRangeMidi(f32),
    /// The window passed to `corrected_autocorrelation` is degenerate
    /// (all-zero window autocorrelation at lag 0), which would otherwise
    /// divide by zero.
    DegenerateWindow,
    /// `register_algorithm` was called after the analyzer had already
    /// produced at least one step. The candidate row width `K` is fixed
    /// once processing starts.
    AlreadyStarted,
}

impl core::fmt::Display for PitchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PitchError::AllocationFailed => write!(f, "internal allocation failed"),
            PitchError::NeedMoreData => write!(f, "more samples are required"),
            PitchError::EmptyResult => write!(f, "no path has been computed yet"),
            PitchError::OutOfRangeMidi(v) => {
                write!(f, "midi number {v} is outside the valid range [0, 128]")
            }
            PitchError::DegenerateWindow => write!(f, "window autocorrelation is degenerate at lag 0"),
            PitchError::AlreadyStarted => {
                write!(f, "cannot register an algorithm after processing has started")
            }
        }
    }
}

impl std::error::Error for PitchError {}
