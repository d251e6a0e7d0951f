//! The seam between the analyzer/scheduler and the pluggable candidate
//! generators: a trait playing the role of the source's "parent struct"
//! polymorphism, plus the per-step spectral artifact shared between a
//! Boersma voiced generator and a max-frequency generator.

use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;
use crate::error::PitchError;

/// Per-step spectral artifact shared between generators that run within
/// the same step. The Boersma voiced generator writes `last_fft`; the
/// max-frequency generator reads it. Scoped to a single step (spec.md's
/// resource-discipline requirement that per-frame temporaries are
/// released before the step returns) rather than stored as a field
/// mutated across the analyzer's whole lifetime.
#[derive(Debug, Default, Clone)]
pub struct StepContext {
    /// The most recent padded forward real FFT computed by a Boersma
    /// voiced generator this step, if one ran before the reader.
    pub last_fft: Option<Vec<f32>>,
    /// `4 * size_out` of the autocorrelation that produced `last_fft`
    /// (see spec: "This value is dependent on the autocorrelation
    /// implementation").
    pub last_fft_size: usize,
    /// Running maximum absolute sample amplitude seen by the analyzer,
    /// snapshotted for this step. Read by the unvoiced generator.
    pub global_absolute_peak: f32,
}

/// A candidate generator: owns its frame size, how many candidates it
/// contributes per step, and the ability to cut a frame from the buffer
/// and score it. Descriptors are stored in an ordered collection owned by
/// the analyzer and run in reverse-of-registration order (see
/// [`crate::analyzer::PitchAnalyzer::register_algorithm`]).
pub trait AlgorithmDescriptor {
    /// Size of the frame this generator consumes. Recommended to be a
    /// power of two; 2048 is the default across all three generators.
    fn frame_size(&self) -> usize;

    /// Number of candidates this generator contributes to each step's row.
    fn nb_candidates_per_step(&self) -> usize;

    /// Cut a frame centered on `buffer_index`, or report that more data is
    /// needed. The default implementation is shared by all three
    /// generators specified (Boersma voiced/unvoiced and max-frequency all
    /// use the same frame cutter).
    fn generate_frame<'a>(
        &self,
        buffer: &'a [f32],
        buffer_index: usize,
    ) -> Result<&'a [f32], PitchError> {
        cut_frame(buffer, buffer_index, self.frame_size())
    }

    /// Score `frame` and return exactly [`Self::nb_candidates_per_step`]
    /// candidates, appended into the step's row in execution order.
    fn generate_candidates(
        &mut self,
        ctx: &mut StepContext,
        config: &PitchAnalyzerConfig,
        frame: &[f32],
    ) -> Vec<Candidate>;
}

/// Cut a frame of `frame_size` samples centered on `buffer_index`:
/// `buffer[index - frame_size/2 .. index + ceil(frame_size/2)]`. The left
/// edge is clamped to zero at start-of-stream; if the right edge still
/// falls outside the buffer, more data is required.
pub fn cut_frame(buffer: &[f32], buffer_index: usize, frame_size: usize) -> Result<&[f32], PitchError> {
    let right_half = if frame_size % 2 == 1 { frame_size / 2 + 1 } else { frame_size / 2 };

    if buffer_index + right_half > buffer.len() {
        return Err(PitchError::NeedMoreData);
    }

    let left_half = frame_size / 2;
    let mut start = buffer_index.saturating_sub(left_half);
    if buffer_index < left_half {
        start = 0;
        if start + frame_size > buffer.len() {
            return Err(PitchError::NeedMoreData);
        }
    }

    Ok(&buffer[start..start + frame_size])
}

/// Default (Boersma) transition cost between two candidates at adjacent
/// steps: zero between two unvoiced candidates, a flat penalty between a
/// voiced and an unvoiced candidate, and an octave-scaled penalty between
/// two voiced candidates.
pub fn boersma_transition_cost(config: &PitchAnalyzerConfig, first: &Candidate, second: &Candidate) -> f32 {
    let (f1, f2) = (first.frequency, second.frequency);
    if f1 == 0.0 && f2 == 0.0 {
        return 0.0;
    }
    if f1 == 0.0 || f2 == 0.0 {
        return config.voiced_unvoiced_cost;
    }
    config.octave_jump_cost * libm::fabsf(libm::log2f(f1 / f2))
}
