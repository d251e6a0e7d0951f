//! Configuration for the pitch analyzer.

/// Mutable, pre-processing configuration for a [`crate::analyzer::PitchAnalyzer`].
/// Any field may be changed between streams; [`crate::analyzer::PitchAnalyzer::reset`]
/// must be called afterward to recompute derived values and re-seed the
/// zero-padding prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchAnalyzerConfig {
    /// Inter-step interval, in seconds.
    pub frame_time_step: f32,
    /// Lower bound (Hz) for voiced candidates.
    pub minimal_frequency: f32,
    /// Upper bound (Hz) for voiced candidates.
    pub maximal_frequency: f32,
    /// Multiplier applied to the first-frame peak when seeding
    /// `global_absolute_peak`.
    pub initial_absolute_peak_coeff: f32,
    /// High-frequency bias applied by the Boersma and max-frequency
    /// weight formulas.
    pub octave_cost: f32,
    /// Transition penalty between a voiced and an unvoiced candidate.
    pub voiced_unvoiced_cost: f32,
    /// Scale applied to the octave distance between two voiced candidates
    /// at adjacent steps.
    pub octave_jump_cost: f32,
    /// Denominator term of the unvoiced candidate's weight formula.
    pub silence_threshold: f32,
    /// Baseline weight of the unvoiced candidate.
    pub voicing_threshold: f32,
    /// Number of zero samples the analyzer pads the buffer with, so the
    /// first frames have left-context.
    pub zero_padding: usize,
    /// Notes shorter than this many samples are discarded during merge.
    pub minimal_note_length: u32,
    /// Sampling rate of the input stream, in Hz.
    pub sampling_rate: f32,
}

impl Default for PitchAnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_time_step: 0.01,
            minimal_frequency: 20.0,
            maximal_frequency: 800.0,
            initial_absolute_peak_coeff: 1.0,
            octave_cost: 0.02,
            voiced_unvoiced_cost: 0.2,
            octave_jump_cost: 0.2,
            silence_threshold: 0.15,
            voicing_threshold: 0.4,
            zero_padding: 2048,
            minimal_note_length: 6,
            sampling_rate: 48000.0,
        }
    }
}

impl PitchAnalyzerConfig {
    /// Time interval in seconds between two samples (`1 / sampling_rate`).
    pub fn delta_t(&self) -> f32 {
        1.0 / self.sampling_rate
    }

    /// Number of samples between two steps, rounded to the nearest
    /// integer.
    pub fn frame_step_size(&self) -> usize {
        libm::roundf(self.frame_time_step * self.sampling_rate) as usize
    }
}
