//! The max-frequency candidate generator: reuses the forward FFT computed
//! by a Boersma voiced generator earlier in the same step to look for a
//! dominant high-frequency partial (e.g. a sibilant or a harmonic lost to
//! the autocorrelation's low-frequency bias).

use crate::algorithm::AlgorithmDescriptor;
use crate::algorithm::StepContext;
use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;

/// Frequency band (Hz) this generator searches for a dominant partial.
const MIN_SEARCH_FREQUENCY: f32 = 880.0;
const MAX_SEARCH_FREQUENCY: f32 = 2500.0;

/// Max-frequency candidate generator (§4.3.3). Always contributes exactly
/// one candidate. Depends on registration order: it must run after a
/// Boersma voiced generator within the same step so [`StepContext::last_fft`]
/// is populated.
pub struct MaxFrequency {
    frame_size: usize,
}

impl MaxFrequency {
    /// `frame_size` defaults to 2048 when 0 is passed. Should match the
    /// paired Boersma voiced generator's frame size so the retained FFT
    /// bin-to-frequency mapping is meaningful.
    pub fn new(frame_size: usize) -> Self {
        Self { frame_size: if frame_size == 0 { 2048 } else { frame_size } }
    }
}

impl Default for MaxFrequency {
    fn default() -> Self {
        Self::new(0)
    }
}

/// `v(k) = log2(1 + |X_k|^2)` for an interior bin of a `realft`-packed
/// spectrum of length `n`, or `log2(1 + |X_k|)` (magnitude, not squared) at
/// the two real-valued endpoint bins — the endpoints are a quirk of the
/// source this estimator is ported from, preserved rather than normalized
/// away.
fn bin_value(buf: &[f32], n: usize, k: usize) -> f32 {
    if k == 0 {
        libm::log2f(1.0 + libm::fabsf(buf[0]))
    } else if k == n / 2 {
        libm::log2f(1.0 + libm::fabsf(buf[1]))
    } else {
        let re = buf[2 * k];
        let im = buf[2 * k + 1];
        libm::log2f(1.0 + re * re + im * im)
    }
}

/// Scan every bin `0..=n/2`, returning `(argmax bin, v at the argmax, mean
/// of v over n/2 bins)`.
fn argmax_and_mean(buf: &[f32], n: usize) -> (usize, f32, f32) {
    let mut best_k = 0usize;
    let mut best_v = f32::MIN;
    let mut sum = 0.0f32;

    for k in 0..=(n / 2) {
        let v = bin_value(buf, n, k);
        sum += v;
        if v > best_v {
            best_v = v;
            best_k = k;
        }
    }

    let mean = sum / (n / 2) as f32;
    (best_k, best_v, mean)
}

impl AlgorithmDescriptor for MaxFrequency {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn nb_candidates_per_step(&self) -> usize {
        1
    }

    fn generate_candidates(
        &mut self,
        ctx: &mut StepContext,
        config: &PitchAnalyzerConfig,
        _frame: &[f32],
    ) -> Vec<Candidate> {
        let n = ctx.last_fft_size;
        let Some(buf) = ctx.last_fft.as_ref() else {
            return vec![Candidate::default()];
        };
        if n < 2 || buf.len() < n {
            return vec![Candidate::default()];
        }

        let (bin, peak_v, mean_v) = argmax_and_mean(buf, n);
        let frequency = bin as f32 * config.sampling_rate / n as f32;

        if !(MIN_SEARCH_FREQUENCY..=MAX_SEARCH_FREQUENCY).contains(&frequency) {
            return vec![Candidate::default()];
        }

        let ratio = if peak_v != 0.0 { 1.0 - mean_v / peak_v } else { 0.0 };
        let amplitude = ratio * ratio;
        let weight = amplitude - config.octave_cost * libm::log2f(config.minimal_frequency / frequency);

        vec![Candidate::new(frequency, weight)]
    }
}
