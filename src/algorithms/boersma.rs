//! The Boersma voiced candidate generator: windowed, mean-subtracted,
//! window-corrected autocorrelation with parabolic lag interpolation.

use crate::algorithm::{AlgorithmDescriptor, StepContext};
use crate::autocorrelation::corrected_autocorrelation;
use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;
use crate::fft::hann;

/// Boersma voiced candidate generator (§4.3.1). Emits up to
/// `nb_candidates_per_step` voiced pitch candidates per frame, sorted by
/// descending weight, and stores its forward FFT into the shared
/// [`StepContext`] for a later max-frequency consumer to read.
pub struct BoersmaVoiced {
    frame_size: usize,
    nb_candidates_per_step: usize,
    window: Vec<f32>,
    window_ac: Option<Vec<f32>>,
}

impl BoersmaVoiced {
    /// `frame_size` defaults to 2048, `nb_candidates` to 3 when 0 is passed.
    pub fn new(frame_size: usize, nb_candidates: usize) -> Self {
        let frame_size = if frame_size == 0 { 2048 } else { frame_size };
        let nb_candidates = if nb_candidates == 0 { 3 } else { nb_candidates };
        let mut window = vec![0.0f32; frame_size];
        hann(&mut window);
        Self { frame_size, nb_candidates_per_step: nb_candidates, window, window_ac: None }
    }
}

impl Default for BoersmaVoiced {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Quadratic interpolation of the lag with maximal autocorrelation: fit a
/// parabola through `(k-1, x[k-1]), (k, x[k]), (k+1, x[k+1])` and return its
/// vertex abscissa. Falls back to `k` when the fit is degenerate
/// (zero curvature).
fn quadratic_vertex(k: usize, x: &[f32]) -> f32 {
    let xl = (k as f64) - 1.0;
    let xc = k as f64;
    let xr = (k as f64) + 1.0;
    let yl = x[k - 1] as f64;
    let yc = x[k] as f64;
    let yr = x[k + 1] as f64;

    let d2 = (yr - yc) - (yl - yc) / (xl - xc);
    let d1 = (yr - yc) / (xr - xc) - 0.5 * d2 * (xr - xc);

    if d2 != 0.0 {
        (xc - d1 / d2) as f32
    } else {
        xc as f32
    }
}

impl AlgorithmDescriptor for BoersmaVoiced {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn nb_candidates_per_step(&self) -> usize {
        self.nb_candidates_per_step
    }

    fn generate_candidates(
        &mut self,
        ctx: &mut StepContext,
        config: &PitchAnalyzerConfig,
        frame: &[f32],
    ) -> Vec<Candidate> {
        let mut retained_fft = Vec::new();
        let ac = match corrected_autocorrelation(frame, &self.window, &mut self.window_ac, Some(&mut retained_fft)) {
            Ok(ac) => ac,
            Err(_) => {
                // A degenerate Hann window cannot occur for frame_size >= 2
                // (endpoints are exactly zero but interior values are not),
                // so this is unreachable in practice; fall back to silence
                // rather than propagate, matching the generator's
                // infallible signature.
                return vec![Candidate::default(); self.nb_candidates_per_step];
            }
        };

        ctx.last_fft_size = ac.len() * 4;
        ctx.last_fft = Some(retained_fft);

        let l = ac.len();
        let working_size = self.nb_candidates_per_step.max(l);
        let mut candidates = vec![Candidate::default(); working_size];

        let delta_t = config.delta_t();
        for ds in 1..l.saturating_sub(1) {
            let v = ac[ds];
            if v >= ac[ds - 1] && v >= ac[ds + 1] {
                let ds_new = quadratic_vertex(ds, &ac);

                let frequency = 1.0 / (ds_new * delta_t);
                let amplitude = ac[ds] / ac[0];
                let t_max = ds as f32 * delta_t;
                let log_coef = libm::log2f(config.minimal_frequency * t_max);
                let weight = amplitude - config.octave_cost * log_coef;

                candidates[ds] = Candidate::new(frequency, weight);
            }

            let freq = candidates[ds].frequency;
            if freq < config.minimal_frequency || freq > config.maximal_frequency {
                candidates[ds] = Candidate::default();
            }
        }

        // Sort the scored region (the first `l` entries) by descending
        // score; any slop beyond `l` (only possible if nb_candidates > l)
        // stays zeroed and trails behind the sorted region.
        candidates[..l].sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        candidates.truncate(self.nb_candidates_per_step);
        candidates.resize(self.nb_candidates_per_step, Candidate::default());
        candidates
    }
}
