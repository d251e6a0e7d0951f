//! The Boersma unvoiced candidate generator: a single silence candidate
//! whose weight depends on how loud the current frame is relative to the
//! loudest frame seen so far in the stream.

use crate::algorithm::{AlgorithmDescriptor, StepContext};
use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;

/// Boersma unvoiced candidate generator (§4.3.2). Always contributes
/// exactly one candidate with `frequency == 0.0`.
pub struct BoersmaUnvoiced {
    frame_size: usize,
}

impl BoersmaUnvoiced {
    /// `frame_size` defaults to 2048 when 0 is passed.
    pub fn new(frame_size: usize) -> Self {
        Self { frame_size: if frame_size == 0 { 2048 } else { frame_size } }
    }
}

impl Default for BoersmaUnvoiced {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AlgorithmDescriptor for BoersmaUnvoiced {
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
        frame: &[f32],
    ) -> Vec<Candidate> {
        let local_peak = frame.iter().fold(0.0f32, |acc, &v| libm::fmaxf(acc, libm::fabsf(v)));

        let ratio = if ctx.global_absolute_peak > 0.0 { local_peak / ctx.global_absolute_peak } else { 0.0 };

        let denominator = config.silence_threshold / (1.0 + config.voicing_threshold);
        let excess = libm::fmaxf(0.0, 2.0 - ratio / denominator);
        let weight = config.voicing_threshold + excess;

        vec![Candidate::silence(weight)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let gen = BoersmaUnvoiced::default();
        assert_eq!(gen.frame_size(), 2048);
        assert_eq!(gen.nb_candidates_per_step(), 1);
    }

    #[test]
    fn silent_frame_against_loud_history_has_higher_weight_than_full_volume() {
        let config = PitchAnalyzerConfig::default();
        let mut gen = BoersmaUnvoiced::default();

        let silent_frame = vec![0.0f32; 2048];
        let loud_frame = vec![1.0f32; 2048];

        let mut ctx = StepContext { global_absolute_peak: 1.0, ..Default::default() };
        let silent_candidates = gen.generate_candidates(&mut ctx, &config, &silent_frame);
        let loud_candidates = gen.generate_candidates(&mut ctx, &config, &loud_frame);

        assert_eq!(silent_candidates.len(), 1);
        assert_eq!(silent_candidates[0].frequency, 0.0);
        assert!(silent_candidates[0].score > loud_candidates[0].score);
    }

    #[test]
    fn zero_global_peak_does_not_panic() {
        let config = PitchAnalyzerConfig::default();
        let mut gen = BoersmaUnvoiced::default();
        let frame = vec![0.0f32; 2048];
        let mut ctx = StepContext::default();
        let candidates = gen.generate_candidates(&mut ctx, &config, &frame);
        assert!(candidates[0].score.is_finite());
    }
}
