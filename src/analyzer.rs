//! The streaming entry point: owns the sample buffer, the registered
//! candidate generators, the per-step candidate matrix, and the Viterbi
//! decoder that ties them together.

use crate::algorithm::{AlgorithmDescriptor, StepContext};
use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;
use crate::error::PitchError;
use crate::viterbi::Viterbi;

/// Streaming monophonic pitch analyzer.
///
/// Samples are pushed incrementally via [`PitchAnalyzer::add_samples`];
/// every time enough samples have accumulated to cut a full frame for
/// every registered generator, one step is run and appended to the
/// internal Viterbi decoder. [`PitchAnalyzer::compute_path`] reconstructs
/// the best candidate sequence found so far without needing to replay the
/// stream.
pub struct PitchAnalyzer {
    config: PitchAnalyzerConfig,
    generators: Vec<Box<dyn AlgorithmDescriptor>>,
    buffer: Vec<f32>,
    buffer_index: usize,
    candidate_matrix: Vec<Vec<Candidate>>,
    viterbi: Option<Viterbi>,
    global_absolute_peak: f32,
    peak_seeded: bool,
}

impl PitchAnalyzer {
    /// Build an analyzer with no generators registered yet. Register at
    /// least one with [`PitchAnalyzer::register_algorithm`] before calling
    /// [`PitchAnalyzer::add_samples`].
    pub fn new(config: PitchAnalyzerConfig) -> Self {
        let mut analyzer = Self {
            config,
            generators: Vec::new(),
            buffer: Vec::new(),
            buffer_index: 0,
            candidate_matrix: Vec::new(),
            viterbi: None,
            global_absolute_peak: 0.0,
            peak_seeded: false,
        };
        analyzer.reset();
        analyzer
    }

    /// Forget every sample and every step computed so far. Registered
    /// generators and the configuration are kept; generators may be
    /// (re-)registered again after this call.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.resize(self.config.zero_padding, 0.0);
        self.buffer_index = self.config.zero_padding;
        self.candidate_matrix.clear();
        self.viterbi = None;
        self.global_absolute_peak = 0.0;
        self.peak_seeded = false;
    }

    /// Register a candidate generator. Generators run in reverse of
    /// registration order within a step (the last one registered runs
    /// first), so a max-frequency generator that depends on a Boersma
    /// voiced generator's forward FFT must be registered *before* it.
    ///
    /// # Errors
    ///
    /// Returns [`PitchError::AlreadyStarted`] if at least one step has
    /// already been computed; the candidate row width is fixed at the
    /// first step and cannot change afterward. Call [`Self::reset`] first.
    pub fn register_algorithm(&mut self, generator: Box<dyn AlgorithmDescriptor>) -> Result<(), PitchError> {
        if self.viterbi.is_some() {
            return Err(PitchError::AlreadyStarted);
        }
        self.generators.push(generator);
        Ok(())
    }

    /// Total candidates contributed per step by all registered generators.
    pub fn nb_candidates_generated(&self) -> usize {
        self.generators.iter().map(|g| g.nb_candidates_per_step()).sum()
    }

    /// Number of steps computed so far.
    pub fn path_len(&self) -> usize {
        self.viterbi.as_ref().map_or(0, Viterbi::len)
    }

    /// Append `samples` to the stream and run every step that now has
    /// enough buffered data. Returns the number of steps run.
    pub fn add_samples(&mut self, samples: &[f32]) -> usize {
        if samples.is_empty() || self.generators.is_empty() {
            return 0;
        }

        let batch_peak = samples.iter().fold(0.0f32, |acc, &v| libm::fmaxf(acc, libm::fabsf(v)));
        if !self.peak_seeded {
            self.global_absolute_peak = self.config.initial_absolute_peak_coeff * batch_peak;
            self.peak_seeded = true;
        } else {
            self.global_absolute_peak = libm::fmaxf(self.global_absolute_peak, batch_peak);
        }

        self.buffer.extend_from_slice(samples);

        let k = self.nb_candidates_generated();
        let viterbi = self.viterbi.get_or_insert_with(|| Viterbi::new(k));

        let mut steps_run = 0;
        let frame_step = self.config.frame_step_size().max(1);

        loop {
            let frames: Result<Vec<&[f32]>, PitchError> = self
                .generators
                .iter()
                .map(|g| g.generate_frame(&self.buffer, self.buffer_index))
                .collect();
            let Ok(frames) = frames else {
                break;
            };

            let mut ctx = StepContext { global_absolute_peak: self.global_absolute_peak, ..Default::default() };
            let mut per_generator = vec![Vec::new(); self.generators.len()];
            for i in (0..self.generators.len()).rev() {
                per_generator[i] = self.generators[i].generate_candidates(&mut ctx, &self.config, frames[i]);
            }
            let row: Vec<Candidate> = per_generator.into_iter().flatten().collect();

            viterbi.push_step(&row, &self.config);
            self.candidate_matrix.push(row);

            self.buffer_index += frame_step;
            steps_run += 1;
        }

        steps_run
    }

    /// Reconstruct the lowest-cost candidate sequence found so far.
    ///
    /// # Errors
    ///
    /// Returns [`PitchError::EmptyResult`] if no step has completed yet.
    pub fn compute_path(&self) -> Result<Vec<Candidate>, PitchError> {
        let viterbi = self.viterbi.as_ref().ok_or(PitchError::EmptyResult)?;
        let indices = viterbi.compute_path()?;
        Ok(indices.iter().zip(self.candidate_matrix.iter()).map(|(&i, row)| row[i]).collect())
    }

    /// Convenience wrapper over [`Self::compute_path`] that extracts just
    /// the frequency track (`0.0` denoting silence), ready to be fed into
    /// [`crate::filters`] or [`crate::midi`].
    pub fn pitch_track(&self) -> Result<Vec<f32>, PitchError> {
        Ok(self.compute_path()?.into_iter().map(|c| c.frequency).collect())
    }
}
