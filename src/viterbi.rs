//! Viterbi path search over the per-step candidate rows: a forward dynamic
//! program with back-pointer reconstruction.

use crate::algorithm::boersma_transition_cost;
use crate::candidate::Candidate;
use crate::config::PitchAnalyzerConfig;
use crate::error::PitchError;

/// Incremental Viterbi decoder over a fixed candidate-row width `k`. Steps
/// are fed one at a time via [`Viterbi::push_step`]; [`Viterbi::compute_path`]
/// reconstructs the lowest-cost path seen so far without needing to re-run
/// the forward pass.
///
/// Cost is the negative of a candidate's score plus the Boersma transition
/// cost between consecutive steps' chosen candidates, so minimizing cost
/// maximizes total weight.
pub struct Viterbi {
    k: usize,
    steps: usize,
    prev_costs: Vec<f32>,
    prev_candidates: Vec<Candidate>,
    back_pointers: Vec<Vec<usize>>,
    scratch_costs: Vec<f32>,
    scratch_back: Vec<usize>,
}

impl Viterbi {
    /// `k` is the fixed number of candidates per step (set once by the
    /// analyzer's first registered generator row width).
    pub fn new(k: usize) -> Self {
        Self {
            k,
            steps: 0,
            prev_costs: Vec::with_capacity(k),
            prev_candidates: Vec::with_capacity(k),
            back_pointers: Vec::new(),
            scratch_costs: vec![0.0; k],
            scratch_back: vec![0; k],
        }
    }

    /// Forget every step pushed so far; `k` is unchanged.
    pub fn reset(&mut self) {
        self.steps = 0;
        self.prev_costs.clear();
        self.prev_candidates.clear();
        self.back_pointers.clear();
    }

    /// Number of steps pushed so far.
    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Extend the decoder by one step using the default Boersma transition
    /// cost ([`boersma_transition_cost`]). `candidates` must have exactly
    /// `k` entries, in the same generator order used by every other step.
    pub fn push_step(&mut self, candidates: &[Candidate], config: &PitchAnalyzerConfig) {
        self.push_step_with(candidates, |first, second| boersma_transition_cost(config, first, second));
    }

    /// Extend the decoder by one step using an arbitrary transition-cost
    /// function between a source candidate (at the previous step) and a
    /// destination candidate (at this step). Spec.md's DP recurrence
    /// (§4.5) is stated in terms of any transition cost, with Boersma's
    /// formula named as the default; this is the generic entry point
    /// [`push_step`](Self::push_step) specializes.
    pub fn push_step_with<F>(&mut self, candidates: &[Candidate], transition_cost: F)
    where
        F: Fn(&Candidate, &Candidate) -> f32,
    {
        debug_assert_eq!(candidates.len(), self.k);

        if self.steps == 0 {
            self.prev_costs.clear();
            self.prev_costs.extend(candidates.iter().map(|c| -c.score));
            self.prev_candidates.clear();
            self.prev_candidates.extend_from_slice(candidates);
            // Identity back-pointers per spec.md §4.4: never read during
            // reconstruction (the walk-back starts at step 1), kept for
            // the invariant `path_indexes[0][k] == k`.
            self.back_pointers.push((0..self.k).collect());
            self.steps = 1;
            return;
        }

        for j in 0..self.k {
            let mut best_cost = f32::INFINITY;
            let mut best_i = 0usize;
            for i in 0..self.k {
                let transition = transition_cost(&self.prev_candidates[i], &candidates[j]);
                let cost = self.prev_costs[i] + transition;
                // Strict `<` keeps the first (lowest-index) minimum on ties.
                if cost < best_cost {
                    best_cost = cost;
                    best_i = i;
                }
            }
            self.scratch_costs[j] = best_cost - candidates[j].score;
            self.scratch_back[j] = best_i;
        }

        self.back_pointers.push(self.scratch_back.clone());
        self.prev_costs.copy_from_slice(&self.scratch_costs);
        self.prev_candidates.clear();
        self.prev_candidates.extend_from_slice(candidates);
        self.steps += 1;
    }

    /// Running best cost per candidate at the most recent step pushed.
    pub fn path_costs(&self) -> &[f32] {
        &self.prev_costs
    }

    /// Back-pointers recorded for `step` (`path_indexes[step]` in spec.md's
    /// terms): one source candidate index per destination candidate.
    pub fn back_pointers_at(&self, step: usize) -> &[usize] {
        &self.back_pointers[step]
    }

    /// Reconstruct the lowest-cost path: one candidate index per step, from
    /// the first step pushed to the most recent.
    ///
    /// # Errors
    ///
    /// Returns [`PitchError::EmptyResult`] if no step has been pushed yet.
    pub fn compute_path(&self) -> Result<Vec<usize>, PitchError> {
        if self.steps == 0 {
            return Err(PitchError::EmptyResult);
        }

        let mut best_j = 0usize;
        let mut best_cost = self.prev_costs[0];
        for (j, &cost) in self.prev_costs.iter().enumerate().skip(1) {
            if cost < best_cost {
                best_cost = cost;
                best_j = j;
            }
        }

        let mut path = vec![0usize; self.steps];
        path[self.steps - 1] = best_j;
        for t in (1..self.steps).rev() {
            best_j = self.back_pointers[t][best_j];
            path[t - 1] = best_j;
        }
        Ok(path)
    }
}
