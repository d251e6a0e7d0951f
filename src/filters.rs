//! Post-processing filters over a computed pitch track. Both filters
//! preserve silence (`frequency == 0.0` passes through unchanged), but
//! otherwise disagree on what a "window" sees: the median filter sorts the
//! raw window including any zeros in it, while the mean filter excludes
//! zeros (and out-of-range neighbors) from the average entirely.

/// Smooth `frequencies` with a sliding median of window size `window`
/// (odd or even). Samples too close to either edge to fill a full window
/// are copied verbatim. Interior samples are the middle element of the
/// sorted window (odd `window`) or the average of the two middle elements
/// (even `window`); if the center sample is silence (`0.0`) the output is
/// forced to `0.0` regardless of what the window's median would be.
pub fn median_filter(frequencies: &[f32], window: usize) -> Vec<f32> {
    let n = frequencies.len();
    let half_lo = window / 2;
    let half_hi = window - half_lo;

    frequencies
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            if i < half_lo || i + half_hi >= n {
                return f;
            }
            if f == 0.0 {
                return 0.0;
            }
            let mut sorted: Vec<f32> = frequencies[i - half_lo..i + half_hi].to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            if window % 2 == 1 {
                sorted[sorted.len() / 2]
            } else {
                let mid = sorted.len() / 2;
                (sorted[mid - 1] + sorted[mid]) / 2.0
            }
        })
        .collect()
}

/// Smooth `frequencies` with a sliding mean of the given `window` size,
/// averaging only the in-range, non-zero neighbors. Silence (`0.0`) passes
/// through unchanged and does not contribute to the windows of its
/// neighbors.
pub fn mean_filter(frequencies: &[f32], window: usize) -> Vec<f32> {
    let half = window / 2;
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            if f == 0.0 {
                return 0.0;
            }
            let lo = i.saturating_sub(half);
            let hi = (i + (window - half)).min(frequencies.len());
            let voiced: Vec<f32> = frequencies[lo..hi].iter().copied().filter(|&v| v != 0.0).collect();
            if voiced.is_empty() {
                f
            } else {
                voiced.iter().sum::<f32>() / voiced.len() as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_filter_preserves_silence() {
        let track = vec![0.0, 100.0, 101.0, 0.0, 200.0];
        let filtered = median_filter(&track, 3);
        assert_eq!(filtered[0], 0.0);
        assert_eq!(filtered[3], 0.0);
    }

    #[test]
    fn median_filter_removes_a_single_sample_spike() {
        let track = vec![100.0, 100.0, 500.0, 100.0, 100.0];
        let filtered = median_filter(&track, 3);
        assert_eq!(filtered[2], 100.0);
    }

    #[test]
    fn median_filter_matches_the_worked_example() {
        let track = vec![9.0, 2.0, 2.0, 8.0, 2.0, 1.0, 2.0, 2.0, 2.0, 2.0, 0.0, 2.0, 9.0];
        let filtered = median_filter(&track, 3);
        let expected = vec![9.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 2.0, 9.0];
        assert_eq!(filtered, expected);
    }

    #[test]
    fn mean_filter_smooths_within_a_voiced_run() {
        let track = vec![100.0, 110.0, 90.0];
        let filtered = mean_filter(&track, 3);
        assert!((filtered[1] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn mean_filter_does_not_blend_across_silence() {
        let track = vec![100.0, 0.0, 300.0];
        let filtered = mean_filter(&track, 3);
        assert_eq!(filtered[0], 100.0);
        assert_eq!(filtered[2], 300.0);
        assert_eq!(filtered[1], 0.0);
    }

    #[test]
    fn mean_filter_even_window_is_not_one_sample_too_wide() {
        // W=4 at i=2 must average exactly the 4 samples [0,4), not 5.
        let track = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let filtered = mean_filter(&track, 4);
        assert!((filtered[2] - 2.5).abs() < 1e-6, "got {}", filtered[2]);
    }

    #[test]
    fn mean_filter_matches_the_worked_example() {
        let track = vec![2.0, 4.0, 4.0, 4.0, 0.0];
        let filtered = mean_filter(&track, 3);
        let expected = vec![3.0, 10.0 / 3.0, 4.0, 4.0, 0.0];
        for (a, b) in filtered.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let empty: Vec<f32> = Vec::new();
        assert_eq!(median_filter(&empty, 3), Vec::<f32>::new());
        assert_eq!(mean_filter(&empty, 3), Vec::<f32>::new());
    }
}
