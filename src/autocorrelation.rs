//! Power-spectrum-based autocorrelation, including the window-corrected
//! variant used by the Boersma voiced candidate generator.

use crate::error::PitchError;
use crate::fft::{next_power_of_two, realft};

/// Unnormalized autocorrelation of `frame`, with an optional copy of the
/// padded forward FFT retained for downstream consumers (the max-frequency
/// estimator reads this). Returns the first half of the symmetric
/// autocorrelation (length `next_power_of_two(2*frame.len()) / 2`).
pub fn autocorrelation_unnormalized(frame: &[f32], retain_fft: Option<&mut Vec<f32>>) -> Vec<f32> {
    compute_autocorrelation(frame, false, retain_fft)
}

/// Same as [`autocorrelation_unnormalized`] but normalized by `2/M` where
/// `M` is the padded FFT size.
pub fn autocorrelation_normalized(frame: &[f32]) -> Vec<f32> {
    compute_autocorrelation(frame, true, None)
}

fn compute_autocorrelation(frame: &[f32], normalize: bool, retain_fft: Option<&mut Vec<f32>>) -> Vec<f32> {
    let size_in = frame.len();
    let ac_length = next_power_of_two((size_in * 2) as u32) as usize;

    let mut buf = vec![0.0f32; ac_length];
    buf[..size_in].copy_from_slice(frame);

    realft(&mut buf, ac_length, 1);

    if let Some(out) = retain_fft {
        out.clear();
        out.extend_from_slice(&buf);
    }

    // Power spectrum: square each complex bin's magnitude in place.
    buf[0] *= buf[0];
    buf[1] *= buf[1];
    let mut i = 2;
    while i < ac_length {
        let x = buf[i];
        let y = buf[i + 1];
        buf[i] = x * x + y * y;
        buf[i + 1] = 0.0;
        i += 2;
    }

    realft(&mut buf, ac_length, -1);

    if normalize {
        let normalizer = 2.0 / ac_length as f32;
        for v in buf.iter_mut() {
            *v *= normalizer;
        }
    }

    buf.truncate(ac_length / 2);
    buf
}

/// Window-corrected autocorrelation of `frame` against `window` (same
/// length). `window_ac` is an in/out cache slot: on first call it is
/// computed and stored back through `*window_ac`; later calls with the same
/// `Some` slot reuse the cached autocorrelation of the window instead of
/// recomputing it. Returns the corrected autocorrelation (length
/// `next_power_of_two(2*N) / 4`) and, if `retain_fft` is supplied, the
/// padded forward FFT of the mean-subtracted, windowed frame.
///
/// # Errors
///
/// Returns [`PitchError::DegenerateWindow`] if the window's autocorrelation
/// at lag 0 is zero, which would otherwise produce a division by zero.
pub fn corrected_autocorrelation(
    frame: &[f32],
    window: &[f32],
    window_ac: &mut Option<Vec<f32>>,
    retain_fft: Option<&mut Vec<f32>>,
) -> Result<Vec<f32>, PitchError> {
    let size_in = frame.len();
    let mean = frame.iter().sum::<f32>() / size_in as f32;

    let adjusted: Vec<f32> = frame
        .iter()
        .zip(window.iter())
        .map(|(&x, &w)| (x - mean) * w)
        .collect();

    let mut ac_y = autocorrelation_unnormalized(&adjusted, retain_fft);

    let ac_w_ptr: &Vec<f32> = match window_ac {
        Some(cached) => cached,
        None => {
            *window_ac = Some(autocorrelation_unnormalized(window, None));
            window_ac.as_ref().unwrap()
        }
    };

    if ac_w_ptr[0] == 0.0 {
        return Err(PitchError::DegenerateWindow);
    }

    // The corrected autocorrelation is only reliable over the first
    // quarter of the raw unnormalized output.
    let size_out = ac_y.len() / 2;
    ac_y.truncate(size_out);
    for (y, w) in ac_y.iter_mut().zip(ac_w_ptr.iter()) {
        *y /= *w;
    }

    Ok(ac_y)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn zero_frame_yields_zero_autocorrelation() {
        let frame = vec![0.0f32; 64];
        let ac = autocorrelation_normalized(&frame);
        assert!(ac.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn dirac_autocorrelation_is_dirac() {
        let mut frame = vec![0.0f32; 16];
        frame[0] = 1.0;
        let ac = autocorrelation_normalized(&frame);
        assert_relative_eq!(ac[0], 1.0, epsilon = 1e-2);
        for &v in &ac[1..] {
            assert!(v.abs() < 5e-2);
        }
    }

    #[test]
    fn dirac_corrected_autocorrelation_with_rectangular_window() {
        let mut frame = vec![0.0f32; 16];
        frame[0] = 1.0;
        let window = vec![1.0f32; 16];
        let mut window_ac = None;
        let ac = corrected_autocorrelation(&frame, &window, &mut window_ac, None).unwrap();
        assert!(ac[0].abs() > 0.0);
        assert!(window_ac.is_some());
    }

    #[test]
    fn degenerate_window_is_rejected() {
        let frame = vec![0.5f32; 16];
        let window = vec![0.0f32; 16];
        let mut window_ac = None;
        let err = corrected_autocorrelation(&frame, &window, &mut window_ac, None).unwrap_err();
        assert_eq!(err, PitchError::DegenerateWindow);
    }

    #[test]
    fn window_ac_cache_is_reused() {
        let frame = vec![0.3f32; 32];
        let mut window = vec![0.0f32; 32];
        crate::fft::hann(&mut window);
        let mut window_ac = None;
        let first = corrected_autocorrelation(&frame, &window, &mut window_ac, None).unwrap();
        let cached = window_ac.clone();
        let second = corrected_autocorrelation(&frame, &window, &mut window_ac, None).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(cached, window_ac);
    }
}
