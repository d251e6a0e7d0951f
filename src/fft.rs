//! Radix-2 complex FFT, a real-input FFT built on it, and window builders.
//!
//! `dfft` and `realft` only accept power-of-two sizes; callers are
//! responsible for that invariant, it is not checked here (matching the
//! original numerical-recipes-derived kernel this crate ports).

use std::sync::OnceLock;

use libm::{cos, sin};

const SINCOS_TAB_SIZE: usize = 256;

/// Table of `sin(2*pi / 2^i)` for `i` in `0..SINCOS_TAB_SIZE`, lazily
/// initialized once per process. The trigonometric recurrences in `dfft`
/// and `realft` only ever need a handful of the smallest angles, but the
/// source crate precomputes a generous table up front since callers only
/// ever request sizes up to a few thousand.
fn sin_table() -> &'static [f64; SINCOS_TAB_SIZE] {
    static TABLE: OnceLock<[f64; SINCOS_TAB_SIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let theta = 2.0 * std::f64::consts::PI;
        let mut table = [0.0; SINCOS_TAB_SIZE];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = sin(theta / 2f64.powi(i as i32));
        }
        table
    })
}

fn log2_usize(mut n: usize) -> u32 {
    let mut log = 0;
    while n > 1 {
        n >>= 1;
        log += 1;
    }
    log
}

/// Round `v` up to the next power of two. For all `v >= 2`,
/// `v <= next_power_of_two(v) < 2*v`.
pub fn next_power_of_two(v: u32) -> u32 {
    let mut v = v.wrapping_sub(1);
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}

/// Forward (`sign = 1`) or inverse (`sign = -1`) in-place radix-2
/// decimation-in-time FFT on `nn` complex numbers packed as interleaved
/// real/imaginary floats in `data[0..2*nn]`. `nn` must be a power of two.
/// The inverse transform is unnormalized: callers multiply by `nn`.
pub fn dfft(data: &mut [f32], nn: usize, sign: i32) {
    let sincos = sin_table();
    let n = nn << 1;

    // Bit-reversal permutation.
    let mut j = 1usize;
    let mut i = 1usize;
    while i < n {
        if j > i {
            data.swap(j - 1, i - 1);
            data.swap(j, i);
        }
        let mut m = nn;
        while m >= 2 && j > m {
            j -= m;
            m >>= 1;
        }
        j += m;
        i += 2;
    }

    // Danielson-Lanczos section.
    let mut mmax = 2usize;
    let mut theta_index = 1usize;
    while n > mmax {
        let istep = mmax << 1;
        let wtemp0 = sincos[theta_index + 1];
        let wpr = -2.0 * wtemp0 * wtemp0;
        let wpi = (sign as f64) * sincos[theta_index];
        let mut wr = 1.0f64;
        let mut wi = 0.0f64;

        let mut m = 1usize;
        while m < mmax {
            let mut i = m;
            while i <= n {
                let j = i + mmax;
                let tempr = (wr * data[j - 1] as f64 - wi * data[j] as f64) as f32;
                let tempi = (wr * data[j] as f64 + wi * data[j - 1] as f64) as f32;
                data[j - 1] = data[i - 1] - tempr;
                data[j] = data[i] - tempi;
                data[i - 1] += tempr;
                data[i] += tempi;
                i += istep;
            }
            let wtemp = wr;
            wr += wr * wpr - wi * wpi;
            wi += wi * wpr + wtemp * wpi;
            m += 2;
        }
        mmax = istep;
        theta_index += 1;
    }
}

/// In-place real FFT on `n` real samples (`n` a power of two, `n >= 4`).
/// Forward (`sign = 1`): output is packed as `data[0] = Re(X_0)`,
/// `data[1] = Re(X_{n/2})`, then interleaved `Re(X_k), Im(X_k)` for
/// `k = 1..n/2-1`. Inverse (`sign = -1`) reverses the packing; callers
/// multiply the inverse result by `2/n`.
pub fn realft(data: &mut [f32], n: usize, sign: i32) {
    let sincos = sin_table();
    let c1 = 0.5f64;
    let c2;
    let theta_index = log2_usize(n) as usize;
    let isign;

    if sign == 1 {
        c2 = -0.5;
        dfft(data, n >> 1, 1);
        isign = 1i32;
    } else {
        c2 = 0.5;
        isign = -1;
    }

    let wtemp0 = (isign as f64) * sincos[theta_index + 1];
    let wpr = -2.0 * wtemp0 * wtemp0;
    let wpi = (isign as f64) * sincos[theta_index];
    let mut wr = 1.0 + wpr;
    let mut wi = wpi;
    let np1 = n + 1;

    for i in 1..(n >> 2) {
        let i1 = i + i;
        let i2 = 1 + i1;
        let i3 = np1 - i2;
        let i4 = 1 + i3;

        let h1r = c1 * (data[i1] as f64 + data[i3] as f64);
        let h1i = c1 * (data[i2] as f64 - data[i4] as f64);
        let h2r = -c2 * (data[i2] as f64 + data[i4] as f64);
        let h2i = c2 * (data[i1] as f64 - data[i3] as f64);

        data[i1] = (h1r + wr * h2r - wi * h2i) as f32;
        data[i2] = (h1i + wr * h2i + wi * h2r) as f32;
        data[i3] = (h1r - wr * h2r + wi * h2i) as f32;
        data[i4] = (-h1i + wr * h2i + wi * h2r) as f32;

        let wtemp = wr;
        wr = wtemp * wpr - wi * wpi + wr;
        wi = wi * wpr + wtemp * wpi + wi;
    }

    if sign == 1 {
        let h1r = data[0];
        data[0] = h1r + data[1];
        data[1] = h1r - data[1];
    } else {
        let h1r = data[0];
        data[0] = (c1 * (h1r as f64 + data[1] as f64)) as f32;
        data[1] = (c1 * (h1r as f64 - data[1] as f64)) as f32;
        dfft(data, n >> 1, -1);
    }
}

/// Fill `window` with a Hann window of length `window.len()`. Zero at both
/// endpoints, unit peak.
pub fn hann(window: &mut [f32]) {
    let n = window.len();
    for (i, slot) in window.iter_mut().enumerate() {
        let v = sin(std::f64::consts::PI * i as f64 / (n - 1) as f64);
        *slot = (v * v) as f32;
    }
}

/// Fill `window` with a Hamming window of length `window.len()`. About
/// 0.077 at both endpoints, unit peak.
pub fn hamming(window: &mut [f32]) {
    let n = window.len();
    const A0: f64 = 0.53836;
    const A1: f64 = 0.46164;
    for (i, slot) in window.iter_mut().enumerate() {
        *slot = (A0 - A1 * cos(2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64)) as f32;
    }
}

/// 9-term minimum-sidelobe Blackman-Harris coefficients.
const BLACKMAN_HARRIS_COEFFS: [f64; 9] = [
    2.384_331_152_777_942e-1,
    4.005_545_348_643_820e-1,
    2.358_242_530_472_107e-1,
    9.527_918_858_383_112e-2,
    2.537_395_516_617_152e-2,
    4.152_432_907_505_835e-3,
    3.685_604_163_298_180e-4,
    1.384_355_593_917_030e-5,
    1.161_808_358_932_861e-7,
];

/// Fill `window` with a 9-term Blackman-Harris window of length
/// `window.len()`. Zero at both endpoints, unit peak.
pub fn blackman_harris(window: &mut [f32]) {
    let n = window.len();
    for (i, slot) in window.iter_mut().enumerate() {
        let mut value = 0.0f64;
        for (index, &an) in BLACKMAN_HARRIS_COEFFS.iter().enumerate() {
            let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
            value += sign * an * cos(2.0 * index as f64 * std::f64::consts::PI * i as f64 / (n - 1) as f64);
        }
        *slot = value as f32;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn next_power_of_two_matches_spec_examples() {
        assert_eq!(next_power_of_two(31), 32);
        assert_eq!(next_power_of_two(27), 32);
        assert_eq!(next_power_of_two(12), 16);
        assert_eq!(next_power_of_two(300), 512);
    }

    #[test]
    fn next_power_of_two_bounds() {
        for n in 2u32..2000 {
            let p = next_power_of_two(n);
            assert!(p.is_power_of_two());
            assert!(n <= p && p < 2 * n);
        }
    }

    #[test]
    fn dfft_roundtrip_identity() {
        let nn = 64usize;
        let mut data = vec![0.0f32; 2 * nn];
        for (i, v) in data.iter_mut().enumerate() {
            *v = (i as f32 * 0.37).sin();
        }
        let original = data.clone();

        dfft(&mut data, nn, -1);
        dfft(&mut data, nn, 1);

        for (a, b) in data.iter().zip(original.iter()) {
            assert_relative_eq!(*a, b * nn as f32, epsilon = 1e-1);
        }
    }

    #[test]
    fn dfft_zero_in_zero_out() {
        let nn = 32usize;
        let mut data = vec![0.0f32; 2 * nn];
        dfft(&mut data, nn, 1);
        assert!(data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn realft_roundtrip_identity() {
        let n = 128usize;
        let mut data = vec![0.0f32; n];
        for (i, v) in data.iter_mut().enumerate() {
            *v = (i as f32 * 0.21).cos();
        }
        let original = data.clone();

        realft(&mut data, n, 1);
        realft(&mut data, n, -1);

        for (a, b) in data.iter().zip(original.iter()) {
            assert_relative_eq!(a * (2.0 / n as f32), *b, epsilon = 1e-1);
        }
    }

    #[test]
    fn realft_zero_in_zero_out() {
        let n = 64usize;
        let mut data = vec![0.0f32; n];
        realft(&mut data, n, 1);
        assert!(data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn hann_window_shape() {
        let mut w = vec![0.0f32; 32];
        hann(&mut w);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(w[w.len() - 1], 0.0, epsilon = 1e-6);
        assert!(w.iter().all(|&v| v >= -1e-6));
        let peak = w.iter().cloned().fold(0.0f32, f32::max);
        assert_relative_eq!(peak, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn hamming_window_shape() {
        let mut w = vec![0.0f32; 32];
        hamming(&mut w);
        assert!(w[0] > 0.07 && w[0] < 0.08);
        assert!(w.iter().all(|&v| v >= -1e-6));
        let peak = w.iter().cloned().fold(0.0f32, f32::max);
        assert_relative_eq!(peak, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn blackman_harris_window_shape() {
        let mut w = vec![0.0f32; 32];
        blackman_harris(&mut w);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-3);
        assert_relative_eq!(w[w.len() - 1], 0.0, epsilon = 1e-3);
        assert!(w.iter().all(|&v| v >= -1e-3));
        let peak = w.iter().cloned().fold(0.0f32, f32::max);
        assert_relative_eq!(peak, 1.0, epsilon = 1e-2);
    }
}
