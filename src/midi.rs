//! Frequency/MIDI conversion, segment detection over a pitch track, and
//! note synthesis from the resulting segments.

use crate::error::PitchError;

/// A synthesized note: a MIDI number held over a contiguous run of steps.
/// `end_step` is exclusive. Silence notes (`midi_number == 0`) always carry
/// `velocity == 0`; every other note defaults to `0x40`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub midi_number: u8,
    pub velocity: u8,
    pub start_step: usize,
    pub end_step: usize,
}

impl Note {
    pub fn len(&self) -> usize {
        self.end_step - self.start_step
    }

    pub fn is_empty(&self) -> bool {
        self.start_step == self.end_step
    }
}

/// Convert a frequency in Hz to a (fractional) MIDI number, A4 = 69 = 440 Hz.
///
/// Callers must ensure `frequency > 0.0`; a non-positive frequency has no
/// MIDI representation and should be handled upstream as silence instead
/// (see [`pitch_to_midi_numbers`], which reserves `0.0` for that).
pub fn frequency_to_midi_number(frequency: f32) -> f32 {
    69.0 + 12.0 * libm::log2f(frequency / 440.0)
}

/// Convert a (fractional) MIDI number back to a frequency in Hz. Numbers
/// below `1.0` have no frequency representation and map to `0.0`, mirroring
/// [`pitch_to_midi_numbers`]'s silence sentinel.
pub fn midi_number_to_frequency(midi_number: f32) -> f32 {
    if midi_number < 1.0 {
        return 0.0;
    }
    440.0 * libm::powf(2.0, (midi_number - 69.0) / 12.0)
}

/// Signed distance of a MIDI number to the nearest integer semitone, in
/// semitones. Zero means exactly on-grid.
pub fn distance_to_grid(midi_number: f32) -> f32 {
    midi_number - libm::roundf(midi_number)
}

/// Convert a per-step frequency track to a per-step MIDI number track.
/// Frequencies below `1.0` Hz (silence, the convention used throughout this
/// crate) map to `0.0` rather than being passed through
/// [`frequency_to_midi_number`], which is undefined there.
pub fn pitch_to_midi_numbers(frequencies: &[f32]) -> Vec<f32> {
    frequencies.iter().map(|&f| if f < 1.0 { 0.0 } else { frequency_to_midi_number(f) }).collect()
}

/// The 3 most recent samples ending at (and including) `i`, clamped so the
/// window stays full-width both at the head of the track (it never reaches
/// before index 0) and the tail (the last couple of samples reuse the same
/// trailing window rather than shrinking it). Returns `(lo, hi)` with `hi`
/// exclusive.
fn window_range(i: usize, n: usize) -> (usize, usize) {
    if n <= 3 {
        return (0, n);
    }
    let mut lo = i.saturating_sub(2);
    if lo + 3 > n {
        lo = n - 3;
    }
    (lo, lo + 3)
}

/// Split a MIDI number track into maximal class runs. A class boundary is
/// introduced at sample `i` when the 3-sample trailing window ending at `i`
/// spans at least `1/2.5` semitones *and* the step from `i-1` to `i` is
/// more than the window spread divided by `1.5`. Returns `(start, end)`
/// pairs, `end` exclusive, covering the whole track with no gaps.
pub fn notes_segmentation_heuristic(midi_numbers: &[f32]) -> Vec<(usize, usize)> {
    let n = midi_numbers.len();
    let mut segments = Vec::new();
    if n == 0 {
        return segments;
    }

    let mut start = 0;
    for i in 1..n {
        let (lo, hi) = window_range(i, n);
        let window = &midi_numbers[lo..hi];
        let max = window.iter().cloned().fold(f32::MIN, f32::max);
        let min = window.iter().cloned().fold(f32::MAX, f32::min);
        let spread = max - min;

        let is_boundary = spread >= 1.0 / 2.5 && libm::fabsf(midi_numbers[i] - midi_numbers[i - 1]) > spread / 1.5;
        if is_boundary {
            segments.push((start, i));
            start = i;
        }
    }
    segments.push((start, n));
    segments
}

/// Turn one segment into a [`Note`] by majority vote: round every sample to
/// its nearest MIDI bucket (`0..=128`, 129 buckets) and keep the most common
/// one. Samples outside that range are logged and excluded from the vote; a
/// segment made up entirely of such samples yields no note.
fn note_from_segment(midi_numbers: &[f32], start: usize, end: usize) -> Option<Note> {
    let mut buckets = [0u32; 129];
    let mut any_valid = false;

    for &m in &midi_numbers[start..end] {
        let bucket = libm::roundf(m);
        if (0.0..=128.0).contains(&bucket) {
            buckets[bucket as usize] += 1;
            any_valid = true;
        } else {
            log::warn!("{} in segment [{start}, {end})", PitchError::OutOfRangeMidi(bucket));
        }
    }

    if !any_valid {
        return None;
    }

    // `max_by_key` keeps the *last* maximum on a tie; the source's
    // `fabs_argmax` keeps the first (lowest-index) bucket instead.
    let mut bucket = 0usize;
    let mut best_count = buckets[0];
    for (i, &count) in buckets.iter().enumerate().skip(1) {
        if count > best_count {
            best_count = count;
            bucket = i;
        }
    }
    let bucket = bucket as u8;
    let velocity = if bucket == 0 { 0 } else { 0x40 };
    Some(Note { midi_number: bucket, velocity, start_step: start, end_step: end })
}

/// Skip leading notes for as long as the *previous* one was shorter than
/// `minimal_note_length` (if every note is too short, this collapses down
/// to keeping just the last one, whatever its length — a single-note input
/// is never filtered, since there is nothing for it to be compared
/// against). Then walk forward: if the last kept note and the next note
/// share `(midi_number, velocity)`, overlap in time, and at least one of
/// them is shorter than 10 steps, extend the last kept note to cover both;
/// otherwise keep the next note only if it is at least `minimal_note_length`
/// steps long.
pub fn merge_overlapping_notes(notes: Vec<Note>, minimal_note_length: u32) -> Vec<Note> {
    const SHORT_NOTE_THRESHOLD: usize = 10;
    let min_len = minimal_note_length as usize;
    let length = notes.len();
    if length == 0 {
        return Vec::new();
    }

    let mut result: Vec<Note> = Vec::with_capacity(length);
    result.push(notes[0]);

    let mut i = 1usize;
    while i < length && notes[i - 1].len() < min_len {
        result[0] = notes[i];
        i += 1;
    }

    for &note in &notes[i..] {
        let last = result.last_mut().unwrap();
        let same_pitch = last.midi_number == note.midi_number && last.velocity == note.velocity;
        let overlaps = last.end_step >= note.start_step;
        let either_short = last.len() < SHORT_NOTE_THRESHOLD || note.len() < SHORT_NOTE_THRESHOLD;

        if same_pitch && overlaps && either_short {
            last.end_step = note.end_step;
        } else if note.len() >= min_len {
            result.push(note);
        }
    }
    result
}

/// End-to-end note synthesis from a per-step MIDI number track: segment,
/// synthesize one note per segment, then merge/filter by
/// `minimal_note_length`.
pub fn midi_numbers_to_notes(midi_numbers: &[f32], minimal_note_length: u32) -> Vec<Note> {
    let segments = notes_segmentation_heuristic(midi_numbers);
    let notes: Vec<Note> =
        segments.into_iter().filter_map(|(start, end)| note_from_segment(midi_numbers, start, end)).collect();
    merge_overlapping_notes(notes, minimal_note_length)
}
