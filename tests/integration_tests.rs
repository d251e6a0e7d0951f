//! End-to-end scenarios exercising the public API: streaming a generated
//! signal through a wired-up [`PitchAnalyzer`] and checking the resulting
//! pitch track or note sequence.

use v2p::algorithms::{BoersmaUnvoiced, BoersmaVoiced, MaxFrequency};
use v2p::config::PitchAnalyzerConfig;
use v2p::midi::{midi_numbers_to_notes, pitch_to_midi_numbers};
use v2p::PitchAnalyzer;

fn sine_wave(freq: f32, sampling_rate: f32, n: usize) -> Vec<f32> {
    (0..n).map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sampling_rate).sin()).collect()
}

fn stream_in_chunks(analyzer: &mut PitchAnalyzer, samples: &[f32], chunk: usize) {
    for block in samples.chunks(chunk) {
        analyzer.add_samples(block);
    }
}

/// S1: a pure 150 Hz sinusoid with Boersma voiced + unvoiced registered
/// (no zero padding) should track close to 150 Hz at every step.
#[test]
fn s1_pure_sinusoid_tracks_its_frequency() {
    let config = PitchAnalyzerConfig { zero_padding: 0, ..Default::default() };
    let mut analyzer = PitchAnalyzer::new(config);
    analyzer.register_algorithm(Box::new(BoersmaUnvoiced::default())).unwrap();
    analyzer.register_algorithm(Box::new(BoersmaVoiced::default())).unwrap();

    let freq = 150.0f32;
    let samples = sine_wave(freq, config.sampling_rate, 2 * config.sampling_rate as usize);
    stream_in_chunks(&mut analyzer, &samples, 480);

    let path = analyzer.pitch_track().unwrap();
    assert!(path.len() > 100);

    let on_target = path.iter().filter(|&&f| (f - freq).abs() < 5.0).count();
    assert!(
        on_target as f32 / path.len() as f32 > 0.8,
        "expected most steps within 5 Hz of {freq}, got {on_target}/{}",
        path.len()
    );
}

/// S2: a single 2048-sample frame of a 1200 Hz sinusoid, with a Boersma
/// voiced generator run first to populate the shared FFT artifact, should
/// let the max-frequency generator find a candidate within 10 Hz of 1200.
#[test]
fn s2_max_frequency_finds_a_high_sinusoid() {
    use v2p::algorithm::{AlgorithmDescriptor, StepContext};

    let config = PitchAnalyzerConfig::default();
    let frame = sine_wave(1200.0, config.sampling_rate, 2048);

    let mut boersma = BoersmaVoiced::new(2048, 3);
    let mut ctx = StepContext::default();
    boersma.generate_candidates(&mut ctx, &config, &frame);
    assert!(ctx.last_fft.is_some(), "boersma voiced must populate the shared FFT artifact");

    let mut maxfreq = MaxFrequency::new(2048);
    let candidates = maxfreq.generate_candidates(&mut ctx, &config, &frame);

    assert_eq!(candidates.len(), 1);
    assert!((candidates[0].frequency - 1200.0).abs() < 10.0, "got {}", candidates[0].frequency);
    assert!(candidates[0].score > 0.0);
}

/// S7: a signal partitioned into `S` constant-frequency runs, each long
/// enough to clear the minimal note length and separated by at least a
/// semitone, synthesizes exactly `S` notes.
#[test]
fn s7_one_note_per_constant_frequency_run() {
    let run_frequencies = [220.0f32, 330.0, 196.0, 440.0, 261.6];
    let steps_per_run = 80;

    let mut midi_track = Vec::new();
    for &freq in &run_frequencies {
        let midi_number = 69.0 + 12.0 * (freq / 440.0).log2();
        midi_track.extend(std::iter::repeat(midi_number).take(steps_per_run));
    }

    let notes = midi_numbers_to_notes(&midi_track, 6);
    assert_eq!(notes.len(), run_frequencies.len());
}

/// A full streaming run through a silent-then-voiced-then-silent signal
/// should synthesize a single voiced note bracketed by silence, exercising
/// the analyzer, the pitch track, and MIDI conversion together.
#[test]
fn streaming_then_segmenting_yields_a_bracketed_note() {
    let config = PitchAnalyzerConfig::default();
    let mut analyzer = PitchAnalyzer::new(config);
    analyzer.register_algorithm(Box::new(BoersmaUnvoiced::default())).unwrap();
    analyzer.register_algorithm(Box::new(BoersmaVoiced::default())).unwrap();

    let silence = vec![0.0f32; config.sampling_rate as usize / 2];
    let voiced = sine_wave(330.0, config.sampling_rate, config.sampling_rate as usize);

    let mut samples = silence.clone();
    samples.extend(&voiced);
    samples.extend(&silence);

    stream_in_chunks(&mut analyzer, &samples, 480);

    let path = analyzer.pitch_track().unwrap();
    let midi = pitch_to_midi_numbers(&path);
    let notes = midi_numbers_to_notes(&midi, config.minimal_note_length);

    assert!(notes.iter().any(|n| n.midi_number != 0), "expected at least one voiced note");
}
