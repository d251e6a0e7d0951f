//! Streaming monophonic pitch analyzer.
//!
//! A [`PitchAnalyzer`] consumes an audio stream a chunk at a time and
//! produces, for every `frame_time_step` seconds, a pitch estimate chosen
//! by running a Viterbi path search over the candidates contributed by its
//! registered generators ([`algorithms::BoersmaVoiced`],
//! [`algorithms::BoersmaUnvoiced`], [`algorithms::MaxFrequency`]). The
//! resulting frequency track can be smoothed with [`filters`] and turned
//! into discrete notes with [`midi`].

pub mod algorithm;
pub mod algorithms;
pub mod analyzer;
pub mod autocorrelation;
pub mod candidate;
pub mod config;
pub mod error;
pub mod fft;
pub mod filters;
pub mod midi;
pub mod viterbi;

pub use algorithm::{AlgorithmDescriptor, StepContext};
pub use analyzer::PitchAnalyzer;
pub use candidate::Candidate;
pub use config::PitchAnalyzerConfig;
pub use error::PitchError;
