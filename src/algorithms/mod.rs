//! The three candidate generators specified: Boersma voiced, Boersma
//! unvoiced, and max-frequency.

pub mod boersma;
pub mod maxfreq;
pub mod unvoiced;

pub use boersma::BoersmaVoiced;
pub use maxfreq::MaxFrequency;
pub use unvoiced::BoersmaUnvoiced;
