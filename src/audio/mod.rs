pub mod decode;
pub mod hpss;
pub mod mel;
pub mod onset;
pub mod spectral;
pub mod stft;
