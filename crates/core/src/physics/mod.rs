//! Apparatus physics: finite differences and wall-forcing profiles

pub mod derivative;
pub mod volume_profile;

pub use derivative::{first_derivative, interp, second_derivative};
pub use volume_profile::{
    PressureRiseProfile, VolumeForcing, VolumeProfile, PROFILE_SAMPLE_FREQ_HZ,
};
