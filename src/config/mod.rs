//! Configuration for AudioNest

mod entry_desc;
mod world_desc;

pub use entry_desc::{DetectionSettings, OutputRoute, Rolloff3D, SoundEntryDesc};
pub use world_desc::AudioNestDesc;
