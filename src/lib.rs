//! # AudioNest
//!
//! Hierarchical sound containers with name-based dispatch and a distance-based audibility
//! model for gameplay detection.
//!
//! Containers are attached to nodes of your scene graph and hold named sound entries. Playing
//! or stopping a sound by name searches the addressed container and, within configurable
//! limits, its child containers. Every play returns a [`VoiceKey`] that later stop operations
//! use. Audibility queries report how loud the playing sounds of a subtree are for a
//! listener, taking the loudest value rather than a sum.
//!
//! ## Quick Start
//!
//! ```no_run
//! use audionest::*;
//!
//! let mut scene = SceneTree::new();
//! let guard_node = scene.add_root();
//! let radio_node = scene.add_child(guard_node)?;
//!
//! let mut world = AudioNestWorld::new(AudioNestDesc::default());
//!
//! let footsteps = SoundEntryDesc::new("footsteps")
//!     .clip(AudioClip::from_path("footsteps.wav")?)
//!     .output(OutputRoute::new("sfx"));
//! let static_noise = SoundEntryDesc::new("static")
//!     .clip(AudioClip::with_length("static", 4.0))
//!     .output(OutputRoute::new("sfx"))
//!     .looping(true);
//!
//! let guard = world.add_container(guard_node, ContainerDesc::new("guard").entry(footsteps))?;
//! world.add_container(radio_node, ContainerDesc::new("radio").entry(static_noise))?;
//! world.initialize(&scene)?;
//!
//! // found in the radio, a direct child of the guard
//! let key = world.play(guard, "static").expect("static plays");
//!
//! // once per frame
//! world.update(1.0 / 60.0);
//! let loudness = world.audibility(guard, Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0));
//! println!("Guard loudness: {loudness}");
//!
//! world.stop(guard, "static", key);
//! for event in world.poll_events() {
//!     println!("{:?}", event);
//! }
//! # Ok::<(), AudioNestError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`AudioNestWorld`]**: Owns the hierarchy, the voice backend and the clock
//! - **[`ContainerDesc`]** / **[`SoundEntryDesc`]**: Construction parameters for containers and
//!   their entries
//! - **[`VoiceBackend`]**: Trait for the engine that actually renders voices;
//!   [`HeadlessBackend`] only keeps bookkeeping
//! - **[`SceneGraph`]**: Trait exposing your scene hierarchy during initialization
//! - **[`ResponseCurve`]**: Keyframed curve shaping detection loudness and 3D volume
//! - **[`AudioNestEvent`]**: Voice lifecycle notifications
//!
//! ## Name search
//!
//! A container always searches its own entries first, and a local match handles the
//! operation even when it fails. With the default [`SearchOptions`] the search then moves on
//! to the own entries of each direct child; [`SearchOptions::exhaustive`] searches the whole
//! subtree and [`SearchOptions::local_only`] stops at the container itself.

pub mod audibility;
pub mod audio_data;
pub mod backend;
pub mod config;
pub mod container;
pub mod curve;
pub mod entry;
pub mod error;
pub mod events;
pub mod keys;
pub mod math;
pub mod playback;
pub mod scene;
pub mod scheduler;
pub mod world;

pub use audio_data::AudioClip;
pub use backend::{HeadlessBackend, PlaybackStart, VoiceBackend, VoiceHandle};
pub use config::{AudioNestDesc, DetectionSettings, OutputRoute, Rolloff3D, SoundEntryDesc};
pub use container::{Container, ContainerDesc, ContainerId, ContainerTree, SearchOptions, Target};
pub use curve::{CurveKey, KeyShape, ResponseCurve};
pub use error::AudioNestError;
pub use events::{AudioNestEvent, DestroyReason};
pub use keys::{KeyGenerator, RandomKeys, SequentialKeys, VoiceKey};
pub use math::Vec3;
pub use playback::{Operation, Outcome, PlayRequest, StartMode, StopMode, VoiceState};
pub use scene::{NodeId, SceneGraph, SceneTree};
pub use world::AudioNestWorld;
