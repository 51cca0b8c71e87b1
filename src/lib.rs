//! Real-time playback of precomputed ASCII video frames.
//!
//! A [`FrameStore`](frame_store::FrameStore) produced by the conversion
//! service is loaded into a [`PlaybackController`](controller::PlaybackController),
//! which is driven by an injectable [`Clock`](clock::Clock) and hands each
//! newly reached frame to the stateless [`AsciiRenderer`](ascii_render::AsciiRenderer).

pub mod ascii_frame;
pub mod ascii_render;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod error_codes;
pub mod frame_store;
pub mod logging;
pub mod play;
pub mod schema;

pub use ascii_frame::{AsciiFrame, Cell, FrameContent, Glyph};
pub use ascii_render::AsciiRenderer;
pub use clock::{Clock, ClockGeneration, ManualClock, RefreshClock, Tick};
pub use controller::{
    PlaybackController, PlaybackSnapshot, PlaybackState, PlaybackStatus, TickOutcome,
};
pub use error::{ConfigurationError, PlaybackError, PlaybackResult};
pub use frame_store::{load_frame_store, FrameStore};
pub use schema::{VideoAsciiResponse, VideoMetadata};
