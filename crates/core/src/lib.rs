//! Core library for the Vinyl Visualiser.
//!
//! Each module owns one subsystem of the animation loop: the falling particle
//! field, the time-of-day lighting, the disc and its cover art, audio playback
//! state, and debounced catalogue search. [`Visualiser`] ties them together
//! and runs one frame per [`tick`](Visualiser::tick).

pub mod assets;
pub mod audio;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod lighting;
pub mod particles;
pub mod render;
pub mod scene;
pub mod search;
pub mod timeline;

pub use assets::{
    AlbumArtLoader, CoverImage, CoverLoader, CoverOutcome, CoverRequestId, HttpCoverLoader,
    TextureHandle, TextureStore,
};
pub use audio::{
    AudioBackend, AudioHandle, AudioId, AudioSignal, AudioSignalKind, PlayOutcome,
    PlaybackController, PlaybackState,
};
pub use camera::{Cursor, OrbitControls, Ray};
pub use config::{AppConfig, SearchConfig};
pub use error::{Result, VisualiserError};
pub use events::{AppEvent, EventBus, EventSender};
pub use frame::{FrameInput, FrameReport, Visualiser};
pub use lighting::{color_for_hour, intensity_for_hour, Color, LightRig, Lighting};
pub use particles::{Particle, ParticleField};
pub use render::{FrameSink, FrameSnapshot, FrameSummary, HeadlessRenderer};
pub use scene::{Disc, DiscTint, SurfaceRelief, Tunnel};
pub use search::{
    HighlightTint, HttpSearchClient, ResultsTable, RowHighlight, SearchClient, SearchResultRow,
    SearchSession, TableMessage,
};
pub use timeline::{resolve_hour, Debouncer, TimeState};
