use glam::Vec3;

use crate::{
    assets::TextureStore,
    camera::Cursor,
    lighting::LightRig,
    particles::Particle,
    scene::{Disc, Tunnel},
    search::ResultsTable,
    Result,
};

/// Read-only view of everything a frame needs, handed to the sink once per
/// tick after all state for that tick has settled.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub frame: u64,
    pub particles: &'a [Particle],
    pub particle_size: f32,
    pub disc: &'a Disc,
    pub textures: &'a TextureStore,
    pub tunnel: &'a Tunnel,
    pub lights: &'a LightRig,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub clock_text: &'a str,
    pub cursor: Cursor,
    pub results: &'a ResultsTable,
}

/// Rendering backend. Errors are logged by the frame loop and never stop it.
pub trait FrameSink {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<()>;
}

/// Compact per-frame record kept by [`HeadlessRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub frame: u64,
    pub clock_text: String,
    pub disc_rotation: f32,
    pub disc_textured: bool,
    pub key_intensity: f32,
    pub lowest_particle: f32,
    pub cursor: Cursor,
}

impl FrameSummary {
    pub fn capture(frame: &FrameSnapshot<'_>) -> Self {
        Self {
            frame: frame.frame,
            clock_text: frame.clock_text.to_string(),
            disc_rotation: frame.disc.rotation_z(),
            disc_textured: frame.disc.texture().is_some(),
            key_intensity: frame.lights.directional.intensity,
            lowest_particle: frame
                .particles
                .iter()
                .map(|p| p.position.y)
                .fold(f32::INFINITY, f32::min),
            cursor: frame.cursor,
        }
    }
}

/// Sink without a display. Keeps the latest frame summary and logs one
/// every `log_every` frames.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames_drawn: u64,
    last: Option<FrameSummary>,
    log_every: u64,
}

impl HeadlessRenderer {
    pub fn new(log_every: u64) -> Self {
        Self {
            frames_drawn: 0,
            last: None,
            log_every,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn last(&self) -> Option<&FrameSummary> {
        self.last.as_ref()
    }
}

impl FrameSink for HeadlessRenderer {
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<()> {
        let summary = FrameSummary::capture(frame);
        if self.log_every > 0 && summary.frame % self.log_every == 0 {
            tracing::info!(
                frame = summary.frame,
                clock = %summary.clock_text,
                rotation = summary.disc_rotation,
                textured = summary.disc_textured,
                intensity = summary.key_intensity,
                rows = frame.results.rows().len(),
                "frame"
            );
        }
        self.frames_drawn += 1;
        self.last = Some(summary);
        Ok(())
    }
}
