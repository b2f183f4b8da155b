//! The frame loop.
//!
//! [`Visualiser`] owns every subsystem and its external collaborators. Input
//! and background completions reach it only through the [`EventBus`]; each
//! [`tick`](Visualiser::tick) drains the bus, then runs the frame steps in a
//! fixed order and hands the result to the sink.

use std::time::Duration;

use chrono::NaiveTime;

use crate::{
    assets::{AlbumArtLoader, CoverLoader, CoverOutcome, TextureStore},
    audio::{AudioBackend, PlayOutcome, PlaybackController, PlaybackState},
    camera::{Cursor, OrbitControls},
    config::AppConfig,
    events::{AppEvent, EventBus, EventSender},
    lighting::Lighting,
    particles::ParticleField,
    render::{FrameSink, FrameSnapshot},
    scene::{Disc, Tunnel},
    search::{ResultsTable, SearchClient, SearchSession},
    timeline::TimeState,
    Result, VisualiserError,
};

/// Per-tick input snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Monotonic time since the loop started.
    pub elapsed: Duration,
    /// Local wall-clock time of day.
    pub wall_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub hour: u8,
    pub lighting_updated: bool,
    pub rendered: bool,
}

pub struct Visualiser<A, L, S, F> {
    bus: EventBus,
    time: TimeState,
    lighting: Lighting,
    particles: ParticleField,
    tunnel: Tunnel,
    disc: Disc,
    textures: TextureStore,
    playback: PlaybackController,
    covers: AlbumArtLoader,
    search: SearchSession,
    controls: OrbitControls,
    cursor: Cursor,
    clock_text: String,
    frame: u64,
    audio: A,
    cover_loader: L,
    search_client: S,
    sink: F,
}

impl<A, L, S, F> Visualiser<A, L, S, F>
where
    A: AudioBackend,
    L: CoverLoader,
    S: SearchClient,
    F: FrameSink,
{
    /// Builds the scene from `config`. Collaborators that post completions
    /// should have been created with a sender from `bus`.
    pub fn new(
        config: &AppConfig,
        bus: EventBus,
        audio: A,
        cover_loader: L,
        search_client: S,
        sink: F,
    ) -> Result<Self> {
        Self::with_particles(
            config,
            ParticleField::new(&config.scene.particles),
            bus,
            audio,
            cover_loader,
            search_client,
            sink,
        )
    }

    /// Same as [`new`](Self::new) with a caller-provided particle field, e.g. a
    /// seeded one.
    pub fn with_particles(
        config: &AppConfig,
        particles: ParticleField,
        bus: EventBus,
        audio: A,
        cover_loader: L,
        search_client: S,
        sink: F,
    ) -> Result<Self> {
        config.validate()?;
        let scene = &config.scene;
        Ok(Self {
            bus,
            time: TimeState::new(),
            lighting: Lighting::new(),
            particles,
            tunnel: Tunnel::new(&scene.tunnel),
            disc: Disc::new(&scene.disc),
            textures: TextureStore::new(),
            playback: PlaybackController::new(),
            covers: AlbumArtLoader::new(),
            search: SearchSession::new(&config.search),
            controls: OrbitControls::new(&scene.camera),
            cursor: Cursor::Default,
            clock_text: String::new(),
            frame: 0,
            audio,
            cover_loader,
            search_client,
            sink,
        })
    }

    pub fn sender(&self) -> EventSender {
        self.bus.sender()
    }

    /// Posts an event from the loop thread.
    pub fn post(&self, event: AppEvent) {
        self.bus.push(event);
    }

    /// Runs one frame. Nothing in here blocks and no failure stops the loop.
    pub fn tick(&mut self, input: FrameInput) -> FrameReport {
        for event in self.bus.drain() {
            self.dispatch(event, input.elapsed);
        }
        if let Some((generation, query)) = self.search.poll(input.elapsed) {
            self.search_client.submit(generation, &query);
        }

        self.particles.advance();
        self.tunnel.update(input.elapsed.as_secs_f32());

        if self.playback.is_playing() {
            self.disc.spin();
        }

        let hour = self.time.resolve(input.wall_time);
        let lighting_updated = self.lighting.sync(hour);

        self.clock_text = self.time.clock_text(input.wall_time);

        self.controls.update();

        let frame = FrameSnapshot {
            frame: self.frame,
            particles: self.particles.particles(),
            particle_size: self.particles.size(),
            disc: &self.disc,
            textures: &self.textures,
            tunnel: &self.tunnel,
            lights: self.lighting.rig(),
            camera_position: self.controls.position(),
            camera_target: self.controls.target(),
            clock_text: &self.clock_text,
            cursor: self.cursor,
            results: self.search.table(),
        };
        let rendered = match self.sink.render(&frame) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(frame = self.frame, %err, "frame sink rejected frame");
                false
            }
        };

        let report = FrameReport {
            frame: self.frame,
            hour,
            lighting_updated,
            rendered,
        };
        self.frame += 1;
        report
    }

    fn dispatch(&mut self, event: AppEvent, now: Duration) {
        match event {
            AppEvent::PointerMoved { x, y } => {
                self.cursor = if self.pointer_on_disc(x, y) {
                    Cursor::Pointer
                } else {
                    Cursor::Default
                };
            }
            AppEvent::PointerClicked { x, y } => {
                if self.pointer_on_disc(x, y) {
                    self.playback.toggle(&mut self.audio);
                    self.sync_playback_visuals();
                }
            }
            AppEvent::PointerDragged { dx, dy } => self.controls.rotate(dx, dy),
            AppEvent::Resized { width, height } => self.controls.resize(width, height),
            AppEvent::SearchInput(text) => {
                self.search.on_input(&text, now);
            }
            AppEvent::TimeOverride(hour) => {
                self.time.set_override(hour);
            }
            AppEvent::TrackSelected(index) => self.select_track(index),
            AppEvent::Audio(signal) => {
                if let Err(err) = self.playback.on_signal(signal, &mut self.audio) {
                    self.release_cover();
                    self.surface_error(err);
                }
                self.sync_playback_visuals();
            }
            AppEvent::CoverLoaded { request, result } => {
                let outcome =
                    self.covers
                        .complete(request, result, &mut self.disc, &mut self.textures);
                if outcome == CoverOutcome::Applied {
                    tracing::debug!(request = request.0, "cover applied");
                }
            }
            AppEvent::SearchCompleted { generation, result } => {
                if self.search.on_completed(generation, result) {
                    self.sync_playback_visuals();
                }
            }
        }
    }

    fn select_track(&mut self, index: usize) {
        let Some(row) = self.search.table().row(index).cloned() else {
            tracing::warn!(index, "selected row does not exist");
            return;
        };

        let played = self.playback.play_track(
            &row.preview_url,
            &mut self.audio,
            &mut self.disc,
            &mut self.textures,
        );
        match played {
            // A toggle keeps the current cover; only a new track needs one.
            Ok(PlayOutcome::Started) => {
                self.search.table_mut().dismiss_error();
                self.covers.issue(&row.cover_url, &mut self.cover_loader);
            }
            Ok(PlayOutcome::Toggled(_)) => {}
            Err(err) => {
                self.release_cover();
                self.surface_error(err);
            }
        }
        self.sync_playback_visuals();
    }

    /// The slot was emptied: drop the disc texture and any cover still in
    /// flight for the released track.
    fn release_cover(&mut self) {
        self.covers.invalidate();
        self.disc.release_texture(&mut self.textures);
    }

    fn surface_error(&mut self, err: VisualiserError) {
        tracing::warn!(%err, "playback failed");
        self.search.table_mut().show_error(err.to_string());
    }

    fn sync_playback_visuals(&mut self) {
        self.disc.set_tint(self.playback.disc_tint());
        let url = self.playback.current_url().map(str::to_string);
        self.search
            .table_mut()
            .sync_highlight(url.as_deref(), self.playback.state());
    }

    fn pointer_on_disc(&self, x: f32, y: f32) -> bool {
        self.disc.hit(&self.controls.ray_from_pointer(x, y))
    }

    /// Releases the audio resource and the disc texture.
    pub fn shutdown(&mut self) {
        self.playback.shutdown(&mut self.audio);
        self.release_cover();
        self.sync_playback_visuals();
        tracing::info!(frames = self.frame, "visualiser shut down");
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn disc(&self) -> &Disc {
        &self.disc
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn tunnel(&self) -> &Tunnel {
        &self.tunnel
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn results(&self) -> &ResultsTable {
        self.search.table()
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn clock_text(&self) -> &str {
        &self.clock_text
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn cover_loader(&self) -> &L {
        &self.cover_loader
    }

    pub fn search_client(&self) -> &S {
        &self.search_client
    }

    pub fn sink(&self) -> &F {
        &self.sink
    }
}
