use crate::{
    assets::TextureStore,
    scene::{Disc, DiscTint},
    Result, VisualiserError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioId(pub u64);

/// Owning reference to a playable audio resource.
///
/// Not `Clone`: [`AudioBackend::dispose`] consumes it, so a handle can be
/// released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct AudioHandle {
    id: AudioId,
    url: String,
}

impl AudioHandle {
    /// Backends mint handles for the resources they open.
    pub fn new(id: AudioId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> AudioId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Notification emitted by a resource after a play or pause request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSignalKind {
    Started,
    Paused,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSignal {
    pub id: AudioId,
    pub kind: AudioSignalKind,
}

impl AudioSignal {
    pub fn new(id: AudioId, kind: AudioSignalKind) -> Self {
        Self { id, kind }
    }
}

/// Audio device façade.
///
/// `play` and `pause` are requests; the outcome arrives later as an
/// [`AudioSignal`] posted to the event bus.
pub trait AudioBackend {
    /// Creates a resource for `url` without starting it.
    fn open(&mut self, url: &str) -> Result<AudioHandle>;
    fn play(&mut self, handle: &AudioHandle);
    fn pause(&mut self, handle: &AudioHandle);
    fn dispose(&mut self, handle: AudioHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new resource was opened and asked to start.
    Started,
    /// Same track as current; playback was toggled.
    Toggled(PlaybackState),
}

/// Owns the single audio slot and its state machine.
#[derive(Debug, Default)]
pub struct PlaybackController {
    current_url: Option<String>,
    handle: Option<AudioHandle>,
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn handle_id(&self) -> Option<AudioId> {
        self.handle.as_ref().map(AudioHandle::id)
    }

    /// Selecting the current track toggles it. Selecting any other track tears
    /// down the old resource and its cover before the new one is created.
    pub fn play_track(
        &mut self,
        url: &str,
        backend: &mut dyn AudioBackend,
        disc: &mut Disc,
        textures: &mut TextureStore,
    ) -> Result<PlayOutcome> {
        if self.handle.is_some() && self.current_url.as_deref() == Some(url) {
            return Ok(PlayOutcome::Toggled(self.toggle(backend)));
        }

        self.release(backend);
        disc.release_texture(textures);

        let handle = match backend.open(url) {
            Ok(handle) => handle,
            Err(err) => {
                self.state = PlaybackState::Idle;
                return Err(match err {
                    VisualiserError::Playback(_) => err,
                    other => VisualiserError::Playback(other.to_string()),
                });
            }
        };
        backend.play(&handle);
        tracing::debug!(url, id = handle.id().0, "track loading");
        self.current_url = Some(url.to_string());
        self.handle = Some(handle);
        self.state = PlaybackState::Loading;
        Ok(PlayOutcome::Started)
    }

    /// Flips between playing and paused. A pending start counts as playing.
    pub fn toggle(&mut self, backend: &mut dyn AudioBackend) -> PlaybackState {
        let Some(handle) = self.handle.as_ref() else {
            return self.state;
        };
        self.state = match self.state {
            PlaybackState::Playing | PlaybackState::Loading => {
                backend.pause(handle);
                PlaybackState::Paused
            }
            PlaybackState::Paused => {
                backend.play(handle);
                PlaybackState::Loading
            }
            PlaybackState::Idle => PlaybackState::Idle,
        };
        tracing::debug!(state = ?self.state, "playback toggled");
        self.state
    }

    /// Applies a signal from the backend. Signals from disposed resources are
    /// ignored. A start failure empties the slot and is returned for display.
    ///
    /// Signals for the live resource report what it is actually doing, and
    /// they arrive in request order, so the last one wins.
    pub fn on_signal(
        &mut self,
        signal: AudioSignal,
        backend: &mut dyn AudioBackend,
    ) -> Result<PlaybackState> {
        if self.handle_id() != Some(signal.id) {
            tracing::debug!(id = signal.id.0, "ignoring stale audio signal");
            return Ok(self.state);
        }

        match signal.kind {
            AudioSignalKind::Started => self.state = PlaybackState::Playing,
            AudioSignalKind::Paused => self.state = PlaybackState::Paused,
            AudioSignalKind::Failed(message) => {
                self.release(backend);
                return Err(VisualiserError::Playback(message));
            }
        }
        Ok(self.state)
    }

    /// Releases the live resource, if any. Used on teardown.
    pub fn shutdown(&mut self, backend: &mut dyn AudioBackend) {
        self.release(backend);
    }

    /// Tint the disc should carry for the current state.
    pub fn disc_tint(&self) -> DiscTint {
        if self.is_playing() {
            DiscTint::Active
        } else {
            DiscTint::Inactive
        }
    }

    fn release(&mut self, backend: &mut dyn AudioBackend) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!(id = handle.id().0, "disposing audio resource");
            backend.pause(&handle);
            backend.dispose(handle);
        }
        self.current_url = None;
        self.state = PlaybackState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DiscConfig, CoverImage};

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Open(String),
        Play(u64),
        Pause(u64),
        Dispose(u64),
    }

    #[derive(Default)]
    struct Fake {
        next: u64,
        calls: Vec<Call>,
        refuse: bool,
    }

    impl AudioBackend for Fake {
        fn open(&mut self, url: &str) -> Result<AudioHandle> {
            self.calls.push(Call::Open(url.to_string()));
            if self.refuse {
                return Err(VisualiserError::msg("unsupported source"));
            }
            self.next += 1;
            Ok(AudioHandle::new(AudioId(self.next), url))
        }

        fn play(&mut self, handle: &AudioHandle) {
            self.calls.push(Call::Play(handle.id().0));
        }

        fn pause(&mut self, handle: &AudioHandle) {
            self.calls.push(Call::Pause(handle.id().0));
        }

        fn dispose(&mut self, handle: AudioHandle) {
            self.calls.push(Call::Dispose(handle.id().0));
        }
    }

    struct Rig {
        backend: Fake,
        disc: Disc,
        textures: TextureStore,
        controller: PlaybackController,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                backend: Fake::default(),
                disc: Disc::new(&DiscConfig::default()),
                textures: TextureStore::new(),
                controller: PlaybackController::new(),
            }
        }

        fn play(&mut self, url: &str) -> Result<PlayOutcome> {
            self.controller
                .play_track(url, &mut self.backend, &mut self.disc, &mut self.textures)
        }

        fn signal(&mut self, kind: AudioSignalKind) -> Result<PlaybackState> {
            let id = self.controller.handle_id().unwrap();
            self.controller
                .on_signal(AudioSignal::new(id, kind), &mut self.backend)
        }
    }

    #[test]
    fn start_signal_moves_loading_to_playing() {
        let mut rig = Rig::new();
        assert_eq!(rig.play("a").unwrap(), PlayOutcome::Started);
        assert_eq!(rig.controller.state(), PlaybackState::Loading);
        assert_eq!(rig.controller.disc_tint(), DiscTint::Inactive);

        assert_eq!(rig.signal(AudioSignalKind::Started).unwrap(), PlaybackState::Playing);
        assert_eq!(rig.controller.disc_tint(), DiscTint::Active);
    }

    #[test]
    fn same_url_toggles_without_reopening() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        rig.signal(AudioSignalKind::Started).unwrap();
        let id = rig.controller.handle_id();

        assert_eq!(
            rig.play("a").unwrap(),
            PlayOutcome::Toggled(PlaybackState::Paused)
        );
        assert_eq!(rig.controller.handle_id(), id);
        assert_eq!(
            rig.play("a").unwrap(),
            PlayOutcome::Toggled(PlaybackState::Loading)
        );
        assert_eq!(rig.controller.handle_id(), id);

        let opens = rig
            .backend
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Open(_)))
            .count();
        assert_eq!(opens, 1);
    }

    #[test]
    fn switching_tracks_disposes_before_opening() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        let cover = rig.textures.create(
            "cover",
            &CoverImage {
                width: 1,
                height: 1,
                rgba: vec![0; 4],
            },
        );
        rig.disc.install_texture(cover, &mut rig.textures);

        rig.play("b").unwrap();

        assert_eq!(
            rig.backend.calls,
            vec![
                Call::Open("a".into()),
                Call::Play(1),
                Call::Pause(1),
                Call::Dispose(1),
                Call::Open("b".into()),
                Call::Play(2),
            ]
        );
        assert_eq!(rig.textures.disposed(), 1);
        assert!(rig.disc.texture().is_none());
        assert_eq!(rig.controller.current_url(), Some("b"));
    }

    #[test]
    fn queued_signals_settle_on_the_last_request() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        rig.signal(AudioSignalKind::Started).unwrap();

        // Pause then resume before either signal is delivered.
        rig.controller.toggle(&mut rig.backend);
        rig.controller.toggle(&mut rig.backend);
        assert_eq!(rig.controller.state(), PlaybackState::Loading);

        assert_eq!(rig.signal(AudioSignalKind::Paused).unwrap(), PlaybackState::Paused);
        assert_eq!(rig.signal(AudioSignalKind::Started).unwrap(), PlaybackState::Playing);
        assert_eq!(rig.controller.disc_tint(), DiscTint::Active);
    }

    #[test]
    fn start_then_pause_while_loading_ends_paused() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        rig.controller.toggle(&mut rig.backend);

        rig.signal(AudioSignalKind::Started).unwrap();
        assert_eq!(rig.signal(AudioSignalKind::Paused).unwrap(), PlaybackState::Paused);
        assert_eq!(rig.controller.disc_tint(), DiscTint::Inactive);
    }

    #[test]
    fn stale_signals_are_ignored() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        rig.play("b").unwrap();

        let state = rig
            .controller
            .on_signal(
                AudioSignal::new(AudioId(1), AudioSignalKind::Started),
                &mut rig.backend,
            )
            .unwrap();
        assert_eq!(state, PlaybackState::Loading);
    }

    #[test]
    fn start_failure_empties_the_slot() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();

        let err = rig
            .signal(AudioSignalKind::Failed("autoplay blocked".into()))
            .unwrap_err();
        assert!(matches!(err, VisualiserError::Playback(_)));
        assert_eq!(rig.controller.state(), PlaybackState::Idle);
        assert!(rig.controller.handle_id().is_none());
        assert!(rig.controller.current_url().is_none());

        // Selecting the same track again is a fresh attempt, not a toggle.
        assert_eq!(rig.play("a").unwrap(), PlayOutcome::Started);
    }

    #[test]
    fn open_failure_is_reported_as_playback_error() {
        let mut rig = Rig::new();
        rig.backend.refuse = true;

        let err = rig.play("a").unwrap_err();
        assert!(matches!(err, VisualiserError::Playback(_)));
        assert_eq!(rig.controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn toggle_on_empty_slot_is_a_no_op() {
        let mut rig = Rig::new();
        assert_eq!(rig.controller.toggle(&mut rig.backend), PlaybackState::Idle);
        assert!(rig.backend.calls.is_empty());
    }

    #[test]
    fn shutdown_releases_the_handle() {
        let mut rig = Rig::new();
        rig.play("a").unwrap();
        rig.controller.shutdown(&mut rig.backend);
        assert_eq!(rig.backend.calls.last(), Some(&Call::Dispose(1)));
        assert_eq!(rig.controller.state(), PlaybackState::Idle);
    }
}
