use vinyl_visualiser_core::{
    AppEvent, AudioBackend, AudioHandle, AudioId, AudioSignal, AudioSignalKind, EventSender,
    Result, VisualiserError,
};

/// Audio backend without an output device. Resources "start" immediately so
/// the visual side of playback can be exercised headless.
pub struct SilentAudio {
    next_id: u64,
    events: EventSender,
}

impl SilentAudio {
    pub fn new(events: EventSender) -> Self {
        Self { next_id: 0, events }
    }

    fn signal(&self, handle: &AudioHandle, kind: AudioSignalKind) {
        if self
            .events
            .send(AppEvent::Audio(AudioSignal::new(handle.id(), kind)))
            .is_err()
        {
            tracing::debug!(id = handle.id().0, "frame loop gone, dropping audio signal");
        }
    }
}

impl AudioBackend for SilentAudio {
    fn open(&mut self, url: &str) -> Result<AudioHandle> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VisualiserError::Playback(format!(
                "unsupported preview source `{url}`"
            )));
        }
        self.next_id += 1;
        tracing::info!(id = self.next_id, url, "opened preview");
        Ok(AudioHandle::new(AudioId(self.next_id), url))
    }

    fn play(&mut self, handle: &AudioHandle) {
        self.signal(handle, AudioSignalKind::Started);
    }

    fn pause(&mut self, handle: &AudioHandle) {
        self.signal(handle, AudioSignalKind::Paused);
    }

    fn dispose(&mut self, handle: AudioHandle) {
        tracing::debug!(id = handle.id().0, "released preview");
    }
}
