//! Messages delivered into the frame loop.
//!
//! Every outside influence on the visualiser, whether user input or the
//! completion of a background request, arrives as an [`AppEvent`] posted to the
//! [`EventBus`]. The loop drains the bus once at the start of each tick, so
//! completions are merged atomically with respect to the frame steps.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::{AudioSignal, CoverImage, CoverRequestId, SearchResultRow};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Pointer moved over the canvas, in pixels.
    PointerMoved { x: f32, y: f32 },
    /// Pointer clicked on the canvas, in pixels.
    PointerClicked { x: f32, y: f32 },
    /// Pointer dragged by the given pixel delta; drives the orbit camera.
    PointerDragged { dx: f32, dy: f32 },
    /// Canvas resized, in pixels.
    Resized { width: u32, height: u32 },
    /// Raw contents of the search box.
    SearchInput(String),
    /// Time-of-day slider. `None` returns the scene to wall-clock time.
    TimeOverride(Option<u8>),
    /// A results row was clicked.
    TrackSelected(usize),
    /// Play, pause or failure reported by the audio resource.
    Audio(AudioSignal),
    /// A cover fetch finished, successfully or not.
    CoverLoaded {
        request: CoverRequestId,
        result: std::result::Result<CoverImage, String>,
    },
    /// A catalogue query finished, tagged with the generation it was sent under.
    SearchCompleted {
        generation: u64,
        result: std::result::Result<Vec<SearchResultRow>, String>,
    },
}

/// Cloneable handle used by input sources and worker threads to post events.
pub type EventSender = Sender<AppEvent>;

/// Single-consumer inbox owned by the frame loop.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<AppEvent>,
    receiver: Receiver<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Push an event from the loop thread itself.
    pub fn push(&self, event: AppEvent) {
        // The bus holds its own receiver, so sending cannot fail.
        let _ = self.sender.send(event);
    }

    /// Drain everything posted so far, in arrival order.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let bus = EventBus::new();
        bus.push(AppEvent::TimeOverride(Some(10)));
        bus.sender().send(AppEvent::TrackSelected(2)).unwrap();

        let events = bus.drain();
        assert_eq!(
            events,
            vec![AppEvent::TimeOverride(Some(10)), AppEvent::TrackSelected(2)]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn accepts_events_from_worker_threads() {
        let bus = EventBus::new();
        let sender = bus.sender();
        std::thread::spawn(move || {
            sender
                .send(AppEvent::SearchCompleted {
                    generation: 1,
                    result: Ok(Vec::new()),
                })
                .unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(bus.drain().len(), 1);
    }
}
