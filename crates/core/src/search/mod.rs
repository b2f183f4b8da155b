//! Catalogue search: debounced input, result rows and the results table.

mod http;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{config::SearchConfig, timeline::Debouncer, PlaybackState, Result};

pub use http::HttpSearchClient;

/// One clickable row in the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRow {
    pub preview_url: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: String,
}

/// Runs queries out of band.
///
/// Implementations must eventually post exactly one
/// [`AppEvent::SearchCompleted`](crate::AppEvent::SearchCompleted) carrying the
/// same `generation`.
pub trait SearchClient {
    fn submit(&mut self, generation: u64, query: &str);
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    #[serde(default)]
    title: String,
    #[serde(default)]
    preview: String,
    #[serde(default)]
    artist: Artist,
    #[serde(default)]
    album: Album,
}

#[derive(Debug, Default, Deserialize)]
struct Artist {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Album {
    #[serde(default)]
    title: String,
    #[serde(default)]
    cover: String,
}

/// Parses a catalogue response body. At most `max_results` tracks are looked
/// at, and those without a preview are skipped.
pub fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResultRow>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(rows_from_tracks(response.data, max_results))
}

fn rows_from_tracks(tracks: Vec<Track>, max_results: usize) -> Vec<SearchResultRow> {
    tracks
        .into_iter()
        .take(max_results)
        .filter(|track| !track.preview.is_empty())
        .map(|track| SearchResultRow {
            preview_url: track.preview,
            title: track.title,
            artist: track.artist.name,
            album: track.album.title,
            cover_url: track.album.cover,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMessage {
    Loading,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightTint {
    /// Green: this track is playing or starting.
    Playing,
    /// Red: this track is loaded but paused.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHighlight {
    pub index: usize,
    pub tint: HighlightTint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    rows: Vec<SearchResultRow>,
    message: Option<TableMessage>,
    highlight: Option<RowHighlight>,
}

impl ResultsTable {
    pub fn rows(&self) -> &[SearchResultRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SearchResultRow> {
        self.rows.get(index)
    }

    pub fn message(&self) -> Option<&TableMessage> {
        self.message.as_ref()
    }

    pub fn highlight(&self) -> Option<RowHighlight> {
        self.highlight
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.message = None;
        self.highlight = None;
    }

    /// Inline error; the rows stay so a track can be picked again.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.message = Some(TableMessage::Error(message.into()));
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.message, Some(TableMessage::Error(_))) {
            self.message = None;
        }
    }

    /// Recolours the row of the loaded track, clearing any other highlight.
    pub fn sync_highlight(&mut self, current_url: Option<&str>, state: PlaybackState) {
        let tint = match state {
            PlaybackState::Loading | PlaybackState::Playing => Some(HighlightTint::Playing),
            PlaybackState::Paused => Some(HighlightTint::Paused),
            PlaybackState::Idle => None,
        };
        self.highlight = current_url.zip(tint).and_then(|(url, tint)| {
            self.rows
                .iter()
                .position(|row| row.preview_url == url)
                .map(|index| RowHighlight { index, tint })
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Query too short: table cleared, nothing sent.
    Cleared,
    /// Query accepted and (re)scheduled.
    Scheduled,
}

/// Debounced search box state.
#[derive(Debug)]
pub struct SearchSession {
    debounce: Debouncer<String>,
    min_query_length: usize,
    generation: u64,
    table: ResultsTable,
}

impl SearchSession {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            debounce: Debouncer::new(config.debounce()),
            min_query_length: config.min_query_length,
            generation: 0,
            table: ResultsTable::default(),
        }
    }

    pub fn table(&self) -> &ResultsTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ResultsTable {
        &mut self.table
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn on_input(&mut self, raw: &str, now: Duration) -> InputOutcome {
        let query = raw.trim();
        if query.chars().count() < self.min_query_length {
            self.debounce.cancel();
            // Anything still in flight belongs to an abandoned query.
            self.generation += 1;
            self.table.clear();
            return InputOutcome::Cleared;
        }

        self.table.message = Some(TableMessage::Loading);
        self.debounce.schedule(query.to_string(), now);
        InputOutcome::Scheduled
    }

    /// Releases the debounced query once the quiet period has passed, tagged
    /// with a fresh generation.
    pub fn poll(&mut self, now: Duration) -> Option<(u64, String)> {
        let query = self.debounce.poll(now)?;
        self.generation += 1;
        Some((self.generation, query))
    }

    /// Merges a completed search. Results for older generations are dropped.
    pub fn on_completed(
        &mut self,
        generation: u64,
        result: std::result::Result<Vec<SearchResultRow>, String>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "dropping stale search");
            return false;
        }
        match result {
            Ok(rows) => {
                self.table.rows = rows;
                self.table.message = None;
            }
            Err(message) => {
                tracing::warn!(%message, "search failed");
                self.table.rows.clear();
                self.table.message = Some(TableMessage::Error(message));
            }
        }
        self.table.highlight = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str) -> SearchResultRow {
        SearchResultRow {
            preview_url: url.to_string(),
            title: "t".into(),
            artist: "a".into(),
            album: "b".into(),
            cover_url: "c".into(),
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn parses_catalogue_payload() {
        let body = r#"{
            "data": [
                { "title": "Plastic Love", "preview": "https://p/1.mp3",
                  "artist": { "name": "Mariya Takeuchi" },
                  "album": { "title": "Variety", "cover": "https://c/56x56.jpg" } },
                { "title": "No Preview", "preview": "",
                  "artist": { "name": "x" }, "album": { "title": "y", "cover": "z" } }
            ],
            "total": 2
        }"#;

        let rows = parse_results(body, 12).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Plastic Love");
        assert_eq!(rows[0].artist, "Mariya Takeuchi");
        assert_eq!(rows[0].album, "Variety");
        assert_eq!(rows[0].cover_url, "https://c/56x56.jpg");
    }

    #[test]
    fn limit_applies_before_preview_filter() {
        let body = r#"{ "data": [
            { "title": "1", "preview": "" },
            { "title": "2", "preview": "p2" },
            { "title": "3", "preview": "p3" }
        ] }"#;
        let rows = parse_results(body, 2).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].preview_url, "p2");
    }

    #[test]
    fn missing_data_means_no_results() {
        assert!(parse_results(r#"{ "error": {} }"#, 12).unwrap().is_empty());
        assert!(parse_results("not json", 12).is_err());
    }

    #[test]
    fn keystroke_burst_submits_once() {
        let mut session = SearchSession::new(&SearchConfig::default());
        for (i, text) in ["d", "da", "daf", "daft"].iter().enumerate() {
            assert_eq!(session.on_input(text, ms(i as u64 * 50)), InputOutcome::Scheduled);
        }
        assert_eq!(session.table().message(), Some(&TableMessage::Loading));

        assert_eq!(session.poll(ms(400)), None);
        assert_eq!(session.poll(ms(450)), Some((1, "daft".to_string())));
        assert_eq!(session.poll(ms(2000)), None);
    }

    #[test]
    fn short_query_clears_and_cancels() {
        let mut session = SearchSession::new(&SearchConfig::default());
        session.on_input("abc", ms(0));
        let (generation, _) = session.poll(ms(300)).unwrap();
        session.on_completed(generation, Ok(vec![row("a")]));
        assert_eq!(session.table().rows().len(), 1);

        session.on_input("x", ms(400));
        assert_eq!(session.on_input("   ", ms(450)), InputOutcome::Cleared);

        assert!(session.table().rows().is_empty());
        assert!(session.table().message().is_none());
        assert_eq!(session.poll(ms(5000)), None);
    }

    #[test]
    fn stale_generations_are_dropped() {
        let mut session = SearchSession::new(&SearchConfig::default());
        session.on_input("first", ms(0));
        let (old, _) = session.poll(ms(300)).unwrap();
        session.on_input("second", ms(310));
        let (new, _) = session.poll(ms(700)).unwrap();

        assert!(session.on_completed(new, Ok(vec![row("new")])));
        assert!(!session.on_completed(old, Ok(vec![row("old")])));
        assert_eq!(session.table().rows()[0].preview_url, "new");
    }

    #[test]
    fn failed_search_shows_inline_error() {
        let mut session = SearchSession::new(&SearchConfig::default());
        session.on_input("q", ms(0));
        let (generation, _) = session.poll(ms(300)).unwrap();
        session.on_completed(generation, Err("HTTP 503".into()));

        assert_eq!(
            session.table().message(),
            Some(&TableMessage::Error("HTTP 503".into()))
        );
    }

    #[test]
    fn highlight_follows_playback_state() {
        let mut table = ResultsTable::default();
        table.rows = vec![row("a"), row("b")];

        table.sync_highlight(Some("b"), PlaybackState::Playing);
        assert_eq!(
            table.highlight(),
            Some(RowHighlight {
                index: 1,
                tint: HighlightTint::Playing
            })
        );

        table.sync_highlight(Some("b"), PlaybackState::Paused);
        assert_eq!(table.highlight().map(|h| h.tint), Some(HighlightTint::Paused));

        table.sync_highlight(Some("zzz"), PlaybackState::Playing);
        assert_eq!(table.highlight(), None);

        table.sync_highlight(None, PlaybackState::Idle);
        assert_eq!(table.highlight(), None);
    }
}
