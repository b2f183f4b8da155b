use std::time::Duration;

use crate::{
    assets::http::build_agent, config::SearchConfig, AppEvent, EventSender, Result,
    SearchClient, SearchResultRow, VisualiserError,
};

use super::parse_results;

/// Catalogue search over HTTP. Each query runs on its own worker thread and
/// is never retried.
#[derive(Clone)]
pub struct HttpSearchClient {
    agent: ureq::Agent,
    endpoint: String,
    max_results: usize,
    events: EventSender,
}

impl HttpSearchClient {
    pub fn new(config: &SearchConfig, events: EventSender) -> Self {
        Self {
            agent: build_agent(Duration::from_secs(config.timeout_secs)),
            endpoint: config.endpoint.clone(),
            max_results: config.max_results,
            events,
        }
    }
}

impl SearchClient for HttpSearchClient {
    fn submit(&mut self, generation: u64, query: &str) {
        tracing::info!(generation, query, "searching catalogue");
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let max_results = self.max_results;
        let events = self.events.clone();
        let query = query.to_string();
        std::thread::spawn(move || {
            let result =
                fetch(&agent, &endpoint, &query, max_results).map_err(|err| err.to_string());
            if events
                .send(AppEvent::SearchCompleted { generation, result })
                .is_err()
            {
                tracing::debug!(generation, "frame loop gone, dropping search results");
            }
        });
    }
}

fn fetch(
    agent: &ureq::Agent,
    endpoint: &str,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchResultRow>> {
    let mut response = agent.get(endpoint).query("q", query).call()?;
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|err| VisualiserError::Network(err.to_string()))?;
    parse_results(&body, max_results)
}
