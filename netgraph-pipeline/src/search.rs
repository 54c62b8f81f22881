use crate::error::Result;
use crate::history::{NavigationHistory, PopStateHandler};
use crate::pipeline::{DataUpdatePipeline, UpdateOutcome};
use crate::source::{DataSource, fetch_graph};
use netgraph_core::SearchState;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// A fetch-and-update started by a search or a history traversal.
///
/// The request is already running. Network and decode failures are logged
/// and also come back from [`PendingFetch::finished`]; dropping the handle
/// detaches the task.
#[derive(Debug)]
pub struct PendingFetch {
    search_value: String,
    task: JoinHandle<Result<UpdateOutcome>>,
}

impl PendingFetch {
    fn spawn(
        client: Client,
        base_url: &str,
        search_value: String,
        pipeline: Arc<DataUpdatePipeline>,
    ) -> Self {
        let url = format!("{}{}", base_url, search_value);
        let value = search_value.clone();
        let task = tokio::spawn(async move {
            let data = match fetch_graph(&client, &url).await {
                Ok(data) => data,
                Err(e) => {
                    error!("Search {:?} failed: {}", value, e);
                    return Err(e);
                }
            };
            Ok(pipeline.update(DataSource::Inline(data)).await)
        });
        Self { search_value, task }
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub async fn finished(self) -> Result<UpdateOutcome> {
        self.task.await?
    }
}

/// Keeps searches and navigation history in step.
///
/// Each distinct search pushes one history entry and fetches
/// `base_url + value`; traversing the history re-fetches the value stored in
/// the entry it lands on.
pub struct SearchSyncController {
    base_url: String,
    client: Client,
    pipeline: Arc<DataUpdatePipeline>,
    history: Arc<NavigationHistory>,
}

impl SearchSyncController {
    /// Pushes an empty search entry and installs the traversal handler.
    ///
    /// Traversals spawn tasks, so the history must be driven from inside a
    /// tokio runtime.
    pub fn new(
        base_url: impl Into<String>,
        client: Client,
        pipeline: Arc<DataUpdatePipeline>,
        history: Arc<NavigationHistory>,
    ) -> Self {
        let base_url = base_url.into();
        history.push_state(SearchState::default());

        let handler: PopStateHandler = {
            let (base_url, client, pipeline) =
                (base_url.clone(), client.clone(), pipeline.clone());
            Arc::new(move |state: SearchState| {
                info!("Navigated to search {:?}", state.search_value);
                PendingFetch::spawn(
                    client.clone(),
                    &base_url,
                    state.search_value,
                    pipeline.clone(),
                )
            })
        };
        history.set_popstate_handler(handler);

        Self {
            base_url,
            client,
            pipeline,
            history,
        }
    }

    /// Search for `key`, trimmed.
    ///
    /// Returns `None` without touching history or the network when the value
    /// equals the current entry's.
    #[must_use = "the fetch result is only available through the handle"]
    pub fn search(&self, key: &str) -> Option<PendingFetch> {
        let search_value = key.trim();

        if !self.history.push_if_changed(SearchState::new(search_value)) {
            debug!("Search {:?} unchanged, skipping", search_value);
            return None;
        }

        info!("Searching {:?}", search_value);
        Some(PendingFetch::spawn(
            self.client.clone(),
            &self.base_url,
            search_value.to_string(),
            self.pipeline.clone(),
        ))
    }

    pub fn history(&self) -> &Arc<NavigationHistory> {
        &self.history
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
