use crate::error::{Result, UpdateError};
use futures::FutureExt;
use futures::future::BoxFuture;
use netgraph_core::GraphData;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Anything an update can be started from.
pub enum DataSource {
    /// http(s) URL, `file://` URL, or filesystem path of a JSON document
    Url(String),
    /// An already decoded document
    Inline(GraphData),
    /// A pending computation producing another source
    Deferred(BoxFuture<'static, Result<DataSource>>),
}

impl DataSource {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<DataSource>> + Send + 'static,
    {
        DataSource::Deferred(future.boxed())
    }
}

impl From<GraphData> for DataSource {
    fn from(data: GraphData) -> Self {
        DataSource::Inline(data)
    }
}

impl From<&str> for DataSource {
    fn from(url: &str) -> Self {
        DataSource::Url(url.to_string())
    }
}

impl From<String> for DataSource {
    fn from(url: String) -> Self {
        DataSource::Url(url)
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
            DataSource::Inline(data) => f
                .debug_struct("Inline")
                .field("nodes", &data.node_count())
                .field("links", &data.link_count())
                .finish(),
            DataSource::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Turns a [`DataSource`] into a decoded document.
pub trait Normalizer: Send + Sync {
    fn parse(&self, source: DataSource) -> BoxFuture<'static, Result<GraphData>>;
}

/// Default normalizer: fetches URLs, reads files, awaits deferred sources.
#[derive(Clone)]
pub struct JsonSourceParser {
    client: Client,
}

impl JsonSourceParser {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Normalizer for JsonSourceParser {
    fn parse(&self, source: DataSource) -> BoxFuture<'static, Result<GraphData>> {
        let client = self.client.clone();
        async move {
            let mut source = source;
            loop {
                source = match source {
                    DataSource::Inline(data) => return Ok(data),
                    DataSource::Url(location) => return load_location(&client, &location).await,
                    DataSource::Deferred(pending) => pending.await?,
                };
            }
        }
        .boxed()
    }
}

async fn load_location(client: &Client, location: &str) -> Result<GraphData> {
    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch_graph(client, location).await,
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| UpdateError::InvalidSource(location.to_string()))?;
            read_graph(path).await
        }
        Ok(url) if url.scheme().len() > 1 => Err(UpdateError::InvalidSource(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            location
        ))),
        // Relative paths and Windows drive letters end up here
        _ => read_graph(PathBuf::from(location)).await,
    }
}

async fn read_graph(path: PathBuf) -> Result<GraphData> {
    debug!("Reading graph from {}", path.display());
    let bytes = tokio::fs::read(&path).await?;
    Ok(GraphData::from_json_slice(&bytes)?)
}

/// GET `url` and decode the body as a graph document.
///
/// Non-2xx statuses and undecodable bodies are errors.
pub async fn fetch_graph(client: &Client, url: &str) -> Result<GraphData> {
    debug!("Fetching {}", url);
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.bytes().await?;
    Ok(GraphData::from_json_slice(&body)?)
}

/// HTTP client shared by the normalizer and the search controller.
///
/// No request timeout is set; a fetch runs until the server answers.
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("netgraph/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}
