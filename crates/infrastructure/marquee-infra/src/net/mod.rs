use reqwest::{Client, StatusCode};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0} from title endpoint")]
    Status(StatusCode),
}

/// Builds the shared HTTP client with the timeouts every Marquee component
/// is expected to use.
pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(marquee_config::HTTP_CONNECT_TIMEOUT)
        .timeout(marquee_config::HTTP_REQUEST_TIMEOUT)
        .build()
}

/// Binding of the remote title resource: a fixed path under a configured
/// base URL, fetched with plain GET.
#[derive(Debug, Clone)]
pub struct TitleEndpoint {
    client: Client,
    base_url: String,
}

impl TitleEndpoint {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            marquee_config::TITLE_RESOURCE_PATH
        )
    }

    /// Fetches the next title as plain text. Any connectivity failure or
    /// non-success status is an error; the body is returned untrimmed for
    /// the domain layer to validate.
    pub async fn next_title(&self) -> Result<String, FetchError> {
        let url = self.resource_url();
        debug!(%url, "fetching next title");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(resp.text().await?)
    }
}
