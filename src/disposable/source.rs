use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use super::DisposableError;

/// Where the disposable-domain list comes from.
pub trait DomainListSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<String>, DisposableError>;

    /// Short label used in log lines.
    fn describe(&self) -> String;
}

/// Remote JSON array of domains, fetched with a bounded timeout.
pub struct HttpListSource {
    url: String,
    client: Client,
}

impl HttpListSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DisposableError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| DisposableError::ClientInit { source })?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl DomainListSource for HttpListSource {
    fn fetch(&self) -> Result<Vec<String>, DisposableError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|err| DisposableError::http(&self.url, err))?;
        parse_domain_list(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Local JSON file with the same shape as the remote list.
pub struct FileListSource {
    path: PathBuf,
}

impl FileListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DomainListSource for FileListSource {
    fn fetch(&self) -> Result<Vec<String>, DisposableError> {
        let bytes = std::fs::read(&self.path)
            .map_err(|err| DisposableError::io(self.path.display().to_string(), err))?;
        parse_domain_list(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticListSource {
    domains: Vec<String>,
}

impl StaticListSource {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }
}

impl DomainListSource for StaticListSource {
    fn fetch(&self) -> Result<Vec<String>, DisposableError> {
        Ok(self.domains.clone())
    }

    fn describe(&self) -> String {
        format!("static list ({} domains)", self.domains.len())
    }
}

pub(crate) fn parse_domain_list(bytes: &[u8]) -> Result<Vec<String>, DisposableError> {
    serde_json::from_slice::<Vec<String>>(bytes).map_err(DisposableError::parse)
}
