use thiserror::Error;

/// Failures while fetching or decoding the disposable-domain list.
///
/// These never reach validation callers: [`DisposableDomains`](super::DisposableDomains)
/// logs them and keeps its previous snapshot.
#[derive(Debug, Error)]
pub enum DisposableError {
    #[error("HTTP client initialization failed: {source}")]
    ClientInit {
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading {path} failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("domain list is not a JSON array of strings: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

impl DisposableError {
    pub(crate) fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(source: serde_json::Error) -> Self {
        Self::Parse { source }
    }
}
