//! Venue page retrieval.
//!
//! The metadata cache only needs raw page content for a journal abbreviation,
//! so the collaborator is a single-method trait. Closures implement it, which
//! keeps tests and offline runs free of network access:
//!
//! ```
//! use venuerank::fetch::{FetchError, VenueFetcher};
//!
//! let offline = |abbr: &str| -> Result<String, FetchError> {
//!     Err(FetchError::Other(format!("no network for {abbr}")))
//! };
//! assert!(offline.fetch("tse").is_err());
//! ```
//!
//! With the `http` feature, [`DblpFetcher`] fetches
//! `https://dblp.org/db/journals/<abbr>/` over blocking HTTP.

use thiserror::Error;

/// Failure to obtain page content. Never fatal for a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Fetch failed: {0}")]
    Other(String),
}

/// Source of raw venue page content.
pub trait VenueFetcher {
    /// Fetch the page describing the journal with DBLP abbreviation `abbr`.
    fn fetch(&self, abbr: &str) -> Result<String, FetchError>;
}

impl<F> VenueFetcher for F
where
    F: Fn(&str) -> Result<String, FetchError>,
{
    fn fetch(&self, abbr: &str) -> Result<String, FetchError> {
        self(abbr)
    }
}

#[cfg(feature = "http")]
pub use dblp::DblpFetcher;

#[cfg(feature = "http")]
mod dblp {
    use super::{FetchError, VenueFetcher};
    use crate::config::NetworkConfig;
    use reqwest::blocking::Client;
    use std::time::Duration;
    use tracing::{debug, warn};

    const DBLP_JOURNAL_BASE: &str = "https://dblp.org/db/journals";

    /// Blocking DBLP journal page fetcher.
    ///
    /// Sleeps `sleep_interval` before every network attempt so consecutive
    /// lookups stay under DBLP's rate limit. When a proxy is configured and
    /// the proxied request fails to connect, the request is retried once
    /// without the proxy.
    pub struct DblpFetcher {
        client: Client,
        direct: Option<Client>,
        base_url: String,
        sleep_interval: Duration,
    }

    impl DblpFetcher {
        pub fn new(config: &NetworkConfig) -> Result<Self, FetchError> {
            let timeout = Duration::from_secs(config.timeout_secs);
            let direct = Client::builder().timeout(timeout).build()?;

            let (client, direct) = match &config.proxy {
                Some(proxy) => {
                    let proxied = Client::builder()
                        .timeout(timeout)
                        .proxy(reqwest::Proxy::all(proxy.as_str())?)
                        .build()?;
                    (proxied, Some(direct))
                }
                None => (direct, None),
            };

            Ok(Self {
                client,
                direct,
                base_url: DBLP_JOURNAL_BASE.to_string(),
                sleep_interval: Duration::from_secs(config.sleep_interval_secs),
            })
        }

        /// Overrides the base URL, e.g. to point at a DBLP mirror.
        #[must_use]
        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into().trim_end_matches('/').to_string();
            self
        }

        fn url_for(&self, abbr: &str) -> String {
            format!("{}/{}/", self.base_url, abbr)
        }

        fn get(client: &Client, url: &str) -> Result<String, reqwest::Error> {
            client.get(url).send()?.error_for_status()?.text()
        }
    }

    impl VenueFetcher for DblpFetcher {
        fn fetch(&self, abbr: &str) -> Result<String, FetchError> {
            let url = self.url_for(abbr);
            std::thread::sleep(self.sleep_interval);
            debug!(%url, "fetching venue page");

            let result = match (Self::get(&self.client, &url), &self.direct) {
                (Err(e), Some(direct)) if e.is_connect() || e.is_timeout() => {
                    warn!(abbr, error = %e, "proxy request failed, retrying without proxy");
                    Self::get(direct, &url)
                }
                (result, _) => result,
            };

            result.map_err(|e| match e.status() {
                Some(status) => FetchError::Status(status.as_u16()),
                None => FetchError::Http(e),
            })
        }
    }

}
