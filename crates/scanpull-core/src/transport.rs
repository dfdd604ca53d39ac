//! HTTP transport for listing pages and dataset archives.
//!
//! Uses the curl crate (libcurl) easy interface. Redirects are followed
//! transparently; any final status other than 200 is a hard failure for that
//! fetch and is never retried here.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::FetchError;

/// Capability the pipeline needs from the network: fetch the bytes behind a URL.
pub trait Transport {
    /// GET `url` and return the whole body.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// GET `url` and stream the body into `out`. Returns bytes written.
    fn get_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError>;
}

/// Blocking libcurl transport. Runs in the current thread.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirections: u32,
    user_agent: String,
}

impl CurlTransport {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
            user_agent: cfg.user_agent.clone(),
        }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(self.timeout)?;
        Ok(easy)
    }

    /// Perform a GET, handing each body chunk to `sink`.
    fn perform<F>(&self, url: &str, mut sink: F) -> Result<(), FetchError>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        let mut easy = self.easy(url)?;
        let mut write_err: Option<io::Error> = None;

        let outcome = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchError::Storage(e));
        }
        outcome?;

        let code = easy.response_code()?;
        if code != 200 {
            return Err(FetchError::Http(code));
        }
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        self.perform(url, |data| {
            body.extend_from_slice(data);
            Ok(())
        })?;
        tracing::debug!(url, bytes = body.len(), "GET complete");
        Ok(body)
    }

    fn get_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
        let mut written = 0u64;
        self.perform(url, |data| {
            out.write_all(data)?;
            written += data.len() as u64;
            Ok(())
        })?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_copies_http_config() {
        let cfg = HttpConfig {
            connect_timeout_secs: 3,
            timeout_secs: 9,
            max_redirections: 2,
            user_agent: "t".to_string(),
        };
        let t = CurlTransport::new(&cfg);
        assert_eq!(t.connect_timeout, Duration::from_secs(3));
        assert_eq!(t.timeout, Duration::from_secs(9));
        assert_eq!(t.max_redirections, 2);
    }

    #[test]
    fn invalid_url_is_fetch_error() {
        let t = CurlTransport::new(&HttpConfig::default());
        assert!(t.get("http://[::1").is_err());
    }
}
