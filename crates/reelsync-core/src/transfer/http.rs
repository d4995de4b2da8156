//! Single HTTP GET of an asset into memory (libcurl).

use std::time::Duration;

use super::TransferError;

/// Request identity and limits for asset fetches.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Sent as `Referer`; the CDN rejects some requests without it.
    pub referer: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn new(user_agent: impl Into<String>, referer: Option<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            referer,
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
        }
    }
}

/// GETs `url` following redirects and returns the body.
///
/// Blocking; call from `spawn_blocking` when used from async code.
pub fn fetch(url: &str, opts: &FetchOptions) -> Result<Vec<u8>, TransferError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    if let Some(referer) = &opts.referer {
        easy.referer(referer)?;
    }
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(30))?;
    easy.timeout(opts.timeout)?;

    let mut headers = curl::easy::List::new();
    headers.append("Accept: */*")?;
    easy.http_headers(headers)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }
    if body.is_empty() {
        return Err(TransferError::EmptyBody);
    }
    Ok(body)
}
