// src/utils/http.rs

//! HTTP client utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// `config.headers` are installed as default headers so every request
/// replays them.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(header_map(&config.headers)?)
        .build()?;
    Ok(client)
}

/// Convert configured header pairs into a `HeaderMap`.
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::config(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::config(format!("invalid value for header '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let headers = BTreeMap::from([("X-Requested-With".to_string(), "XMLHttpRequest".to_string())]);
        let map = header_map(&headers).unwrap();
        assert_eq!(map["x-requested-with"], "XMLHttpRequest");
    }

    #[test]
    fn test_header_map_rejects_bad_name() {
        let headers = BTreeMap::from([("bad header".to_string(), "v".to_string())]);
        assert!(matches!(header_map(&headers), Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_client_builds() {
        assert!(create_async_client(&CrawlerConfig::default()).is_ok());
    }
}
