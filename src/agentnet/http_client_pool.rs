//! Shared `reqwest::Client`s, one per base URL.
//!
//! Every model client built for the same endpoint reuses one connection pool, so a network
//! with many agents pointed at the same provider does not pay DNS and TLS setup per agent.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

lazy_static! {
    static ref CLIENT_POOL: Mutex<HashMap<String, reqwest::Client>> = Mutex::new(HashMap::new());
}

/// Return the pooled client for `base_url`, building it on first use.
///
/// Settings:
/// - up to 10 idle connections per host, kept for 90 seconds
/// - TCP keepalive every 60 seconds
/// - 30 second connect timeout, 300 second request timeout
pub fn get_or_create_client(base_url: &str) -> Result<reqwest::Client, reqwest::Error> {
    let mut pool = CLIENT_POOL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(client) = pool.get(base_url) {
        return Ok(client.clone());
    }
    let client = create_pooled_client()?;
    pool.insert(base_url.to_string(), client.clone());
    Ok(client)
}

fn create_pooled_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(300))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pooled(url: &str) -> bool {
        CLIENT_POOL.lock().unwrap().contains_key(url)
    }

    #[test]
    fn test_client_is_cached_per_base_url() {
        let url = "https://pool-test.example.com/v1";
        get_or_create_client(url).unwrap();
        assert!(pooled(url));

        for _ in 0..5 {
            get_or_create_client(url).unwrap();
        }
        let count = CLIENT_POOL
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.as_str() == url)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_distinct_base_urls_get_distinct_entries() {
        let a = "https://pool-a.example.com/v1";
        let b = "https://pool-b.example.com/v1";
        get_or_create_client(a).unwrap();
        get_or_create_client(b).unwrap();
        assert!(pooled(a));
        assert!(pooled(b));
    }
}
