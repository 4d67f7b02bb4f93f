use crate::error::{Result, SpiderError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// reqwest client for the SEC endpoints, paced to a fixed request rate.
///
/// The SEC allows 10 requests per second per client; every [`HttpClient::get`] waits for its
/// slot, however many tasks share the client.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    pacer: Pacer,
}

impl HttpClient {
    pub fn new(client: reqwest::Client, requests_per_second: u32) -> Self {
        Self {
            client,
            pacer: Pacer::new(requests_per_second),
        }
    }

    /// GET `url` once a slot is free. A non-2xx answer is returned as [`SpiderError::Status`].
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.pacer.wait().await;
        trace!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpiderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

/// Hands out request slots at most `period` apart.
#[derive(Debug)]
pub(crate) struct Pacer {
    period: Duration,
    next: Mutex<Instant>,
}

impl Pacer {
    pub(crate) fn new(per_second: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / per_second.max(1),
            next: Mutex::new(Instant::now()),
        }
    }

    /// Wait for the next free slot.
    pub(crate) async fn wait(&self) {
        // held across the sleep so waiters queue in order
        let mut next = self.next.lock().await;
        tokio::time::sleep_until(*next).await;
        *next = Instant::now().max(*next) + self.period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waits_are_spaced_by_the_period() {
        let pacer = Pacer::new(20);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.wait().await;
        }
        // the first slot is immediate, then one every 50ms
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn concurrent_waiters_share_the_rate() {
        let pacer = Pacer::new(20);
        let start = Instant::now();
        futures::future::join_all((0..5).map(|_| pacer.wait())).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn idle_time_is_not_banked() {
        let pacer = Pacer::new(20);
        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        // a long pause does not allow a burst afterwards
        let start = Instant::now();
        for _ in 0..3 {
            pacer.wait().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
