//! Periodic self-ping that keeps idle hosting platforms from sleeping.

use std::time::Duration;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pings a URL at a fixed interval.
#[derive(Debug)]
pub struct KeepAlive {
    http: reqwest::Client,
    url: String,
    period: Duration,
}

impl KeepAlive {
    #[must_use]
    pub fn new(url: impl Into<String>, period: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            period,
        }
    }

    /// Runs until `cancel` fires. The first ping happens one period after start.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Keep-alive pinging {} every {:?}", self.url, self.period);

        let mut timer = interval(self.period);
        timer.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Keep-alive stopped");
                    break;
                }
                _ = timer.tick() => {
                    self.ping().await;
                }
            }
        }
    }

    async fn ping(&self) {
        match self.http.get(&self.url).send().await {
            Ok(response) => debug!("Keep-alive ping: {}", response.status()),
            Err(e) => warn!("Keep-alive ping failed: {}", e.without_url()),
        }
    }
}
