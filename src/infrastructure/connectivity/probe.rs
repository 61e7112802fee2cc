use super::monitor::ConnectivityMonitor;
use crate::shared::config::ConnectivityConfig;
use crate::shared::error::AppError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Decides reachability by hitting a cheap endpoint on the API host.
/// Any HTTP response counts as online; only transport failures count as offline.
pub struct ReachabilityProbe {
    client: Client,
    url: String,
    interval: Duration,
}

impl ReachabilityProbe {
    pub fn new(
        base_url: &str,
        path: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            interval,
        })
    }

    pub fn from_config(base_url: &str, config: &ConnectivityConfig) -> Result<Self, AppError> {
        Self::new(
            base_url,
            &config.probe_path,
            config.interval(),
            config.timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn probe_once(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                tracing::trace!(
                    target: "lunch::connectivity",
                    status = response.status().as_u16(),
                    "probe reached server"
                );
                true
            }
            Err(err) => {
                tracing::debug!(target: "lunch::connectivity", error = %err, "probe failed");
                false
            }
        }
    }

    pub fn spawn(self: Arc<Self>, monitor: Arc<ConnectivityMonitor>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let online = self.probe_once().await;
                monitor.set_online(online);
            }
        })
    }
}
