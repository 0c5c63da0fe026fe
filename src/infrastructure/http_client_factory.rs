use crate::config::BinanceConfig;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates an HTTP client that retries transient failures with
    /// exponential backoff, using the timeouts and retry budget in `config`.
    pub fn create_client(config: &BinanceConfig) -> ClientWithMiddleware {
        let client = Client::builder()
            .pool_max_idle_per_host(20)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        let builder = ClientBuilder::new(client);
        if config.max_retries == 0 {
            return builder.build();
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        builder
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}
