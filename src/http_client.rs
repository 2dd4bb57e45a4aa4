use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::Config;

const USER_AGENT: &str = "Mozilla/5.0 (gridiron_dataset)";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client for every fetch worker. Built from the first config it sees;
/// the idle pool is sized to the worker count so a full fan-out reuses connections.
pub fn http_client(config: &Config) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(config.fetch_parallelism.max(1) * 2)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}
