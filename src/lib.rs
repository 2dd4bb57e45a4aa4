pub mod config;
pub mod errors;
pub mod extract;
pub mod features;
pub mod fetch;
pub mod html_table;
pub mod http_client;
pub mod ingest;
pub mod record;
pub mod record_store;
pub mod retry;
pub mod teams;
