use serde::Deserialize;

/// Main configuration structure for Quote Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

/// Harvest run parameters
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of page fetches for the whole run, across all workers
    #[serde(rename = "request-limit")]
    pub request_limit: u64,

    /// Number of seeds paginated concurrently
    #[serde(rename = "pool-size")]
    pub pool_size: usize,

    /// Maximum number of pending seeds loaded for one run
    #[serde(rename = "pending-seed-cap", default = "default_pending_seed_cap")]
    pub pending_seed_cap: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Fallback page URL pattern, e.g. `{seed}/page/{page}/`
    ///
    /// Lets a worker step over a single failed page.
    #[serde(rename = "page-url-template", default)]
    pub page_url_template: Option<String>,
}

fn default_pending_seed_cap() -> usize {
    900
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path of the CSV export
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path of the JSON export
    #[serde(rename = "json-path")]
    pub json_path: String,
}

/// A seed listing to import into the seed store
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Stable identifier of the seed
    pub id: String,

    /// First page of the listing
    #[serde(rename = "page-url")]
    pub page_url: String,
}
