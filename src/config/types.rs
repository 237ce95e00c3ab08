use serde::Deserialize;
use std::path::PathBuf;

/// Browser identification sent with every outbound request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Main configuration structure for Track-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target page configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageConfig {
    /// The page to harvest; may be supplied on the command line instead
    pub url: Option<String>,
}

/// Link extraction heuristic configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Class carried by every track title element
    #[serde(rename = "title-class", default = "default_title_class")]
    pub title_class: String,

    /// Suffix an anchor's href must end with to count as a track link
    #[serde(rename = "link-suffix", default = "default_link_suffix")]
    pub link_suffix: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total time allowed for one request, body included (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Download output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory downloaded files are written into
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Extension appended to each sanitized title
    #[serde(rename = "file-extension", default = "default_file_extension")]
    pub file_extension: String,

    /// Issue a HEAD request to report each file's size before downloading it
    #[serde(rename = "probe-before-download", default = "default_true")]
    pub probe_before_download: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            title_class: default_title_class(),
            link_suffix: default_link_suffix(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_extension: default_file_extension(),
            probe_before_download: true,
        }
    }
}

fn default_title_class() -> String {
    "prch-title".to_string()
}

fn default_link_suffix() -> String {
    ".mp3".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_extension() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}
