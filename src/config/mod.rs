use std::env;
use std::path::PathBuf;

/// Server configuration, loaded once at startup and immutable afterwards.
///
/// Environment variable names match the deployment surface of the service:
/// `port`, `stamp`, `directory`, `urlUpload`, `urlDownload`, `tokenUploader`,
/// `tokenDownload`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (default: 2005)
    pub port: u16,

    /// Marker string embedded in every generated filename; used later to
    /// recover the original name (default: "fileServer")
    pub stamp: String,

    /// Directory all uploads are stored in (default: "uploads")
    pub directory: PathBuf,

    /// Path the upload endpoint is mounted at, without leading slash
    /// (default: "upload")
    pub url_upload: String,

    /// Download path prefix; empty means any GET path resolves a stored
    /// name directly (default: "")
    pub url_download: String,

    /// Shared secret required in the `token` header of uploads; `None`
    /// disables the check
    pub token_upload: Option<String>,

    /// Shared secret required as the `token` query parameter of downloads;
    /// `None` disables the check
    pub token_download: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 2005,
            stamp: "fileServer".to_string(),
            directory: PathBuf::from("uploads"),
            url_upload: "upload".to_string(),
            url_download: String::new(),
            token_upload: None,
            token_download: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("port")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            stamp: env::var("stamp").unwrap_or(default.stamp),

            directory: env::var("directory")
                .map(PathBuf::from)
                .unwrap_or(default.directory),

            url_upload: env::var("urlUpload").unwrap_or(default.url_upload),

            url_download: env::var("urlDownload").unwrap_or(default.url_download),

            token_upload: env::var("tokenUploader").ok(),

            token_download: env::var("tokenDownload").ok(),
        }
    }
}
