/// Server configuration loaded from environment variables.
///
/// All fields except the external-service credentials have sensible
/// defaults suitable for local development. In production, override
/// via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Pause between consecutive platform media uploads, in milliseconds.
    pub upload_delay_ms: u64,
    /// Drive asset-store credentials.
    pub drive: DriveConfig,
    /// Meta advertising platform credentials.
    pub meta: MetaConfig,
}

/// Google Drive API configuration.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_url: String,
    pub api_key: String,
    /// Folder holding one asset subfolder per package, named by
    /// external id.
    pub root_folder_id: String,
}

/// Meta Marketing API configuration.
#[derive(Debug, Clone)]
pub struct MetaConfig {
    pub api_url: String,
    pub access_token: String,
    pub ad_account_id: String,
    pub page_id: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                           |
    /// | `PORT`                 | `3000`                              |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`             |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                |
    /// | `UPLOAD_DELAY_MS`      | `500`                               |
    /// | `DRIVE_API_URL`        | `https://www.googleapis.com/drive/v3` |
    /// | `DRIVE_API_KEY`        | (required)                          |
    /// | `DRIVE_ROOT_FOLDER_ID` | (required)                          |
    /// | `META_API_URL`         | `https://graph.facebook.com/v21.0`  |
    /// | `META_ACCESS_TOKEN`    | (required)                          |
    /// | `META_AD_ACCOUNT_ID`   | (required)                          |
    /// | `META_PAGE_ID`         | (required)                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_delay_ms: u64 = std::env::var("UPLOAD_DELAY_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("UPLOAD_DELAY_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_delay_ms,
            drive: DriveConfig::from_env(),
            meta: MetaConfig::from_env(),
        }
    }
}

impl DriveConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("DRIVE_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".into()),
            api_key: std::env::var("DRIVE_API_KEY").expect("DRIVE_API_KEY must be set"),
            root_folder_id: std::env::var("DRIVE_ROOT_FOLDER_ID")
                .expect("DRIVE_ROOT_FOLDER_ID must be set"),
        }
    }
}

impl MetaConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("META_API_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/v21.0".into()),
            access_token: std::env::var("META_ACCESS_TOKEN").expect("META_ACCESS_TOKEN must be set"),
            ad_account_id: std::env::var("META_AD_ACCOUNT_ID")
                .expect("META_AD_ACCOUNT_ID must be set"),
            page_id: std::env::var("META_PAGE_ID").expect("META_PAGE_ID must be set"),
        }
    }
}
