use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Browser / page errors
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    /// Ledger, answer store and config file errors
    #[error("file error: {0}")]
    File(#[from] FileError),
    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Login failed, fatal to the run
    #[error("login failed: {0}")]
    Auth(#[from] AuthError),
    /// Anything else (wraps third-party messages)
    #[error("error: {0}")]
    Other(String),
}

/// Browser related errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("cannot connect to browser (port: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("cannot launch browser: {source}")]
    LaunchFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("browser configuration failed: {0}")]
    ConfigurationFailed(String),
    #[error("failed to create page: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("navigation to {url} failed: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// click / type / upload / select on an element failed
    #[error("{action} failed: {source}")]
    ElementActionFailed {
        action: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("element is gone: {0}")]
    StaleElement(String),
}

/// File errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {path}")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to parse TOML {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{field}` must not be empty")]
    EmptyList { field: &'static str },
    #[error("experience level {0} is not in 1..=6")]
    InvalidExperienceLevel(u8),
    #[error("upload for {slot} not found: {path}")]
    UploadMissing { slot: &'static str, path: String },
    #[error("environment variable {var_name} could not be parsed: '{value}' is not {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    #[error("no username configured")]
    MissingUsername,
}

/// Login errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login form element missing: {0}")]
    FormNotFound(&'static str),
    #[error("account challenge (two-factor / reset) required at {url}")]
    Challenge { url: String },
    #[error("not signed in after submitting credentials (at {url})")]
    Rejected { url: String },
}

// ========== conversions from common error types ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ElementActionFailed {
            action: "cdp command",
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== convenience constructors ==========

impl AppError {
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    pub fn element_action_failed(
        action: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ElementActionFailed {
            action,
            source: Box::new(source),
        })
    }

    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
