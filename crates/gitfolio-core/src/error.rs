use gitfolio_api::GitHubError;
use gitfolio_cache::CacheError;
use thiserror::Error;

/// Everything that can go wrong while building a profile view
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] GitHubError),

    #[error("Cache operation failed: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown sort key: {0}")]
    InvalidSortKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_offline())
    }
}

/// Why the initial load failed, as far as the user cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    Offline,
    NotFound,
    Other,
}

impl LoadFailure {
    /// Connectivity wins over any HTTP status
    pub fn classify(err: &Error) -> Self {
        if err.is_offline() {
            LoadFailure::Offline
        } else if err.is_not_found() {
            LoadFailure::NotFound
        } else {
            LoadFailure::Other
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoadFailure::Offline => {
                "Network connection lost. Please check your internet connection."
            }
            LoadFailure::NotFound => "GitHub user not found. Please check the username.",
            LoadFailure::Other => "Failed to load data from GitHub. Please try again later.",
        }
    }
}

const ERROR_TITLES: [&str; 5] = [
    "Oops! Something Went Wrong",
    "Connection Failed",
    "Data Loading Error",
    "Technical Difficulties",
    "Awaa~... >_<'",
];

/// Full-screen error state shown when the profile can't be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub title: &'static str,
    pub message: &'static str,
    pub failure: LoadFailure,
}

impl ErrorPage {
    pub fn new(err: &Error) -> Self {
        // v4 uuids are 122 random bits, plenty for picking a title
        let roll = uuid::Uuid::new_v4().as_bytes()[0] as usize;
        Self::with_title_index(err, roll)
    }

    pub fn with_title_index(err: &Error, index: usize) -> Self {
        let failure = LoadFailure::classify(err);
        Self {
            title: ERROR_TITLES[index % ERROR_TITLES.len()],
            message: failure.message(),
            failure,
        }
    }

    pub fn titles() -> &'static [&'static str] {
        &ERROR_TITLES
    }
}
