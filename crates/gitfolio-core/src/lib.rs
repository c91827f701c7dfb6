// Core logic for the profile view: models, the repository gallery
// controller, pure renderers and the initial profile load
pub mod collection;
pub mod config;
pub mod debounce;
pub mod error;
pub mod handle;
pub mod loader;
pub mod models;
pub mod profile;
pub mod providers;
pub mod render;
pub mod theme;

pub use collection::{PageSizing, RepositoryCollection, ViewState};
pub use config::Config;
pub use debounce::Debouncer;
pub use error::{Error, ErrorPage, LoadFailure};
pub use gitfolio_api::StarredCount;
pub use handle::resolve_handle;
pub use loader::{enrich_languages, load_profile, LoadedProfile, ProfileSource};
pub use models::{Account, Repository, SortKey};
pub use profile::ProfileCard;
pub use providers::GitHubProvider;
pub use render::{LanguageDisplayPolicy, PaginationView, RepoCard};
pub use theme::{Theme, ThemePreference};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
