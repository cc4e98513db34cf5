pub mod loader;
pub mod types;

pub use loader::{BASE_URL_OVERRIDE, ConfigLoader, ENV_SELECTOR, resolve_env_vars};
pub use types::{ConfigFile, DEFAULT_BASE_URL, Environment, Settings};
