pub mod assertion;
pub mod config;
pub mod error;
pub mod fixture;
pub mod http;
pub mod logger;
pub mod mercado;
pub mod report;
pub mod spec;
pub mod suite;

// Re-export commonly used types
pub use error::{HarnessError, Result};
pub use spec::Spec;
