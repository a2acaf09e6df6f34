// Public modules
pub mod defaults;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod package_manager;
pub mod paths;
pub mod prompt;
pub mod refactor;
pub mod template;
pub mod upgrade;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
