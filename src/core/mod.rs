// Public modules
pub mod coords;
pub mod error;
pub mod fits;
pub mod header;
pub mod keywords;
pub mod legacy;
pub mod matcher;
pub mod prompt;
pub mod readnoise;
pub mod resolve;
pub mod update;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use header::{Card, Header, HeaderValue, Metadata};
