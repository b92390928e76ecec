//! Key Resolution Module
//!
//! Derives concrete string cache keys from call arguments via literals,
//! compiled templates, or key-generating closures.

mod args;
mod spec;
mod template;

// Re-export public types
pub use args::CallArgs;
pub use spec::{KeyGenerator, KeySource, KeySpec};
pub use template::Template;
