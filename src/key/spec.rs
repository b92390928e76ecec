//! Key Specification Module
//!
//! The rule a decorator uses to derive a cache key from call arguments.

use std::fmt;
use std::sync::Arc;

use crate::error::{CacheError, Result};
use crate::key::{CallArgs, Template};

// == Key Generator ==
/// A caller-supplied closure deriving a key from the captured arguments.
pub type KeyGenerator = Arc<dyn Fn(&CallArgs) -> Result<String> + Send + Sync>;

// == Key Spec ==
/// How a cache key is derived from a call. Immutable once built.
///
/// Literals are compile-time-cheap and enable cross-function key sharing
/// (an invalidating function keyed to a caching function's own key),
/// templates cover the common argument-derived cases, and generators give
/// full programmability for composite keys without the engine knowing the
/// call signature in advance.
#[derive(Clone)]
pub enum KeySpec {
    /// A fixed key, returned verbatim regardless of arguments
    Literal(String),
    /// A compiled format-style template (see [`Template`])
    Template(Template),
    /// A key-generating closure, invoked with the full argument capture
    Generator(KeyGenerator),
}

impl KeySpec {
    // == Parse ==
    /// Builds a spec from key text: a compiled template when the text
    /// contains placeholders (or brace escapes), otherwise a literal.
    pub fn parse(text: &str) -> Result<Self> {
        if text.contains(['{', '}']) {
            Ok(KeySpec::Template(Template::compile(text)?))
        } else {
            Ok(KeySpec::Literal(text.to_string()))
        }
    }

    // == Generator Constructor ==
    /// Wraps a closure as a key spec. The closure's output is used as the
    /// key as-is; no template substitution is applied to it.
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<String> + Send + Sync + 'static,
    {
        KeySpec::Generator(Arc::new(f))
    }

    // == Resolve ==
    /// Derives the concrete key for one call.
    ///
    /// Fails with `KeyResolution` when a referenced positional index is out
    /// of range, a named parameter, field or index is absent, or the
    /// generator itself fails.
    pub fn resolve(&self, args: &CallArgs) -> Result<String> {
        match self {
            KeySpec::Literal(key) => Ok(key.clone()),
            KeySpec::Template(template) => template.render(args),
            KeySpec::Generator(generate) => generate(args)
                .map_err(|err| CacheError::KeyResolution(format!("key generator failed: {err}"))),
        }
    }
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Literal(key) => f.debug_tuple("Literal").field(key).finish(),
            KeySpec::Template(template) => f.debug_tuple("Template").field(&template.source()).finish(),
            KeySpec::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

// == Key Source ==
/// Key text or a ready spec, as accepted by the options builder. Raw text
/// is compiled (and validated) when the decorator is built.
#[derive(Debug, Clone)]
pub enum KeySource {
    Raw(String),
    Spec(KeySpec),
}

impl KeySource {
    /// Compiles raw text into a spec; passes ready specs through.
    pub fn into_spec(self) -> Result<KeySpec> {
        match self {
            KeySource::Raw(text) => KeySpec::parse(&text),
            KeySource::Spec(spec) => Ok(spec),
        }
    }
}

impl From<&str> for KeySource {
    fn from(text: &str) -> Self {
        KeySource::Raw(text.to_string())
    }
}

impl From<String> for KeySource {
    fn from(text: String) -> Self {
        KeySource::Raw(text)
    }
}

impl From<KeySpec> for KeySource {
    fn from(spec: KeySpec) -> Self {
        KeySource::Spec(spec)
    }
}
