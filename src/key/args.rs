//! Call Arguments Module
//!
//! Captures one invocation's arguments for key resolution.

use std::collections::HashMap;

use serde_json::Value;

// == Call Args ==
/// The positional and named arguments of a single call.
///
/// Captured per invocation, consumed by key resolution, then discarded.
/// Values are stored as `serde_json::Value` so any serializable argument
/// can participate in key derivation.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl CallArgs {
    // == Constructor ==
    /// Creates an empty argument capture.
    pub fn new() -> Self {
        Self::default()
    }

    // == Positional ==
    /// Appends a positional argument.
    pub fn positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    // == Named ==
    /// Binds a value to a parameter name.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    // == Param ==
    /// Binds a value both positionally and by name, mirroring a named
    /// parameter that was passed in positional order. `{n}` and `{name}`
    /// then resolve to the same value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.positional.push(value.clone());
        self.named.insert(name.into(), value);
        self
    }

    // == Lookup By Index ==
    /// Returns the positional argument at `index`, if present.
    pub fn by_index(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    // == Lookup By Name ==
    /// Returns the value bound to `name`, if present.
    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    // == Length ==
    /// Returns the number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Returns true if no arguments were captured at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_args() {
        let args = CallArgs::new();
        assert!(args.is_empty());
        assert_eq!(args.len(), 0);
        assert!(args.by_index(0).is_none());
        assert!(args.by_name("anything").is_none());
    }

    #[test]
    fn test_positional_order() {
        let args = CallArgs::new().positional("first").positional(2).positional(true);

        assert_eq!(args.len(), 3);
        assert_eq!(args.by_index(0), Some(&json!("first")));
        assert_eq!(args.by_index(1), Some(&json!(2)));
        assert_eq!(args.by_index(2), Some(&json!(true)));
        assert!(args.by_index(3).is_none());
    }

    #[test]
    fn test_named_lookup() {
        let args = CallArgs::new().named("keyword", "key");

        assert_eq!(args.by_name("keyword"), Some(&json!("key")));
        assert!(args.by_name("other").is_none());
        // named-only arguments do not occupy positional slots
        assert_eq!(args.len(), 0);
    }

    #[test]
    fn test_param_binds_both_ways() {
        let args = CallArgs::new().param("count", 7);

        assert_eq!(args.by_index(0), Some(&json!(7)));
        assert_eq!(args.by_name("count"), Some(&json!(7)));
        assert_eq!(args.by_index(0), args.by_name("count"));
    }

    #[test]
    fn test_structured_values() {
        let args = CallArgs::new()
            .named("arglist", json!(["key", "dummy"]))
            .named("argdict", json!({"lookup": "key"}));

        assert_eq!(args.by_name("arglist").unwrap()[0], json!("key"));
        assert_eq!(args.by_name("argdict").unwrap()["lookup"], json!("key"));
    }
}
