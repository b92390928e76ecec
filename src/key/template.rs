//! Key Template Module
//!
//! Compiles format-style key templates and renders them against captured
//! call arguments.
//!
//! Supported placeholder forms: `{0}` (positional), `{name}` (named),
//! `{name.field}` (object field) and `{name[idx]}` (array index or object
//! key). `{{` and `}}` escape literal braces. One level of structured
//! access only.

use serde_json::Value;

use crate::error::{CacheError, Result};
use crate::key::CallArgs;

// == Segment Model ==
/// One compiled piece of a template.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Literal text, emitted verbatim
    Text(String),
    /// A `{...}` placeholder
    Placeholder {
        target: Target,
        access: Option<Access>,
    },
}

/// What a placeholder addresses.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    /// `{0}` style positional reference
    Index(usize),
    /// `{name}` style named reference
    Name(String),
}

/// Optional one-level structured access on the addressed value.
#[derive(Debug, Clone, PartialEq)]
enum Access {
    /// `.field` object field lookup
    Field(String),
    /// `[idx]` array index or object key lookup
    Index(String),
}

// == Template ==
/// A key template compiled once at decoration time.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    // == Compile ==
    /// Parses `source` into segments.
    ///
    /// Malformed syntax (unbalanced braces, empty or nested placeholders)
    /// is a `Configuration` error so it surfaces when the decorator is
    /// built, not on some later call.
    pub fn compile(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '}' => {
                    return Err(CacheError::Configuration(format!(
                        "single '}}' in key template: {source}"
                    )));
                }
                '{' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => {
                                return Err(CacheError::Configuration(format!(
                                    "nested '{{' in key template: {source}"
                                )));
                            }
                            Some(c) => body.push(c),
                            None => {
                                return Err(CacheError::Configuration(format!(
                                    "unterminated placeholder in key template: {source}"
                                )));
                            }
                        }
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(parse_placeholder(&body, source)?);
                }
                _ => text.push(ch),
            }
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    // == Render ==
    /// Substitutes every placeholder from `args` and returns the key.
    ///
    /// A reference to a missing positional slot, name, field or index is a
    /// `KeyResolution` error.
    pub fn render(&self, args: &CallArgs) -> Result<String> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder { target, access } => {
                    let base = match target {
                        Target::Index(index) => args.by_index(*index).ok_or_else(|| {
                            CacheError::KeyResolution(format!(
                                "positional argument {index} out of range"
                            ))
                        })?,
                        Target::Name(name) => args.by_name(name).ok_or_else(|| {
                            CacheError::KeyResolution(format!("no argument named '{name}'"))
                        })?,
                    };

                    let value = match access {
                        None => base,
                        Some(access) => apply_access(base, access)?,
                    };

                    out.push_str(&format_value(value));
                }
            }
        }

        Ok(out)
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

// == Placeholder Parsing ==
/// Parses the body of one `{...}` placeholder. Whichever of `.` / `[`
/// comes first wins, so a dot inside `[...]` belongs to the index text.
fn parse_placeholder(body: &str, source: &str) -> Result<Segment> {
    let dot = body.find('.');
    let open = body.find('[');

    let (base, access) = match (dot, open) {
        (Some(dot), open) if open.map_or(true, |open| dot < open) => {
            let field = &body[dot + 1..];
            if field.is_empty() || field.contains(['.', '[']) {
                return Err(CacheError::Configuration(format!(
                    "only one level of field access is supported in key template: {source}"
                )));
            }
            (&body[..dot], Some(Access::Field(field.to_string())))
        }
        (_, Some(open)) => {
            let rest = &body[open + 1..];
            let Some(close) = rest.find(']') else {
                return Err(CacheError::Configuration(format!(
                    "unterminated '[' in key template: {source}"
                )));
            };
            let index = &rest[..close];
            if index.is_empty() || !rest[close + 1..].is_empty() {
                return Err(CacheError::Configuration(format!(
                    "only one level of index access is supported in key template: {source}"
                )));
            }
            (&body[..open], Some(Access::Index(index.to_string())))
        }
        (_, None) => (body, None),
    };

    if base.is_empty() {
        return Err(CacheError::Configuration(format!(
            "empty placeholder in key template: {source}"
        )));
    }

    let target = if base.chars().all(|c| c.is_ascii_digit()) {
        let index = base.parse().map_err(|_| {
            CacheError::Configuration(format!("positional index too large in key template: {source}"))
        })?;
        Target::Index(index)
    } else {
        Target::Name(base.to_string())
    };

    Ok(Segment::Placeholder { target, access })
}

// == Structured Access ==
/// Applies one level of `.field` or `[idx]` access to a value.
fn apply_access<'a>(value: &'a Value, access: &Access) -> Result<&'a Value> {
    match access {
        Access::Field(field) => value.get(field.as_str()).ok_or_else(|| {
            CacheError::KeyResolution(format!("value has no field '{field}'"))
        }),
        Access::Index(index) => match value {
            Value::Array(items) => {
                let parsed: usize = index.parse().map_err(|_| {
                    CacheError::KeyResolution(format!("'{index}' is not an array index"))
                })?;
                items.get(parsed).ok_or_else(|| {
                    CacheError::KeyResolution(format!("array index {parsed} out of range"))
                })
            }
            Value::Object(map) => map.get(index).ok_or_else(|| {
                CacheError::KeyResolution(format!("value has no entry '{index}'"))
            }),
            _ => Err(CacheError::KeyResolution(format!(
                "value is not indexable by '{index}'"
            ))),
        },
    }
}

// == Value Rendering ==
/// Renders a substituted value into key text. Strings render without
/// surrounding quotes; everything else renders as compact JSON.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
