use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SchemaError;

/// A typed caps field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapsValue {
    Int(i64),
    Fraction(i32, i32),
    Str(String),
}

impl CapsValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CapsValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CapsValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for CapsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapsValue::Int(v) => write!(f, "(int){v}"),
            CapsValue::Fraction(num, den) => write!(f, "(fraction){num}/{den}"),
            CapsValue::Str(s) if needs_quoting(s) => {
                write!(f, "(string)\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            CapsValue::Str(s) => write!(f, "(string){s}"),
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | ';' | '"' | '=' | '(' | ')'))
}

/// A fixed, negotiated capability description: a media type name plus
/// named fields, e.g. `audio/x-raw, format=S16LE, rate=8000, channels=2`.
///
/// Only the first structure of a multi-structure caps string is kept, since
/// a negotiated caps describes exactly one format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caps {
    name: String,
    fields: BTreeMap<String, CapsValue>,
}

impl Caps {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: CapsValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_int(self, key: impl Into<String>, value: i64) -> Self {
        self.with_field(key, CapsValue::Int(value))
    }

    pub fn with_str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(key, CapsValue::Str(value.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn get(&self, key: &str) -> Option<&CapsValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(CapsValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(CapsValue::as_int)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CapsValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.fields {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for Caps {
    type Err = SchemaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let structures = split_top_level(input, ';')?;
        let first = structures
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .ok_or_else(|| SchemaError::malformed("empty caps"))?;

        let mut parts = split_top_level(first, ',')?.into_iter();
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() || name.contains('=') {
            return Err(SchemaError::malformed(format!(
                "caps \"{first}\" does not start with a media type name"
            )));
        }

        let mut caps = Caps::new(name);
        for part in parts {
            let (key, raw) = part.split_once('=').ok_or_else(|| {
                SchemaError::malformed(format!("field \"{}\" is not key=value", part.trim()))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SchemaError::malformed(format!(
                    "field \"{}\" has an empty name",
                    part.trim()
                )));
            }
            let value = parse_value(key, raw)?;
            caps.fields.insert(key.to_string(), value);
        }
        Ok(caps)
    }
}

/// Splits on `sep` outside of quotes and `{}`/`[]`/`<>` lists.
fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, SchemaError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '{' | '[' | '<' => depth += 1,
            '}' | ']' | '>' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(SchemaError::malformed("unterminated quoted value"));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_value(key: &str, raw: &str) -> Result<CapsValue, SchemaError> {
    let raw = raw.trim();
    let (annotation, body) = match raw.strip_prefix('(') {
        Some(rest) => {
            let end = rest.find(')').ok_or_else(|| {
                SchemaError::malformed(format!("unclosed type annotation on field \"{key}\""))
            })?;
            (Some(rest[..end].trim()), rest[end + 1..].trim())
        }
        None => (None, raw),
    };

    if let Some(quoted) = body.strip_prefix('"') {
        let inner = quoted.strip_suffix('"').ok_or_else(|| {
            SchemaError::malformed(format!("unterminated quoted value on field \"{key}\""))
        })?;
        return Ok(CapsValue::Str(unescape(inner)));
    }
    if body.is_empty() {
        return Err(SchemaError::malformed(format!("field \"{key}\" has no value")));
    }

    match annotation {
        Some("int" | "i") => body.parse().map(CapsValue::Int).map_err(|_| {
            SchemaError::malformed(format!("field \"{key}\" is not an integer: \"{body}\""))
        }),
        Some("fraction") => parse_fraction(body).ok_or_else(|| {
            SchemaError::malformed(format!("field \"{key}\" is not a fraction: \"{body}\""))
        }),
        Some(_) => Ok(CapsValue::Str(body.to_string())),
        None => Ok(body
            .parse()
            .map(CapsValue::Int)
            .ok()
            .or_else(|| parse_fraction(body))
            .unwrap_or_else(|| CapsValue::Str(body.to_string()))),
    }
}

fn parse_fraction(body: &str) -> Option<CapsValue> {
    let (num, den) = body.split_once('/')?;
    let num = num.trim().parse().ok()?;
    let den: i32 = den.trim().parse().ok()?;
    (den != 0).then_some(CapsValue::Fraction(num, den))
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
