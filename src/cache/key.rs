//! Key Codec Module
//!
//! Derives stable storage keys from a namespace plus an identity.
//!
//! Keys have the shape `namespace` (singletons), `namespace:id` (scalar
//! identities) or `namespace:<sha256>` (free text plus a filter set). The
//! namespace is always the text before the first `:`, which is what lets
//! the store group records per namespace.

use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;

// == Public Constants ==
/// Separates the namespace from the identity part of a key
pub const NAMESPACE_SEPARATOR: char = ':';

// == Namespace ==
/// Logical categories of cached artifacts used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Product,
    Category,
    Search,
    Homepage,
    Featured,
    Navigation,
    Analytics,
    Asset,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Product => "product",
            Namespace::Category => "category",
            Namespace::Search => "search",
            Namespace::Homepage => "homepage",
            Namespace::Featured => "featured",
            Namespace::Navigation => "navigation",
            Namespace::Analytics => "analytics",
            Namespace::Asset => "asset",
        }
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Identity ==
/// What identifies a cached value inside its namespace.
#[derive(Debug, Clone, Copy)]
pub enum Identity<'a> {
    /// The namespace holds a single value (e.g. the homepage aggregate)
    Singleton,
    /// A scalar identifier such as a product id
    Scalar(&'a str),
    /// Free text plus a structured filter set (e.g. a search)
    Composite { text: &'a str, filters: &'a Value },
}

// == Derive Key ==
/// Maps a namespace and identity to a storage key.
///
/// Composite identities are hashed over a canonical encoding, so two filter
/// sets that differ only in field order produce the same key.
pub fn derive_key(namespace: impl AsRef<str>, identity: Identity<'_>) -> String {
    let namespace = namespace.as_ref();
    match identity {
        Identity::Singleton => namespace.to_string(),
        Identity::Scalar(id) => format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, id),
        Identity::Composite { text, filters } => {
            let mut canonical = String::from("[");
            write_canonical(&Value::String(text.to_string()), &mut canonical);
            canonical.push(',');
            write_canonical(filters, &mut canonical);
            canonical.push(']');
            format!(
                "{}{}{}",
                namespace,
                NAMESPACE_SEPARATOR,
                digest(canonical.as_bytes())
            )
        }
    }
}

/// Key for a namespace holding a single value.
pub fn singleton_key(namespace: impl AsRef<str>) -> String {
    derive_key(namespace, Identity::Singleton)
}

/// Key for a scalar identity, e.g. `product:42`.
pub fn scalar_key(namespace: impl AsRef<str>, id: impl fmt::Display) -> String {
    derive_key(namespace, Identity::Scalar(&id.to_string()))
}

/// Key for free text plus any serializable filter set.
pub fn composite_key<F>(namespace: impl AsRef<str>, text: &str, filters: &F) -> Result<String>
where
    F: Serialize + ?Sized,
{
    let filters = serde_json::to_value(filters)?;
    Ok(derive_key(
        namespace,
        Identity::Composite {
            text,
            filters: &filters,
        },
    ))
}

// == Namespace Of ==
/// Returns the namespace part of a key.
pub fn namespace_of(key: &str) -> &str {
    key.split(NAMESPACE_SEPARATOR).next().unwrap_or(key)
}

// == Canonical Encoding ==
/// Encodes a JSON value with object fields sorted and null fields dropped.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !v.is_null()).collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(number) => out.push_str(&canonical_number(number)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Integral floats are written as integers, so `100.0` encodes like `100`.
fn canonical_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => (f as u64).to_string(),
        _ => number.to_string(),
    }
}

/// Hex SHA-256 digest.
pub(crate) fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
