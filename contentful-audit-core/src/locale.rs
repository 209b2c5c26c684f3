//! Picking one value out of a field that may be stored once per locale.
//!
//! Single-locale Delivery responses hold plain values (`"slug": "home"`), while
//! `locale=*` Delivery responses and every Management response hold locale maps
//! (`"slug": {"en-US": "home"}`). [`LocaleFallback`] accepts both shapes.

use serde_json::{Map, Value};

const DEFAULT_LOCALES: [&str; 3] = ["en", "en-US", "en-GB"];

/// Ordered list of locale keys to try. Order is configuration, not a ranking of locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFallback {
    order: Vec<String>,
}

impl Default for LocaleFallback {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALES)
    }
}

impl LocaleFallback {
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Resolve a field value to its single-locale form.
    ///
    /// Plain values are returned as-is. For locale maps the configured locales are tried in
    /// order, then the first present value of the map is used.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        if !is_locale_map(value) {
            return Some(value).filter(|v| is_present(v));
        }
        let map = value.as_object()?;
        self.order
            .iter()
            .filter_map(|locale| map.get(locale))
            .find(|v| is_present(v))
            .or_else(|| map.values().find(|v| is_present(v)))
    }

    pub fn field<'a>(&self, fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
        fields.get(name).and_then(|value| self.resolve(value))
    }

    /// Resolve a text field. Blank strings count as absent.
    pub fn field_str<'a>(&self, fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
        self.field(fields, name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A locale map is an object that is neither a link (`sys`) nor a rich-text node (`nodeType`).
pub fn is_locale_map(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => !map.contains_key("sys") && !map.contains_key("nodeType"),
        None => false,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
