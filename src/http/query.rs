//! Ordered query string parameters.
//!
//! # Design Decisions
//! - Names may repeat; each value is its own entry
//! - Insertion order is kept for serialization
//! - `to_query_string` distinguishes "no query" (`None`) from any rendered query

use std::fmt;
use std::str::FromStr;

use axum::http::Uri;
use url::form_urlencoded;
use url::Url;

/// A single name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered multiset of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    params: Vec<Param>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (percent-encoded) query string. Blank input gives an empty instance.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        if query.trim().is_empty() {
            return Self::new();
        }
        form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| Param::new(name, value))
            .collect()
    }

    /// Parameters from the query component of a request URI.
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    /// Parameters from the query component of a URL.
    pub fn from_url(url: &Url) -> Self {
        url.query().map(Self::parse).unwrap_or_default()
    }

    /// A query string holding `name` once per value.
    pub fn with<I, V>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut query = Self::new();
        query.add(name, values);
        query
    }

    /// Append `name` once per value. No values is a no-op.
    pub fn add<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.params
            .extend(values.into_iter().map(|value| Param::new(name, value)));
    }

    /// Append a URL as the value of `name`.
    pub fn add_url(&mut self, name: &str, url: &Url) {
        self.add(name, [url.as_str()]);
    }

    /// First entry named exactly `name`.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Value of the first entry named exactly `name`.
    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.value.as_str())
    }

    /// Every value recorded for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.name == name)
            .map(|p| p.value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every entry whose name matches `name` ignoring ASCII case.
    /// Remaining entries keep their order.
    pub fn remove(&mut self, name: &str) -> Vec<Param> {
        let (removed, kept): (Vec<Param>, Vec<Param>) = std::mem::take(&mut self.params)
            .into_iter()
            .partition(|p| p.name.eq_ignore_ascii_case(name));
        self.params = kept;
        removed
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    /// Render as `a=1&b=2`, percent-encoded. `None` when there is nothing to render,
    /// so callers can leave the `?` out entirely.
    pub fn to_query_string(&self) -> Option<String> {
        if self.params.is_empty() {
            return None;
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for param in &self.params {
            serializer.append_pair(&param.name, &param.value);
        }
        Some(serializer.finish())
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_query_string().as_deref().unwrap_or_default())
    }
}

impl FromStr for QueryString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl FromIterator<Param> for QueryString {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl Extend<Param> for QueryString {
    fn extend<I: IntoIterator<Item = Param>>(&mut self, iter: I) {
        self.params.extend(iter);
    }
}

impl IntoIterator for QueryString {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryString {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_and_keeps_order() {
        let query = QueryString::parse("b=2&a=hello+world&b=%2Fx%3Fy");
        let pairs: Vec<_> = query.iter().map(|p| (p.name.as_str(), p.value.as_str())).collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "hello world"), ("b", "/x?y")]);
        assert_eq!(query.get_value("b"), Some("2"));
        assert_eq!(query.get_all("b"), vec!["2", "/x?y"]);
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(QueryString::parse("").is_empty());
        assert!(QueryString::parse("   ").is_empty());
        assert!(QueryString::parse("?").is_empty());
        assert_eq!(QueryString::parse("").to_query_string(), None);
        assert_eq!(QueryString::new().to_string(), "");
    }

    #[test]
    fn test_from_uri() {
        let uri: Uri = "/search?q=rust&page=2".parse().unwrap();
        let query = QueryString::from_uri(&uri);
        assert_eq!(query.get_value("q"), Some("rust"));
        assert_eq!(query.get_value("page"), Some("2"));

        let bare: Uri = "/search".parse().unwrap();
        assert!(QueryString::from_uri(&bare).is_empty());
    }

    #[test]
    fn test_add_one_entry_per_value() {
        let mut query = QueryString::new();
        query.add("tag", ["a", "b"]);
        query.add("none", Vec::<String>::new());
        assert_eq!(query.len(), 2);
        assert!(!query.contains("none"));
        assert_eq!(query.to_query_string().as_deref(), Some("tag=a&tag=b"));
    }

    #[test]
    fn test_remove_is_case_insensitive_and_stable() {
        let mut query = QueryString::parse("a=1&Name=x&b=2&NAME=y&c=3");
        let removed = query.remove("name");
        assert_eq!(
            removed,
            vec![Param::new("Name", "x"), Param::new("NAME", "y")]
        );
        assert_eq!(query.to_query_string().as_deref(), Some("a=1&b=2&c=3"));
    }

    #[test]
    fn test_get_is_exact() {
        let query = QueryString::with("Name", ["x"]);
        assert!(query.get("name").is_none());
        assert_eq!(query.get("Name"), Some(&Param::new("Name", "x")));
    }

    #[test]
    fn test_rendered_query_parses_back() {
        let mut query = QueryString::new();
        query.add("q", ["rust & tokio"]);
        query.add("redirect", ["/app/profile?id=1"]);
        query.add("q", ["ünïcode"]);

        let rendered = query.to_query_string().unwrap();
        assert_eq!(QueryString::parse(&rendered), query);
    }

    #[test]
    fn test_add_url() {
        let mut query = QueryString::new();
        query.add_url("next", &Url::parse("http://example.com/a?b=c").unwrap());
        assert_eq!(
            query.to_string(),
            "next=http%3A%2F%2Fexample.com%2Fa%3Fb%3Dc"
        );
    }
}
