//! Where raw parameter values come from.

use std::collections::HashMap;

use crate::http::query::QueryString;
use crate::http::request::RequestInfo;

/// Untyped, possibly multi-valued request parameters.
pub trait ParamSource {
    /// The first value of `name`.
    fn first_value(&self, name: &str) -> Option<&str>;

    /// Every value of `name`, in order.
    fn all_values(&self, name: &str) -> Vec<&str>;

    fn contains(&self, name: &str) -> bool {
        self.first_value(name).is_some()
    }
}

impl ParamSource for QueryString {
    fn first_value(&self, name: &str) -> Option<&str> {
        self.get_value(name)
    }

    fn all_values(&self, name: &str) -> Vec<&str> {
        self.get_all(name)
    }
}

impl ParamSource for HashMap<String, Vec<String>> {
    fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    fn all_values(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl ParamSource for HashMap<String, String> {
    fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }

    fn all_values(&self, name: &str) -> Vec<&str> {
        self.first_value(name).into_iter().collect()
    }
}

impl ParamSource for dyn RequestInfo + '_ {
    fn first_value(&self, name: &str) -> Option<&str> {
        self.parameters().first_value(name)
    }

    fn all_values(&self, name: &str) -> Vec<&str> {
        self.parameters().all_values(name)
    }
}
