//! Parameter binding.
//!
//! # Responsibilities
//! - Hold one immutable [`FieldSchema`] per bindable type
//! - Copy request parameters into declared fields, coercing each value
//! - Report whether every required parameter was satisfied
//!
//! # Data Flow
//! ```text
//! bind(target, source)
//!     → schema_of::<T>()   (cache hit, or build + insert)
//!     → for each declared field:
//!         source.first_value(name) → coerce → assign
//!     → Ok(all required fields satisfied)
//! ```
//!
//! # Design Decisions
//! - Cache fill is at-least-once: two threads may build the same schema, both
//!   results are equal and the last insert wins
//! - A failed coercion leaves the field untouched and never stops other fields
//! - Unsupported field types are an error, missing values are a `false`

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use crate::observability::metrics;
use crate::params::schema::{Bindable, FieldSchema};
use crate::params::source::ParamSource;
use crate::params::types::BindError;

type CachedSchema = Arc<dyn Any + Send + Sync>;

/// Registry of parameter schemas, keyed by bindable type.
#[derive(Default)]
pub struct ParameterBinder {
    schemas: DashMap<TypeId, CachedSchema>,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide binder for callers that do not own one.
    pub fn global() -> &'static ParameterBinder {
        static GLOBAL: OnceLock<ParameterBinder> = OnceLock::new();
        GLOBAL.get_or_init(ParameterBinder::new)
    }

    /// The schema of `T`, built on first use.
    pub fn schema_of<T: Bindable>(&self) -> Result<Arc<FieldSchema<T>>, BindError> {
        let id = TypeId::of::<T>();

        let cached = self.schemas.get(&id).map(|entry| Arc::clone(entry.value()));
        if let Some(schema) = cached.and_then(|any| any.downcast::<FieldSchema<T>>().ok()) {
            return Ok(schema);
        }

        let schema = Arc::new(FieldSchema::<T>::build()?);
        tracing::debug!(
            bindable = schema.type_name(),
            fields = schema.len(),
            "Cached parameter schema"
        );
        self.schemas.insert(id, Arc::clone(&schema) as CachedSchema);
        Ok(schema)
    }

    /// Number of types with a cached schema.
    pub fn cached_types(&self) -> usize {
        self.schemas.len()
    }

    /// Populate `target` from `source`.
    ///
    /// Returns `Ok(false)` when a required parameter is missing or does not
    /// coerce. Fields whose parameter is absent keep their current value.
    pub fn bind<T, S>(&self, target: &mut T, source: &S) -> Result<bool, BindError>
    where
        T: Bindable,
        S: ParamSource + ?Sized,
    {
        let schema = self.schema_of::<T>()?;
        let mut satisfied = true;

        for field in schema.fields() {
            let parameter = field.parameter();
            let name = parameter.name();

            match source.first_value(name) {
                Some(raw) => {
                    if !field.assign(target, raw) {
                        tracing::warn!(
                            bindable = schema.type_name(),
                            parameter = name,
                            value = raw,
                            field_type = field.type_name(),
                            "Unable to parse parameter value"
                        );
                        if parameter.is_required() {
                            satisfied = false;
                        }
                    }
                }
                None if parameter.is_required() => {
                    tracing::debug!(
                        bindable = schema.type_name(),
                        parameter = name,
                        "Required parameter missing"
                    );
                    satisfied = false;
                }
                None => {}
            }
        }

        metrics::record_binding(satisfied);
        Ok(satisfied)
    }

    /// Like [`bind`](Self::bind), succeeding trivially without a target.
    pub fn bind_optional<T, S>(&self, target: Option<&mut T>, source: &S) -> Result<bool, BindError>
    where
        T: Bindable,
        S: ParamSource + ?Sized,
    {
        match target {
            Some(target) => self.bind(target, source),
            None => Ok(true),
        }
    }
}

impl std::fmt::Debug for ParameterBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("cached_types", &self.schemas.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::query::QueryString;
    use crate::params::schema::{Parameter, SchemaBuilder};
    use crate::params::value::ParamEnum;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Flavour {
        Vanilla,
        Chocolate,
    }

    impl ParamEnum for Flavour {
        fn from_name(name: &str) -> Option<Self> {
            match name {
                "Vanilla" => Some(Flavour::Vanilla),
                "Chocolate" => Some(Flavour::Chocolate),
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct Everything {
        text: Option<String>,
        number: Option<i32>,
        big: i64,
        flag: Option<bool>,
        flavour: Option<Flavour>,
        unannotated: Option<String>,
    }

    impl Bindable for Everything {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema
                .field(Parameter::field("text"), |e| &mut e.text)
                .field(Parameter::field("number"), |e| &mut e.number)
                .field(Parameter::field("big"), |e| &mut e.big)
                .field(Parameter::field("flag"), |e| &mut e.flag)
                .enum_field(Parameter::field("flavour"), |e| &mut e.flavour)
        }
    }

    #[derive(Default)]
    struct RequiredNumber {
        value: i32,
    }

    impl Bindable for RequiredNumber {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema.field(Parameter::field("value").required(), |r| &mut r.value)
        }
    }

    #[derive(Default)]
    struct Renamed {
        user_id: Option<i64>,
    }

    impl Bindable for Renamed {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema.field(Parameter::field("user_id").named("id"), |r| &mut r.user_id)
        }
    }

    #[derive(Default)]
    struct RequiredText {
        name: String,
    }

    impl Bindable for RequiredText {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema.field(Parameter::field("name").required(), |r| &mut r.name)
        }
    }

    #[derive(Default)]
    struct Base {
        inherited: Option<String>,
    }

    impl Bindable for Base {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema.field(Parameter::field("inherited").required(), |b| &mut b.inherited)
        }
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        own: Option<String>,
    }

    impl Bindable for Derived {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema
                .field(Parameter::field("own"), |d| &mut d.own)
                .inherit(|d| &mut d.base)
        }
    }

    #[derive(Default)]
    struct Unsupported {
        tags: Vec<String>,
    }

    impl Bindable for Unsupported {
        fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
            schema.field(Parameter::field("tags"), |u| &mut u.tags)
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_binds_every_supported_kind() {
        let binder = ParameterBinder::new();
        let mut target = Everything::default();
        let source = params(&[
            ("text", "value"),
            ("number", "10"),
            ("big", "3000000000"),
            ("flag", "yes"),
            ("flavour", "Chocolate"),
        ]);

        assert!(binder.bind(&mut target, &source).unwrap());
        assert_eq!(target.text.as_deref(), Some("value"));
        assert_eq!(target.number, Some(10));
        assert_eq!(target.big, 3_000_000_000);
        assert_eq!(target.flag, Some(true));
        assert_eq!(target.flavour, Some(Flavour::Chocolate));
    }

    #[test]
    fn test_undeclared_field_is_not_populated() {
        let binder = ParameterBinder::new();
        let mut target = Everything::default();

        assert!(binder
            .bind(&mut target, &params(&[("unannotated", "value")]))
            .unwrap());
        assert_eq!(target.unannotated, None);
    }

    #[test]
    fn test_invalid_optional_values_are_left_unset() {
        let binder = ParameterBinder::new();
        let mut target = Everything::default();
        let source = params(&[
            ("text", ""),
            ("number", "NaN"),
            ("flag", "guess"),
            ("flavour", "chocolate"),
        ]);

        assert!(binder.bind(&mut target, &source).unwrap());
        assert_eq!(target.text, None);
        assert_eq!(target.number, None);
        assert_eq!(target.flag, None);
        assert_eq!(target.flavour, None);
    }

    #[test]
    fn test_required_number() {
        let binder = ParameterBinder::new();

        let mut ok = RequiredNumber::default();
        assert!(binder.bind(&mut ok, &params(&[("value", "10")])).unwrap());
        assert_eq!(ok.value, 10);

        let mut bad = RequiredNumber::default();
        assert!(!binder.bind(&mut bad, &params(&[("value", "NaN")])).unwrap());
        assert_eq!(bad.value, 0);

        let mut missing = RequiredNumber::default();
        assert!(!binder.bind(&mut missing, &params(&[])).unwrap());
    }

    #[test]
    fn test_required_text_rejects_empty_value() {
        let binder = ParameterBinder::new();
        let mut target = RequiredText::default();
        assert!(!binder.bind(&mut target, &params(&[("name", "")])).unwrap());
        assert_eq!(target.name, "");
    }

    #[test]
    fn test_named_parameter() {
        let binder = ParameterBinder::new();
        let mut target = Renamed::default();

        assert!(binder
            .bind(&mut target, &params(&[("user_id", "5")]))
            .unwrap());
        assert_eq!(target.user_id, None);

        assert!(binder.bind(&mut target, &params(&[("id", "5")])).unwrap());
        assert_eq!(target.user_id, Some(5));
    }

    #[test]
    fn test_inherited_fields_are_bound() {
        let binder = ParameterBinder::new();
        let mut target = Derived::default();

        assert!(!binder.bind(&mut target, &params(&[("own", "a")])).unwrap());
        assert_eq!(target.own.as_deref(), Some("a"));

        let source = params(&[("own", "a"), ("inherited", "b")]);
        assert!(binder.bind(&mut target, &source).unwrap());
        assert_eq!(target.base.inherited.as_deref(), Some("b"));
    }

    #[test]
    fn test_first_value_wins() {
        let binder = ParameterBinder::new();
        let mut target = RequiredNumber::default();
        let query = QueryString::parse("value=1&value=2");
        assert!(binder.bind(&mut target, &query).unwrap());
        assert_eq!(target.value, 1);
    }

    #[test]
    fn test_unsupported_type_is_an_error() {
        let binder = ParameterBinder::new();
        let mut target = Unsupported::default();
        let err = binder.bind(&mut target, &params(&[])).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { field: "tags", .. }));
        assert_eq!(binder.cached_types(), 0);
    }

    #[test]
    fn test_schema_is_cached_once_per_type() {
        let binder = ParameterBinder::new();
        let first = binder.schema_of::<Everything>().unwrap();
        let second = binder.schema_of::<Everything>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        binder.schema_of::<RequiredNumber>().unwrap();
        assert_eq!(binder.cached_types(), 2);
    }

    #[test]
    fn test_missing_target_succeeds() {
        let binder = ParameterBinder::new();
        let result = binder.bind_optional::<RequiredNumber, _>(None, &params(&[]));
        assert!(result.unwrap());
    }

    #[test]
    fn test_concurrent_binding_shares_cache() {
        let binder = Arc::new(ParameterBinder::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let binder = Arc::clone(&binder);
                std::thread::spawn(move || {
                    let mut target = RequiredNumber::default();
                    let value = i.to_string();
                    let ok = binder
                        .bind(&mut target, &params(&[("value", value.as_str())]))
                        .unwrap();
                    (ok, target.value)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), (true, i as i32));
        }
        assert_eq!(binder.cached_types(), 1);
    }
}
