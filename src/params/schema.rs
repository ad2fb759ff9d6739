//! Statically declared parameter schemas.
//!
//! A bindable type lists its parameter fields once, through a
//! [`SchemaBuilder`]. Each entry pairs a [`Parameter`] descriptor with an
//! accessor to the field it populates.
//!
//! ```
//! use actionmap::params::{Bindable, Parameter, SchemaBuilder};
//!
//! #[derive(Default)]
//! struct Search {
//!     query: Option<String>,
//!     page: i32,
//! }
//!
//! impl Bindable for Search {
//!     fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
//!         schema
//!             .field(Parameter::field("query").named("q").required(), |s| &mut s.query)
//!             .field(Parameter::field("page"), |s| &mut s.page)
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::params::types::BindError;
use crate::params::value::{coercer_for, ParamEnum, ParamKind};

/// Types whose fields can be populated from request parameters.
pub trait Bindable: Sized + Send + 'static {
    /// Declare the parameter fields of `Self`.
    fn schema(schema: SchemaBuilder<Self>) -> SchemaBuilder<Self>;
}

/// Describes one bindable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    field: &'static str,
    name: Option<&'static str>,
    required: bool,
}

impl Parameter {
    /// Descriptor for the field called `field`. The parameter name defaults to it.
    pub fn field(field: &'static str) -> Self {
        Self {
            field,
            name: None,
            required: false,
        }
    }

    /// Bind from a parameter with a different name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Binding fails overall when this parameter is missing or unparseable.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The request parameter name: the override if not blank, else the field name.
    pub fn name(&self) -> &'static str {
        match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.field,
        }
    }

    pub fn field_name(&self) -> &'static str {
        self.field
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

type Assign<T> = Arc<dyn Fn(&mut T, &str) -> bool + Send + Sync>;

/// A declared field together with its coercion rule.
pub struct FieldSpec<T> {
    parameter: Parameter,
    kind: ParamKind,
    type_name: &'static str,
    assign: Assign<T>,
}

impl<T> FieldSpec<T> {
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Name of the Rust field type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Coerce `raw` and store it. Returns false, leaving the field untouched,
    /// when the value does not coerce.
    pub fn assign(&self, target: &mut T, raw: &str) -> bool {
        (self.assign)(target, raw)
    }
}

impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            kind: self.kind,
            type_name: self.type_name,
            assign: Arc::clone(&self.assign),
        }
    }
}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("parameter", &self.parameter)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Collects field declarations for `T`.
pub struct SchemaBuilder<T> {
    fields: Vec<FieldSpec<T>>,
    error: Option<BindError>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn new() -> Self {
        Self {
            fields: Vec::new(),
            error: None,
        }
    }

    /// Declare a field of a supported scalar type.
    ///
    /// Declaring any other type makes the schema fail to build with
    /// [`BindError::UnsupportedType`].
    pub fn field<V: Send + 'static>(
        mut self,
        parameter: Parameter,
        accessor: fn(&mut T) -> &mut V,
    ) -> Self {
        let Some((kind, coerce)) = coercer_for::<V>() else {
            self.fail(BindError::UnsupportedType {
                owner: std::any::type_name::<T>(),
                field: parameter.field_name(),
                type_name: std::any::type_name::<V>(),
            });
            return self;
        };

        let assign: Assign<T> = Arc::new(move |target: &mut T, raw: &str| {
            match coerce(raw).and_then(|value| value.downcast::<V>().ok()) {
                Some(value) => {
                    *accessor(target) = *value;
                    true
                }
                None => false,
            }
        });
        self.push(parameter, kind, std::any::type_name::<V>(), assign)
    }

    /// Declare an enum field, matched by exact constant name.
    pub fn enum_field<E: ParamEnum>(
        self,
        parameter: Parameter,
        accessor: fn(&mut T) -> &mut Option<E>,
    ) -> Self {
        let assign: Assign<T> = Arc::new(move |target: &mut T, raw: &str| {
            match E::from_name(raw) {
                Some(value) => {
                    *accessor(target) = Some(value);
                    true
                }
                None => false,
            }
        });
        self.push(
            parameter,
            ParamKind::Enumeration,
            std::any::type_name::<E>(),
            assign,
        )
    }

    /// Include the fields declared by `P`, reached through `projection`.
    ///
    /// This stands in for inherited fields: they come after the fields
    /// declared so far.
    pub fn inherit<P: Bindable>(mut self, projection: fn(&mut T) -> &mut P) -> Self {
        match FieldSchema::<P>::build() {
            Ok(parent) => {
                for spec in parent.fields {
                    let inner = spec.assign;
                    let assign: Assign<T> =
                        Arc::new(move |target: &mut T, raw: &str| inner(projection(target), raw));
                    self = self.push(spec.parameter, spec.kind, spec.type_name, assign);
                }
                self
            }
            Err(e) => {
                self.fail(e);
                self
            }
        }
    }

    fn push(
        mut self,
        parameter: Parameter,
        kind: ParamKind,
        type_name: &'static str,
        assign: Assign<T>,
    ) -> Self {
        self.fields.push(FieldSpec {
            parameter,
            kind,
            type_name,
            assign,
        });
        self
    }

    fn fail(&mut self, error: BindError) {
        self.error.get_or_insert(error);
    }
}

/// The immutable field list of a bindable type.
pub struct FieldSchema<T> {
    type_name: &'static str,
    fields: Vec<FieldSpec<T>>,
}

impl<T: Bindable> FieldSchema<T> {
    /// Run `T`'s declaration. Fails on the first unsupported field type.
    pub fn build() -> Result<Self, BindError> {
        let builder = T::schema(SchemaBuilder::new());
        match builder.error {
            Some(e) => Err(e),
            None => Ok(Self {
                type_name: std::any::type_name::<T>(),
                fields: builder.fields,
            }),
        }
    }
}

impl<T> fmt::Debug for FieldSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> FieldSchema<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldSpec<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
