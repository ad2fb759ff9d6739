//! Parameter binding error definitions.

use thiserror::Error;

/// Configuration mistakes in a bindable type's schema.
///
/// Missing or unparseable values are not errors: they show up in the
/// boolean returned by `ParameterBinder::bind`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A field was declared with a type the binder cannot coerce into.
    #[error("Unable to handle type {type_name} of parameter field {owner}::{field}")]
    UnsupportedType {
        owner: &'static str,
        field: &'static str,
        type_name: &'static str,
    },
}
