//! Coercion of raw parameter strings into field values.
//!
//! Supported field types: `String`, `i32`, `i64`, `bool`, their `Option`
//! forms, and `Option<E>` for enums implementing [`ParamEnum`].

use std::any::{Any, TypeId};

/// A coerced value, boxed so one table can serve every supported type.
pub(crate) type Coerced = Box<dyn Any + Send>;

/// Raw string to boxed value; `None` when the string does not parse.
pub(crate) type Coercer = fn(&str) -> Option<Coerced>;

/// The coercion rule applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Non-empty text.
    Text,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Tri-state boolean, see [`parse_flag`].
    Boolean,
    /// Exact constant-name match.
    Enumeration,
}

/// Enums that can be bound from their constant names.
///
/// ```
/// use actionmap::params::ParamEnum;
///
/// enum Sort { Newest, Oldest }
///
/// impl ParamEnum for Sort {
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "Newest" => Some(Sort::Newest),
///             "Oldest" => Some(Sort::Oldest),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait ParamEnum: Sized + Send + 'static {
    /// The constant named exactly `name`.
    fn from_name(name: &str) -> Option<Self>;
}

/// Parse a boolean leniently: `true`, `on`, `yes`, `y`, `t` and `false`, `off`,
/// `no`, `n`, `f`, ignoring ASCII case. Anything else is `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    const TRUE: [&str; 5] = ["true", "on", "yes", "y", "t"];
    const FALSE: [&str; 5] = ["false", "off", "no", "n", "f"];

    if TRUE.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| raw.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

fn text(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn boxed<V: Send + 'static>(value: Option<V>) -> Option<Coerced> {
    value.map(|v| Box::new(v) as Coerced)
}

fn coerce_text(raw: &str) -> Option<Coerced> {
    boxed(text(raw))
}

fn coerce_opt_text(raw: &str) -> Option<Coerced> {
    boxed(text(raw).map(Some))
}

fn coerce_integer(raw: &str) -> Option<Coerced> {
    boxed(raw.parse::<i32>().ok())
}

fn coerce_opt_integer(raw: &str) -> Option<Coerced> {
    boxed(raw.parse::<i32>().ok().map(Some))
}

fn coerce_long(raw: &str) -> Option<Coerced> {
    boxed(raw.parse::<i64>().ok())
}

fn coerce_opt_long(raw: &str) -> Option<Coerced> {
    boxed(raw.parse::<i64>().ok().map(Some))
}

fn coerce_flag(raw: &str) -> Option<Coerced> {
    boxed(parse_flag(raw))
}

fn coerce_opt_flag(raw: &str) -> Option<Coerced> {
    boxed(parse_flag(raw).map(Some))
}

/// Look up the coercion rule for field type `V`.
pub(crate) fn coercer_for<V: 'static>() -> Option<(ParamKind, Coercer)> {
    let id = TypeId::of::<V>();
    let table: [(TypeId, ParamKind, Coercer); 8] = [
        (TypeId::of::<String>(), ParamKind::Text, coerce_text),
        (TypeId::of::<Option<String>>(), ParamKind::Text, coerce_opt_text),
        (TypeId::of::<i32>(), ParamKind::Integer, coerce_integer),
        (TypeId::of::<Option<i32>>(), ParamKind::Integer, coerce_opt_integer),
        (TypeId::of::<i64>(), ParamKind::Long, coerce_long),
        (TypeId::of::<Option<i64>>(), ParamKind::Long, coerce_opt_long),
        (TypeId::of::<bool>(), ParamKind::Boolean, coerce_flag),
        (TypeId::of::<Option<bool>>(), ParamKind::Boolean, coerce_opt_flag),
    ];
    table
        .into_iter()
        .find(|(type_id, _, _)| *type_id == id)
        .map(|(_, kind, coercer)| (kind, coercer))
}
