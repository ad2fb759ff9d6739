//! Request parameter binding.
//!
//! # Data Flow
//! ```text
//! RequestInfo / QueryString / HashMap
//!     → ParamSource (first value per name)
//!     → ParameterBinder (cached FieldSchema per type)
//!     → typed fields on the target
//! ```

pub mod binder;
pub mod schema;
pub mod source;
pub mod types;
pub mod value;

pub use binder::ParameterBinder;
pub use schema::{Bindable, FieldSchema, FieldSpec, Parameter, SchemaBuilder};
pub use source::ParamSource;
pub use types::BindError;
pub use value::{parse_flag, ParamEnum, ParamKind};
