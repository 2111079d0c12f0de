//! Declaration binder.
//!
//! Walks parsed units and declares their classes, supertypes and members
//! into an `EnvironmentBuilder`, so that attribution sees source classes
//! exactly like classpath classes. Also owns the per-file name scope
//! (package and imports) used to resolve type names.

pub mod scope;
pub mod state;
mod state_members;

pub use scope::{FileScope, Segments, TypeNameContext, chain_segments, facade_name, qualified_to_class};
pub use state::{BinderState, BoundUnit, bind_units, type_parameter_names};
pub use state_members::{CONSTRUCTOR_NAME, literal_type};
