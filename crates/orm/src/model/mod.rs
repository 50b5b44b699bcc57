//! Model definitions, registry, naming rules and hydrated instances

pub mod core_trait;
pub mod definition;
pub mod instance;
pub mod naming;
pub mod registry;

pub use core_trait::Model;
pub use definition::ModelDefinition;
pub use instance::{ModelInstance, Relation};
pub use naming::{singularize, InflectorNaming, TableNaming};
pub use registry::{ModelRegistry, ResolvedModel};
