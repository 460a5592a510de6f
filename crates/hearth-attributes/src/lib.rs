//! Pluggable data-model extensions for building-physics models.
//!
//! The `hearth-attributes` crate lets external packages attach named data
//! bundles ("attributes") to core model objects — cost data on rooms,
//! certification metadata on buildings — without modifying the core data
//! model. It mirrors the discovery pattern of `hearth-solvers`: candidates
//! come from a pluggable [`source`], are validated against an explicit
//! capability surface, and are stored as immutable descriptors. Unlike
//! solvers, attributes carry no ordering, dependency, or cycle logic.
//!
//! The [`AttributeRegistry`] answers "which attributes exist and which
//! model classes do they extend"; the [`AttributeManager`] additionally
//! stores validated field values per `(model class, instance id)` pair and
//! runs each attribute's serialization hooks on export and import.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hearth_attributes::{Attribute, AttributeCandidate, AttributeManager, AttributeValues,
//!     StaticSource};
//!
//! struct CostData {
//!     extends: Vec<String>,
//! }
//!
//! impl Attribute for CostData {
//!     fn name(&self) -> &str {
//!         "cost_data"
//!     }
//!     fn version(&self) -> &str {
//!         "1.0.0"
//!     }
//!     fn extends_classes(&self) -> &[String] {
//!         &self.extends
//!     }
//!     fn default_values(&self) -> AttributeValues {
//!         let mut defaults = AttributeValues::new();
//!         defaults.insert("cost_currency".into(), "EUR".into());
//!         defaults
//!     }
//! }
//!
//! let mut source = StaticSource::new();
//! source.register(
//!     "hearth.attributes",
//!     AttributeCandidate::new("cost-entry")
//!         .with_name("cost_data")
//!         .with_version("1.0.0")
//!         .with_extends_classes(vec!["Room".into()])
//!         .with_factory(Arc::new(|| {
//!             Ok(Box::new(CostData {
//!                 extends: vec!["Room".into()],
//!             }))
//!         })),
//! );
//!
//! let mut manager = AttributeManager::new(source);
//! manager.discover("hearth.attributes").expect("discovery succeeds");
//! assert_eq!(
//!     manager.attributes_for_class("Room").expect("query"),
//!     vec!["cost_data".to_owned()]
//! );
//! ```

pub mod attribute;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod registry;
pub mod source;

pub use self::attribute::{Attribute, AttributeFailure, AttributeValues};
pub use self::descriptor::{AttributeCandidate, AttributeDescriptor, AttributeFactory, AttributeInfo};
pub use self::error::AttributeError;
pub use self::manager::AttributeManager;
pub use self::registry::AttributeRegistry;
pub use self::source::{AttributeSource, StaticSource};
