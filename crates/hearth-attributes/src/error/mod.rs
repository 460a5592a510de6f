//! Domain errors raised by attribute discovery and data management.

use std::sync::Arc;

use thiserror::Error;


/// Errors arising from the attribute subsystem.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// A discovered candidate does not expose the full capability surface.
    #[error(
        "candidate '{source_key}' does not satisfy the attribute capability \
         surface; missing members: {}",
        .missing.join(", ")
    )]
    ProtocolViolation {
        /// Identifier of the candidate within its discovery source.
        source_key: String,
        /// Names of the members the candidate failed to provide.
        missing: Vec<String>,
    },

    /// The discovery source itself failed to produce candidates.
    #[error("attribute source failed for group '{group}': {message}")]
    Source {
        /// Group that was being scanned.
        group: String,
        /// Human-readable failure description.
        message: String,
    },

    /// A query was made before the first successful discovery.
    #[error("no attribute discovery has been run; call discover() first")]
    NotDiscovered,

    /// Lookup by a name no registered attribute carries.
    #[error("attribute '{name}' not found (known attributes: {})", known_or_none(.known))]
    NotFound {
        /// Name that was looked up.
        name: String,
        /// Currently registered attribute names, for diagnosis.
        known: Vec<String>,
    },

    /// The attribute does not extend the requested model class.
    #[error(
        "attribute '{attribute}' does not extend class '{class_name}' \
         (extends: {})",
        .extends.join(", ")
    )]
    NotApplicable {
        /// Attribute that was requested.
        attribute: String,
        /// Model class it was requested for.
        class_name: String,
        /// Classes the attribute actually extends.
        extends: Vec<String>,
    },

    /// The attribute's validator rejected candidate field values.
    #[error("invalid data for attribute '{attribute}': {}", .problems.join("; "))]
    Validation {
        /// Attribute whose validator rejected the data.
        attribute: String,
        /// Messages reported by the validator.
        problems: Vec<String>,
    },

    /// An attribute factory failed to produce an instance.
    #[error("failed to instantiate attribute '{name}': {source}")]
    Instantiation {
        /// Attribute whose factory failed.
        name: String,
        /// Underlying cause raised by the factory.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// No stored data exists for the requested attribute and instance.
    #[error(
        "no data found for attribute '{attribute}' on {class_name} \
         instance '{instance_id}'"
    )]
    Missing {
        /// Attribute that was queried.
        attribute: String,
        /// Model class of the instance.
        class_name: String,
        /// Identifier of the model instance.
        instance_id: String,
    },
}

fn known_or_none(known: &[String]) -> String {
    if known.is_empty() {
        String::from("none")
    } else {
        known.join(", ")
    }
}
