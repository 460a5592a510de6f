//! Attribute metadata records: raw candidates and validated descriptors.
//!
//! The discovery pattern mirrors the solver registry: a source yields
//! [`AttributeCandidate`] records, the registry promotes each into an
//! immutable [`AttributeDescriptor`] via
//! [`AttributeCandidate::into_descriptor`], and [`AttributeInfo`] is the
//! serializable snapshot handed out by query APIs. Attributes carry no
//! ordering metadata; there is no tier or dependency field.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeFailure};
use crate::error::AttributeError;


/// Zero-argument constructor capability producing an attribute instance.
pub type AttributeFactory = Arc<dyn Fn() -> Result<Box<dyn Attribute>, AttributeFailure> + Send + Sync>;

/// Raw, possibly-incomplete attribute record yielded by a discovery source.
pub struct AttributeCandidate {
    source_key: String,
    name: Option<String>,
    version: Option<String>,
    extends_classes: Option<Vec<String>>,
    description: Option<String>,
    factory: Option<AttributeFactory>,
}

impl AttributeCandidate {
    /// Creates an empty candidate identified by `source_key` within its
    /// discovery source.
    #[must_use]
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            name: None,
            version: None,
            extends_classes: None,
            description: None,
            factory: None,
        }
    }

    /// Declares the attribute's unique name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares the attribute's schema version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Declares the model classes this attribute extends. Required even
    /// when empty; an absent declaration fails validation.
    #[must_use]
    pub fn with_extends_classes(mut self, extends_classes: Vec<String>) -> Self {
        self.extends_classes = Some(extends_classes);
        self
    }

    /// Attaches a human-readable description. Optional.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches the instance factory.
    #[must_use]
    pub fn with_factory(mut self, factory: AttributeFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Returns the candidate's identifier within its discovery source.
    #[must_use]
    pub const fn source_key(&self) -> &str {
        self.source_key.as_str()
    }

    /// Validates the candidate and promotes it to an immutable descriptor.
    ///
    /// The required capability surface is: a non-blank name, a version, an
    /// extends-classes declaration, and a factory. The description is
    /// optional and defaults to the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::ProtocolViolation`] naming every missing
    /// member at once.
    pub fn into_descriptor(self) -> Result<AttributeDescriptor, AttributeError> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            missing.push(String::from("name"));
        }
        if self.version.is_none() {
            missing.push(String::from("version"));
        }
        if self.extends_classes.is_none() {
            missing.push(String::from("extends_classes"));
        }
        if self.factory.is_none() {
            missing.push(String::from("factory"));
        }

        match (self.name, self.version, self.extends_classes, self.factory) {
            (Some(name), Some(version), Some(extends_classes), Some(factory))
                if missing.is_empty() =>
            {
                Ok(AttributeDescriptor {
                    name,
                    version,
                    extends_classes: extends_classes.into_iter().collect(),
                    description: self.description.unwrap_or_default(),
                    source_key: self.source_key,
                    factory,
                })
            }
            _ => Err(AttributeError::ProtocolViolation {
                source_key: self.source_key,
                missing,
            }),
        }
    }
}

impl Clone for AttributeCandidate {
    fn clone(&self) -> Self {
        Self {
            source_key: self.source_key.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            extends_classes: self.extends_classes.clone(),
            description: self.description.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl std::fmt::Debug for AttributeCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeCandidate")
            .field("source_key", &self.source_key)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("extends_classes", &self.extends_classes)
            .field("description", &self.description)
            .field("factory", &self.factory.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Immutable metadata for one registered attribute extension.
pub struct AttributeDescriptor {
    name: String,
    version: String,
    extends_classes: BTreeSet<String>,
    description: String,
    source_key: String,
    factory: AttributeFactory,
}

impl AttributeDescriptor {
    /// Returns the attribute's unique name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the attribute's schema version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the model classes this attribute extends.
    #[must_use]
    pub const fn extends_classes(&self) -> &BTreeSet<String> {
        &self.extends_classes
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the identifier the attribute carried in its discovery
    /// source.
    #[must_use]
    pub const fn source_key(&self) -> &str {
        self.source_key.as_str()
    }

    /// Returns `true` when this attribute extends the given model class.
    #[must_use]
    pub fn extends(&self, class_name: &str) -> bool {
        self.extends_classes.contains(class_name)
    }

    /// Invokes the factory to produce a fresh attribute instance.
    ///
    /// # Errors
    ///
    /// Propagates whatever the factory raised; the manager rewraps it in
    /// [`AttributeError::Instantiation`].
    pub fn instantiate(&self) -> Result<Box<dyn Attribute>, AttributeFailure> {
        (self.factory)()
    }

    /// Returns a serializable metadata snapshot.
    #[must_use]
    pub fn info(&self) -> AttributeInfo {
        AttributeInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            extends_classes: self.extends_classes.iter().cloned().collect(),
            description: self.description.clone(),
        }
    }
}

impl Clone for AttributeDescriptor {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            version: self.version.clone(),
            extends_classes: self.extends_classes.clone(),
            description: self.description.clone(),
            source_key: self.source_key.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl std::fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("extends_classes", &self.extends_classes)
            .field("description", &self.description)
            .field("source_key", &self.source_key)
            .finish_non_exhaustive()
    }
}

/// Serializable snapshot of one attribute's metadata.
///
/// Extended class names are reported in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    name: String,
    version: String,
    extends_classes: Vec<String>,
    description: String,
}

impl AttributeInfo {
    /// Returns the attribute name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the attribute version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the extended model classes.
    #[must_use]
    pub fn extends_classes(&self) -> &[String] {
        &self.extends_classes
    }

    /// Returns the human-readable description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }
}
