//! Attribute registry: discovery, validation, and the class index.
//!
//! Structurally parallel to the solver registry, minus any ordering logic:
//! attributes have no tiers, no dependencies, and no plan. The registry
//! additionally maintains a class index answering "which attributes extend
//! model class X".

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::descriptor::{AttributeDescriptor, AttributeInfo};
use crate::error::AttributeError;
use crate::source::AttributeSource;


/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "hearth_attributes::registry";

/// Validated, queryable set of attribute descriptors.
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    attributes: HashMap<String, AttributeDescriptor>,
    class_index: HashMap<String, BTreeSet<String>>,
    discovered: bool,
}

impl AttributeRegistry {
    /// Creates an empty, undiscovered registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `source` for candidates under `group` and registers every
    /// validated descriptor, keyed by declared name.
    ///
    /// All prior descriptors are cleared first, regardless of outcome. A
    /// later candidate declaring an already-registered name overwrites the
    /// earlier entry; the class index is rebuilt afterwards so no stale
    /// entries survive an overwrite.
    ///
    /// # Errors
    ///
    /// Fail-fast: the first [`AttributeError::ProtocolViolation`] or
    /// [`AttributeError::Source`] aborts the whole call, leaving the
    /// registry empty and undiscovered.
    pub fn discover<S>(&mut self, source: &S, group: &str) -> Result<(), AttributeError>
    where
        S: AttributeSource + ?Sized,
    {
        self.attributes.clear();
        self.class_index.clear();
        self.discovered = false;

        for candidate in source.candidates(group)? {
            let descriptor = candidate.into_descriptor()?;
            debug!(
                target: REGISTRY_TARGET,
                attribute = descriptor.name(),
                "registered attribute"
            );
            self.attributes
                .insert(descriptor.name().to_owned(), descriptor);
        }

        for descriptor in self.attributes.values() {
            for class_name in descriptor.extends_classes() {
                self.class_index
                    .entry(class_name.clone())
                    .or_default()
                    .insert(descriptor.name().to_owned());
            }
        }

        self.discovered = true;
        info!(
            target: REGISTRY_TARGET,
            group,
            count = self.attributes.len(),
            "attribute discovery complete"
        );
        Ok(())
    }

    /// Looks up a descriptor by attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] before the first
    /// successful discovery, or [`AttributeError::NotFound`] listing the
    /// known names.
    pub fn get(&self, name: &str) -> Result<&AttributeDescriptor, AttributeError> {
        self.ensure_discovered()?;
        self.attributes
            .get(name)
            .ok_or_else(|| AttributeError::NotFound {
                name: name.to_owned(),
                known: self.known_names(),
            })
    }

    /// Returns all descriptors, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] before the first
    /// successful discovery.
    pub fn list(&self) -> Result<Vec<&AttributeDescriptor>, AttributeError> {
        self.ensure_discovered()?;
        let mut descriptors: Vec<&AttributeDescriptor> = self.attributes.values().collect();
        descriptors.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(descriptors)
    }

    /// Returns a metadata snapshot for one attribute.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AttributeRegistry::get`].
    pub fn info(&self, name: &str) -> Result<AttributeInfo, AttributeError> {
        self.get(name).map(AttributeDescriptor::info)
    }

    /// Returns the names of attributes extending the given model class,
    /// sorted lexicographically. Unknown classes yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] before the first
    /// successful discovery.
    pub fn attributes_for_class(&self, class_name: &str) -> Result<Vec<String>, AttributeError> {
        self.ensure_discovered()?;
        Ok(self
            .class_index
            .get(class_name)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Returns `true` when an attribute with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the number of registered attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` when no attributes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns `true` once a discovery call has completed successfully.
    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.discovered
    }

    fn ensure_discovered(&self) -> Result<(), AttributeError> {
        if self.discovered {
            Ok(())
        } else {
            Err(AttributeError::NotDiscovered)
        }
    }

    pub(crate) fn known_names(&self) -> Vec<String> {
        let mut known: Vec<String> = self.attributes.keys().cloned().collect();
        known.sort_unstable();
        known
    }
}
