//! Attribute manager: instance caching and per-model-instance data.
//!
//! The [`AttributeManager`] owns a registry and an injected discovery
//! source, caches one attribute instance per name, and stores field values
//! keyed by `(model class, instance id, attribute name)`. Writes are
//! validated by the attribute's own validator and merged over the
//! attribute's declared defaults; exports and imports pass through the
//! attribute's serialization hooks.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::{debug, info};

use crate::attribute::{Attribute, AttributeValues};
use crate::descriptor::AttributeInfo;
use crate::error::AttributeError;
use crate::registry::AttributeRegistry;
use crate::source::AttributeSource;


/// Tracing target for manager operations.
const MANAGER_TARGET: &str = "hearth_attributes::manager";

/// Stored attribute data for the instances of one model class:
/// instance id -> attribute name -> field values.
type ClassData = HashMap<String, HashMap<String, AttributeValues>>;

/// Coordinates attribute discovery, instantiation, and per-instance data.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use hearth_attributes::attribute::{Attribute, AttributeValues};
/// use hearth_attributes::descriptor::AttributeCandidate;
/// use hearth_attributes::manager::AttributeManager;
/// use hearth_attributes::source::StaticSource;
///
/// struct CostData {
///     extends: Vec<String>,
/// }
///
/// impl Attribute for CostData {
///     fn name(&self) -> &str {
///         "cost_data"
///     }
///     fn version(&self) -> &str {
///         "1.0.0"
///     }
///     fn extends_classes(&self) -> &[String] {
///         &self.extends
///     }
///     fn default_values(&self) -> AttributeValues {
///         let mut defaults = AttributeValues::new();
///         defaults.insert("cost_currency".into(), "EUR".into());
///         defaults
///     }
/// }
///
/// let mut source = StaticSource::new();
/// source.register(
///     "hearth.attributes",
///     AttributeCandidate::new("cost-entry")
///         .with_name("cost_data")
///         .with_version("1.0.0")
///         .with_extends_classes(vec!["Room".into()])
///         .with_factory(Arc::new(|| {
///             Ok(Box::new(CostData {
///                 extends: vec!["Room".into()],
///             }))
///         })),
/// );
///
/// let mut manager = AttributeManager::new(source);
/// manager.discover("hearth.attributes").expect("discover");
///
/// let mut update = AttributeValues::new();
/// update.insert("cost_currency".into(), "CHF".into());
/// manager
///     .set_data("Room", "room-01", "cost_data", update)
///     .expect("set succeeds");
///
/// let stored = manager.data("Room", "room-01", "cost_data").expect("get");
/// assert_eq!(stored["cost_currency"], "CHF");
/// ```
pub struct AttributeManager<S> {
    registry: AttributeRegistry,
    source: S,
    instances: HashMap<String, Box<dyn Attribute>>,
    data: HashMap<String, ClassData>,
}

impl<S: AttributeSource> AttributeManager<S> {
    /// Creates a manager with an empty registry around the given discovery
    /// source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            registry: AttributeRegistry::new(),
            source,
            instances: HashMap::new(),
            data: HashMap::new(),
        }
    }

    /// Discovers attributes under `group`, replacing all prior registry
    /// state and clearing cached instances and stored data.
    ///
    /// # Errors
    ///
    /// Propagates [`AttributeError::ProtocolViolation`] and
    /// [`AttributeError::Source`] from the registry scan.
    pub fn discover(&mut self, group: &str) -> Result<(), AttributeError> {
        let outcome = self.registry.discover(&self.source, group);
        self.instances.clear();
        self.data.clear();
        outcome
    }

    /// Returns the cached instance for `name`, invoking the descriptor's
    /// factory on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] /
    /// [`AttributeError::NotFound`] from descriptor lookup, or
    /// [`AttributeError::Instantiation`] when the factory fails.
    pub fn instance(&mut self, name: &str) -> Result<&dyn Attribute, AttributeError> {
        match self.instances.entry(name.to_owned()) {
            Entry::Occupied(entry) => Ok(&**entry.into_mut()),
            Entry::Vacant(entry) => {
                let descriptor = self.registry.get(name)?;
                let built =
                    descriptor
                        .instantiate()
                        .map_err(|cause| AttributeError::Instantiation {
                            name: name.to_owned(),
                            source: Arc::from(cause),
                        })?;
                debug!(target: MANAGER_TARGET, attribute = name, "attribute instantiated");
                Ok(&**entry.insert(built))
            }
        }
    }

    /// Stores field values for an attribute on one model instance.
    ///
    /// The attribute must extend `class_name`. Candidate values are checked
    /// by the attribute's own validator, then merged over the attribute's
    /// declared defaults so stored records are always complete.
    ///
    /// # Errors
    ///
    /// Lookup and instantiation errors,
    /// [`AttributeError::NotApplicable`] when the attribute does not extend
    /// the class, or [`AttributeError::Validation`] when the validator
    /// rejects the values.
    pub fn set_data(
        &mut self,
        class_name: &str,
        instance_id: &str,
        attribute: &str,
        values: AttributeValues,
    ) -> Result<(), AttributeError> {
        let descriptor = self.registry.get(attribute)?;
        if !descriptor.extends(class_name) {
            return Err(AttributeError::NotApplicable {
                attribute: attribute.to_owned(),
                class_name: class_name.to_owned(),
                extends: descriptor.extends_classes().iter().cloned().collect(),
            });
        }

        let instance = self.instance(attribute)?;
        let problems = instance.validate(&values);
        if !problems.is_empty() {
            return Err(AttributeError::Validation {
                attribute: attribute.to_owned(),
                problems,
            });
        }

        let mut merged = instance.default_values();
        for (field, value) in values {
            merged.insert(field, value);
        }

        self.data
            .entry(class_name.to_owned())
            .or_default()
            .entry(instance_id.to_owned())
            .or_default()
            .insert(attribute.to_owned(), merged);
        debug!(
            target: MANAGER_TARGET,
            attribute,
            class = class_name,
            instance = instance_id,
            "attribute data stored"
        );
        Ok(())
    }

    /// Returns the stored values for an attribute on one model instance,
    /// falling back to the attribute's defaults when nothing is stored.
    ///
    /// # Errors
    ///
    /// Lookup and instantiation errors from the registry and factory.
    pub fn data(
        &mut self,
        class_name: &str,
        instance_id: &str,
        attribute: &str,
    ) -> Result<AttributeValues, AttributeError> {
        if let Some(values) = self.lookup(class_name, instance_id, attribute) {
            return Ok(values.clone());
        }
        // Resolve through the registry first so unknown names still fail.
        let instance = self.instance(attribute)?;
        Ok(instance.default_values())
    }

    /// Returns the stored values for an attribute on one model instance,
    /// without any default fallback.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Missing`] when nothing is stored.
    pub fn stored(
        &self,
        class_name: &str,
        instance_id: &str,
        attribute: &str,
    ) -> Result<&AttributeValues, AttributeError> {
        self.lookup(class_name, instance_id, attribute)
            .ok_or_else(|| AttributeError::Missing {
                attribute: attribute.to_owned(),
                class_name: class_name.to_owned(),
                instance_id: instance_id.to_owned(),
            })
    }

    /// Returns `true` when values are stored for the given attribute and
    /// instance.
    #[must_use]
    pub fn has_data(&self, class_name: &str, instance_id: &str, attribute: &str) -> bool {
        self.lookup(class_name, instance_id, attribute).is_some()
    }

    /// Removes the stored values for an attribute on one model instance,
    /// pruning empty storage levels.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Missing`] when nothing is stored.
    pub fn remove_data(
        &mut self,
        class_name: &str,
        instance_id: &str,
        attribute: &str,
    ) -> Result<(), AttributeError> {
        let missing = || AttributeError::Missing {
            attribute: attribute.to_owned(),
            class_name: class_name.to_owned(),
            instance_id: instance_id.to_owned(),
        };

        let class_data = self.data.get_mut(class_name).ok_or_else(missing)?;
        let instance_data = class_data.get_mut(instance_id).ok_or_else(missing)?;
        instance_data.remove(attribute).ok_or_else(missing)?;

        if instance_data.is_empty() {
            class_data.remove(instance_id);
        }
        if class_data.is_empty() {
            self.data.remove(class_name);
        }
        Ok(())
    }

    /// Returns all stored attribute data for one model instance, keyed by
    /// attribute name. Instances without data yield an empty map.
    #[must_use]
    pub fn instance_attributes(
        &self,
        class_name: &str,
        instance_id: &str,
    ) -> HashMap<String, AttributeValues> {
        self.data
            .get(class_name)
            .and_then(|class_data| class_data.get(instance_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the ids of instances of `class_name` that carry stored data
    /// for `attribute`, sorted lexicographically.
    #[must_use]
    pub fn instances_with(&self, class_name: &str, attribute: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .data
            .get(class_name)
            .map(|class_data| {
                class_data
                    .iter()
                    .filter(|(_, attrs)| attrs.contains_key(attribute))
                    .map(|(instance_id, _)| instance_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Exports all stored data for one model instance through each
    /// attribute's serialization hook.
    ///
    /// # Errors
    ///
    /// Lookup and instantiation errors from the registry and factory.
    pub fn serialize_instance(
        &mut self,
        class_name: &str,
        instance_id: &str,
    ) -> Result<HashMap<String, AttributeValues>, AttributeError> {
        let stored = self.instance_attributes(class_name, instance_id);
        let mut serialized = HashMap::with_capacity(stored.len());
        for (attribute, values) in stored {
            let instance = self.instance(&attribute)?;
            let payload = instance.serialize_data(&values);
            serialized.insert(attribute, payload);
        }
        Ok(serialized)
    }

    /// Imports attribute data for one model instance, passing each payload
    /// through the attribute's deserialization hook and then through the
    /// normal validated write path.
    ///
    /// # Errors
    ///
    /// Any error [`set_data`](Self::set_data) can raise.
    pub fn deserialize_instance(
        &mut self,
        class_name: &str,
        instance_id: &str,
        payload: HashMap<String, AttributeValues>,
    ) -> Result<(), AttributeError> {
        for (attribute, values) in payload {
            let restored = self.instance(&attribute)?.deserialize_data(&values);
            self.set_data(class_name, instance_id, &attribute, restored)?;
        }
        Ok(())
    }

    /// Returns the names of all registered attributes, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] before the first
    /// discovery.
    pub fn available_attributes(&self) -> Result<Vec<String>, AttributeError> {
        Ok(self
            .registry
            .list()?
            .into_iter()
            .map(|descriptor| descriptor.name().to_owned())
            .collect())
    }

    /// Returns the names of attributes extending the given model class.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::NotDiscovered`] before the first
    /// discovery.
    pub fn attributes_for_class(&self, class_name: &str) -> Result<Vec<String>, AttributeError> {
        self.registry.attributes_for_class(class_name)
    }

    /// Returns a metadata snapshot for one attribute.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AttributeRegistry::get`].
    pub fn attribute_info(&self, name: &str) -> Result<AttributeInfo, AttributeError> {
        self.registry.info(name)
    }

    /// Removes all stored data for one model instance.
    pub fn clear_instance(&mut self, class_name: &str, instance_id: &str) {
        if let Some(class_data) = self.data.get_mut(class_name) {
            class_data.remove(instance_id);
            if class_data.is_empty() {
                self.data.remove(class_name);
            }
        }
    }

    /// Clears cached instances and all stored data.
    ///
    /// Registered descriptors survive; call
    /// [`discover`](Self::discover) to rescan the source.
    pub fn reset(&mut self) {
        self.instances.clear();
        self.data.clear();
        info!(target: MANAGER_TARGET, "attribute manager reset");
    }

    /// Returns a reference to the owned registry.
    #[must_use]
    pub const fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    fn lookup(
        &self,
        class_name: &str,
        instance_id: &str,
        attribute: &str,
    ) -> Option<&AttributeValues> {
        self.data
            .get(class_name)
            .and_then(|class_data| class_data.get(instance_id))
            .and_then(|instance_data| instance_data.get(attribute))
    }
}

impl<S> std::fmt::Debug for AttributeManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeManager")
            .field("registry", &self.registry)
            .field("cached_instances", &self.instances.len())
            .field("classes_with_data", &self.data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
