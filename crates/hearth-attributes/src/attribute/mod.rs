//! The attribute capability surface.
//!
//! An attribute is a pluggable data extension: a named bundle of fields an
//! external package attaches to core model objects without modifying the
//! core data model. Attributes declare which model classes they extend,
//! provide a default value set, and may customize validation and
//! serialization of their data.

#[cfg(test)]
mod tests;

/// Error type produced by attribute factories.
pub type AttributeFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One attribute's field values, keyed by field name.
pub type AttributeValues = serde_json::Map<String, serde_json::Value>;

/// Capability interface every attribute extension must implement.
///
/// # Example
///
/// ```
/// use hearth_attributes::attribute::{Attribute, AttributeValues};
///
/// struct CostData {
///     extends: Vec<String>,
/// }
///
/// impl Attribute for CostData {
///     fn name(&self) -> &str {
///         "cost_data"
///     }
///
///     fn version(&self) -> &str {
///         "1.0.0"
///     }
///
///     fn extends_classes(&self) -> &[String] {
///         &self.extends
///     }
///
///     fn default_values(&self) -> AttributeValues {
///         let mut defaults = AttributeValues::new();
///         defaults.insert("material_cost_per_m2".into(), 0.into());
///         defaults.insert("cost_currency".into(), "EUR".into());
///         defaults
///     }
/// }
/// ```
pub trait Attribute {
    /// Unique identifier for this attribute extension (e.g. `"cost_data"`).
    fn name(&self) -> &str;

    /// Version of the attribute's data schema. Informational.
    fn version(&self) -> &str;

    /// Names of the model classes this attribute applies to.
    fn extends_classes(&self) -> &[String];

    /// Human-readable description of what this attribute provides.
    fn description(&self) -> &str {
        ""
    }

    /// Returns the attribute's data schema as field defaults.
    fn default_values(&self) -> AttributeValues;

    /// Checks candidate field values before they are stored.
    ///
    /// Returns one message per problem; an empty list accepts the data.
    /// The default accepts everything.
    fn validate(&self, data: &AttributeValues) -> Vec<String> {
        let _ = data;
        Vec::new()
    }

    /// Prepares stored values for export. The default passes data through
    /// unchanged.
    fn serialize_data(&self, data: &AttributeValues) -> AttributeValues {
        data.clone()
    }

    /// Restores values from an export payload. The default passes data
    /// through unchanged.
    fn deserialize_data(&self, data: &AttributeValues) -> AttributeValues {
        data.clone()
    }
}
