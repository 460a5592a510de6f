//! Unit tests for the attribute capability surface.

use super::*;

struct BareAttribute {
    extends: Vec<String>,
}

impl Attribute for BareAttribute {
    fn name(&self) -> &str {
        "bare"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn extends_classes(&self) -> &[String] {
        &self.extends
    }

    fn default_values(&self) -> AttributeValues {
        let mut defaults = AttributeValues::new();
        defaults.insert("field".into(), 0.into());
        defaults
    }
}

#[test]
fn description_defaults_to_empty() {
    let attribute = BareAttribute { extends: Vec::new() };
    assert_eq!(attribute.description(), "");
}

#[test]
fn validate_accepts_everything_by_default() {
    let attribute = BareAttribute { extends: Vec::new() };
    let mut values = AttributeValues::new();
    values.insert("anything".into(), "goes".into());
    assert!(attribute.validate(&values).is_empty());
}

#[test]
fn serialization_hooks_pass_data_through_by_default() {
    let attribute = BareAttribute { extends: Vec::new() };
    let mut values = AttributeValues::new();
    values.insert("field".into(), 42.into());

    assert_eq!(attribute.serialize_data(&values), values);
    assert_eq!(attribute.deserialize_data(&values), values);
}
