// other lookups use HashMap keyed by field name, hashed with seahash
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{HashMap, HashSet};

use std::sync::Arc;

// used when writing records as JSON
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::datatype::{FieldType, Value};
use crate::error::{EdnReaderError, Result};

pub type NameHasher = BuildHasherDefault<SeaHasher>;

// ------------- Field -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, field_type)
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

// ------------- Schema -------------

/// Ordered, immutable set of fields with unique names.
///
/// Field lookup by name goes through an index built once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    positions: HashMap<String, usize, NameHasher>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut positions = HashMap::<String, usize, NameHasher>::default();
        for (position, field) in fields.iter().enumerate() {
            if positions.insert(field.name().to_string(), position).is_some() {
                return Err(EdnReaderError::SchemaValidation {
                    field: field.name().to_string(),
                    message: "duplicate field name in schema".into(),
                });
            }
        }
        Ok(Self { fields, positions })
    }
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
    /// Position of the named field in schema order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.position(name).map(|position| &self.fields[position])
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

// ------------- Record -------------

/// One output record: field values in insertion order, tied to its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<(String, Value)>,
}

impl Record {
    /// Assembles a record from converted values.
    ///
    /// With `check_types`, every value must conform to its field's declared
    /// type and non-nullable fields must hold a non-null value. With
    /// `drop_unknown_fields`, entries whose name is not in the schema are
    /// removed; otherwise they are kept as given. A field name may appear
    /// only once.
    pub fn new(
        schema: Arc<Schema>,
        values: Vec<(String, Value)>,
        check_types: bool,
        drop_unknown_fields: bool,
    ) -> Result<Self> {
        let values = if drop_unknown_fields {
            values
                .into_iter()
                .filter(|(name, _)| schema.field(name).is_some())
                .collect()
        } else {
            values
        };
        {
            let mut seen = HashSet::<&str, NameHasher>::default();
            for (name, _) in &values {
                if !seen.insert(name.as_str()) {
                    return Err(EdnReaderError::SchemaValidation {
                        field: name.clone(),
                        message: "field given more than once".into(),
                    });
                }
            }
        }
        let record = Self { schema, values };
        if check_types {
            record.check_types()?;
        }
        Ok(record)
    }
    fn check_types(&self) -> Result<()> {
        let mut present = vec![false; self.schema.len()];
        for (name, value) in &self.values {
            let Some(position) = self.schema.position(name) else {
                continue;
            };
            let field = &self.schema.fields()[position];
            if !value.is_null() {
                present[position] = true;
            }
            if !value.conforms_to(field.field_type()) {
                return Err(EdnReaderError::SchemaValidation {
                    field: field.name().to_string(),
                    message: format!("value [{}] is not a valid {}", value, field.field_type()),
                });
            }
        }
        match self.schema.fields().iter().zip(&present).find(|(field, present)| !field.nullable() && !**present) {
            Some((field, _)) => Err(EdnReaderError::SchemaValidation {
                field: field.name().to_string(),
                message: "field cannot be null".into(),
            }),
            None => Ok(()),
        }
    }
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                Field::new("name", FieldType::String),
                Field::required("age", FieldType::Int),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = Schema::new(vec![
            Field::new("a", FieldType::Int),
            Field::new("a", FieldType::Long),
        ]);
        assert!(matches!(result, Err(EdnReaderError::SchemaValidation { field, .. }) if field == "a"));
    }

    #[test]
    fn type_check_rejects_mismatched_values() {
        let values = vec![("name".into(), Value::String("Bob".into())), ("age".into(), Value::String("thirty".into()))];
        assert!(Record::new(person(), values.clone(), true, true).is_err());
        let record = Record::new(person(), values, false, true).unwrap();
        assert_eq!(record.get("age"), Some(&Value::String("thirty".into())));
    }

    #[test]
    fn type_check_enforces_required_fields() {
        let values = vec![("name".into(), Value::String("Eve".into()))];
        let result = Record::new(person(), values, true, true);
        assert!(matches!(result, Err(EdnReaderError::SchemaValidation { field, .. }) if field == "age"));
    }

    #[test]
    fn unknown_fields_dropped_only_on_request() {
        let values = vec![("age".into(), Value::Int(3)), ("extra".into(), Value::Int(1))];
        let kept = Record::new(person(), values.clone(), false, false).unwrap();
        assert_eq!(kept.len(), 2);
        let dropped = Record::new(person(), values, false, true).unwrap();
        assert_eq!(dropped.len(), 1);
        assert!(dropped.get("extra").is_none());
    }

    #[test]
    fn a_field_appears_once() {
        let values = vec![("name".into(), Value::String("a".into())), ("name".into(), Value::String("b".into()))];
        for check_types in [true, false] {
            let result = Record::new(person(), values.clone(), check_types, true);
            assert!(
                matches!(result, Err(EdnReaderError::SchemaValidation { ref field, .. }) if field == "name"),
                "check_types={check_types}: {result:?}"
            );
        }
    }

    #[test]
    fn schema_positions_follow_field_order() {
        let schema = person();
        assert_eq!(schema.position("name"), Some(0));
        assert_eq!(schema.position("age"), Some(1));
        assert_eq!(schema.position("other"), None);
        assert_eq!(schema.field("age").map(Field::name), Some("age"));
    }

    #[test]
    fn record_serializes_in_insertion_order() {
        let values = vec![("name".into(), Value::String("Alice".into())), ("age".into(), Value::Int(30))];
        let record = Record::new(person(), values, true, true).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"name":"Alice","age":30}"#);
    }
}
