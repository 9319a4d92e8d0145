use chrono::{DateTime, NaiveDate};
use serde_json::{Number, Value};
use uuid::Uuid;

use super::error::FilterError;
use super::types::FilterOp;

/// Storage kind of a queryable field; drives value coercion and SQL casts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Boolean,
    Timestamp,
    Uuid,
    /// `text[]` column; equality means "contains", `in` means "overlaps"
    TextArray,
}

impl FieldKind {
    /// Cast appended to a bound placeholder
    pub fn cast(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::TextArray => "",
            FieldKind::Number => "::float8",
            FieldKind::Integer => "::int8",
            FieldKind::Boolean => "::boolean",
            FieldKind::Timestamp => "::timestamptz",
            FieldKind::Uuid => "::uuid",
        }
    }

    fn supports(&self, op: FilterOp) -> bool {
        match self {
            FieldKind::Number | FieldKind::Integer | FieldKind::Timestamp | FieldKind::Text => true,
            FieldKind::Boolean | FieldKind::Uuid | FieldKind::TextArray => !op.is_range(),
        }
    }
}

/// A field exposed to list queries. `name` is the API name (camelCase, dotted for nested
/// objects); `column` is the SQL column.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }

    /// Top-level key of this field in the JSON representation
    pub fn output_key(&self) -> &'static str {
        self.name.split('.').next().unwrap_or(self.name)
    }
}

/// Whitelist of the fields a resource exposes to filtering, selection and sorting
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

impl Schema {
    pub fn field(&self, name: &str) -> Result<&FieldDef, FilterError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FilterError::UnknownField(name.to_string()))
    }

    /// Resolve a `select` entry to the top-level JSON key it keeps
    pub fn output_key(&self, name: &str) -> Result<&'static str, FilterError> {
        if let Ok(field) = self.field(name) {
            return Ok(field.output_key());
        }
        // `select=location` keeps the whole nested object
        self.fields
            .iter()
            .find(|f| f.output_key() == name)
            .map(|f| f.output_key())
            .ok_or_else(|| FilterError::UnknownField(name.to_string()))
    }

    /// Build a typed value for `field <op> raw`
    pub fn coerce(&self, field: &FieldDef, op: FilterOp, raw: &str) -> Result<Value, FilterError> {
        if !field.kind.supports(op) {
            return Err(FilterError::InvalidOperatorData {
                field: field.name.to_string(),
                op: format!("{:?}", op).to_lowercase(),
            });
        }

        if op == FilterOp::In {
            let values = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| coerce_scalar(field, s))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Array(values));
        }

        coerce_scalar(field, raw)
    }
}

fn coerce_scalar(field: &FieldDef, raw: &str) -> Result<Value, FilterError> {
    let invalid = || FilterError::InvalidValue {
        field: field.name.to_string(),
        value: raw.to_string(),
    };

    match field.kind {
        FieldKind::Text | FieldKind::TextArray => Ok(Value::String(raw.to_string())),
        FieldKind::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        FieldKind::Integer => raw.parse::<i64>().map(Value::from).map_err(|_| invalid()),
        FieldKind::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        FieldKind::Timestamp => {
            let valid = DateTime::parse_from_rfc3339(raw).is_ok()
                || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok();
            if valid { Ok(Value::String(raw.to_string())) } else { Err(invalid()) }
        }
        FieldKind::Uuid => Uuid::parse_str(raw)
            .map(|id| Value::String(id.to_string()))
            .map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldDef] = &[
        FieldDef::new("id", "id", FieldKind::Uuid),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("tuition", "tuition", FieldKind::Number),
        FieldDef::new("housing", "housing", FieldKind::Boolean),
        FieldDef::new("careers", "careers", FieldKind::TextArray),
        FieldDef::new("location.city", "city", FieldKind::Text),
    ];
    const SCHEMA: Schema = Schema { table: "things", fields: FIELDS };

    #[test]
    fn coerces_numbers_and_lists() {
        let tuition = SCHEMA.field("tuition").unwrap();
        assert_eq!(SCHEMA.coerce(tuition, FilterOp::Gt, "1000").unwrap(), json!(1000.0));
        assert_eq!(SCHEMA.coerce(tuition, FilterOp::In, "1,2").unwrap(), json!([1.0, 2.0]));
        assert!(SCHEMA.coerce(tuition, FilterOp::Gt, "cheap").is_err());
    }

    #[test]
    fn booleans_reject_ranges() {
        let housing = SCHEMA.field("housing").unwrap();
        assert_eq!(SCHEMA.coerce(housing, FilterOp::Eq, "true").unwrap(), json!(true));
        assert!(matches!(
            SCHEMA.coerce(housing, FilterOp::Gt, "true"),
            Err(FilterError::InvalidOperatorData { .. })
        ));
    }

    #[test]
    fn nested_fields_select_parent_object() {
        assert_eq!(SCHEMA.output_key("location.city").unwrap(), "location");
        assert_eq!(SCHEMA.output_key("location").unwrap(), "location");
        assert!(SCHEMA.output_key("password").is_err());
    }

    #[test]
    fn uuid_values_are_validated() {
        let id = SCHEMA.field("id").unwrap();
        assert!(SCHEMA.coerce(id, FilterOp::Eq, "not-a-uuid").is_err());
    }
}
