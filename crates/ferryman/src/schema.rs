//! Tool descriptors derived from parameter structs.
//!
//! A tool declares its parameters as a struct deriving
//! [`schemars::JsonSchema`]. Field doc comments become parameter
//! descriptions, `Option<_>` and `#[serde(default)]` fields become optional,
//! and unit-only enums become enumerations. [`reflect`] runs schemars and
//! boils the result down to a [`ToolDescriptor`] that only knows the four
//! primitive types callers have to deal with.

use std::collections::BTreeSet;
use std::fmt;

use ferryproto::{Tool, ToolSchema};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// The primitive types a parameter can be reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// Map a JSON Schema `type` keyword. Anything else is reported as a string.
    pub fn from_schema_type(name: &str) -> Self {
        match name {
            "integer" => ParamType::Integer,
            "number" => ParamType::Number,
            "boolean" => ParamType::Boolean,
            _ => ParamType::String,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }

    /// Whether a JSON value has this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    pub inferred_type: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerated_values: Option<Vec<String>>,
    pub required: bool,
}

impl ParameterSpec {
    /// Look `candidate` up in the enumeration, ignoring ASCII case.
    ///
    /// Returns the declared spelling. Parameters without an enumeration
    /// accept nothing here.
    pub fn canonical_value(&self, candidate: &str) -> Option<&str> {
        self.enumerated_values
            .as_deref()?
            .iter()
            .find(|v| v.eq_ignore_ascii_case(candidate))
            .map(String::as_str)
    }

    /// `{type, description, enum?}` as it appears under `properties`.
    pub fn json_schema(&self) -> Value {
        let mut schema = json!({
            "type": self.inferred_type.as_str(),
            "description": self.description,
        });
        if let (Some(values), Some(obj)) = (&self.enumerated_values, schema.as_object_mut()) {
            obj.insert("enum".to_string(), json!(values));
        }
        schema
    }
}

/// Name, description and parameters of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_names(&self) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect()
    }

    /// `{type: "object", properties, required}`.
    pub fn input_schema(&self) -> ToolSchema {
        self.parameters
            .iter()
            .fold(ToolSchema::empty(), |schema, p| {
                schema.with_property(p.name.clone(), p.json_schema(), p.required)
            })
    }

    /// The `tools/list` entry for this tool.
    pub fn to_wire_tool(&self) -> Tool {
        Tool::new(self.name.clone(), self.description.clone()).with_input_schema(self.input_schema())
    }

    /// Chat-completions style `{"type": "function", "function": {...}}`.
    pub fn to_function_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": self.required_names(),
                },
            },
        })
    }
}

/// Build a descriptor for a tool named `name` documented by `doc`, taking
/// `P` as its parameters.
///
/// Never fails: a missing doc gives an empty description, and a schema
/// without properties gives an empty parameter list.
pub fn reflect<P: JsonSchema>(name: &str, doc: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: short_description(doc),
        parameters: parameters_from_schema(&schema_for::<P>()),
    }
}

/// Generate an inlined draft-07 JSON schema for a type.
pub fn schema_for<T: JsonSchema>() -> Value {
    let settings = schemars::generate::SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
    });
    let gen = settings.into_generator();
    let schema = gen.into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_default()
}

/// First paragraph of a doc string, with its lines joined.
pub fn short_description(doc: &str) -> String {
    doc.trim()
        .split("\n\n")
        .next()
        .unwrap_or("")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flatten the `properties` of an object schema into parameter specs.
///
/// Property order follows the schema map, which is sorted by name unless
/// serde_json's `preserve_order` is on; either way it is stable.
pub fn parameters_from_schema(schema: &Value) -> Vec<ParameterSpec> {
    let required: BTreeSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, property)| ParameterSpec {
            name: name.clone(),
            inferred_type: infer_type(property),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            enumerated_values: enumerated_values(property),
            required: required.contains(name.as_str()),
        })
        .collect()
}

// oneOf/anyOf show up for documented enum variants and some Option<T> shapes
fn branches(property: &Value) -> impl Iterator<Item = &Value> {
    ["oneOf", "anyOf"]
        .into_iter()
        .filter_map(move |key| property.get(key).and_then(Value::as_array))
        .flatten()
}

fn declared_type(property: &Value) -> Option<&str> {
    match property.get("type")? {
        Value::String(name) => Some(name.as_str()).filter(|n| *n != "null"),
        // ["string", "null"] from Option<T>
        Value::Array(names) => names.iter().filter_map(Value::as_str).find(|n| *n != "null"),
        _ => None,
    }
}

fn infer_type(property: &Value) -> ParamType {
    if let Some(name) = declared_type(property) {
        return ParamType::from_schema_type(name);
    }
    branches(property)
        .find_map(declared_type)
        .map(ParamType::from_schema_type)
        .unwrap_or(ParamType::String)
}

fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn literals(property: &Value) -> Vec<String> {
    let from_enum = property
        .get("enum")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(literal);
    let from_const = property.get("const").and_then(literal);
    from_enum.chain(from_const).collect()
}

fn enumerated_values(property: &Value) -> Option<Vec<String>> {
    let mut values = literals(property);
    if values.is_empty() {
        values = branches(property).flat_map(literals).collect();
    }

    let mut seen = BTreeSet::new();
    values.retain(|v| seen.insert(v.clone()));

    (!values.is_empty()).then_some(values)
}
