//! Document normalization: raw spec JSON to a resolved, indexed model.
//!
//! The normalizer turns the loaded document into an arena of
//! [`SchemaNode`]s addressed by [`SchemaId`] handles, a list of
//! [`Operation`]s, and a table of security schemes. Every `$ref` is
//! resolved to a handle into the arena rather than copied, so later
//! deduplication can compare by identity. The normalizer is pure with
//! respect to its input: it only builds the normalized tree, or fails
//! with a [`SpecError`].

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::fmt;

use crate::document::SpecDocument;
use crate::error::{Result, SpecError};

// External imports (alphabetized)
use log::warn;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Stable handle to a schema node in the normalized arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaId(pub(crate) usize);

/// One property of an object schema.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: String,
    pub schema: SchemaId,
    pub required: bool,
    pub default: Option<JsonValue>,
}

/// Structural kind of a schema node.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// Primitive type, kept as the raw spec kind string. Validated against
    /// the supported set during type mapping, not here.
    Primitive(String),
    Object { properties: Vec<PropertySpec> },
    Array { items: Option<SchemaId> },
    /// Top-level named alias to another named schema.
    Reference(SchemaId),
    AllOf(Vec<SchemaId>),
    OneOf(Vec<SchemaId>),
    /// Schema with no type information at all; maps to the open placeholder.
    Any,
}

/// Validation constraints carried on a schema node.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub enum_values: Vec<JsonValue>,
    pub default: Option<JsonValue>,
}

/// A resolved spec type definition.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Present for top-level named schemas only
    pub name: Option<String>,
    pub kind: SchemaKind,
    pub nullable: bool,
    pub constraints: Constraints,
}

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Header => write!(f, "header"),
        }
    }
}

/// A declared operation parameter, pre-resolution.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: Option<SchemaId>,
    pub style: Option<String>,
    /// True when the parameter declares a `content` media-type map, which
    /// selects map-based query encoding downstream.
    pub has_content: bool,
}

/// One addressable action in the spec.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: String,
    pub method: String,
    pub path: String,
    pub parameters: Vec<ParameterSpec>,
    pub request: Option<SchemaId>,
    pub response: Option<SchemaId>,
    /// Operation-scope security requirement names; `None` inherits the
    /// document scope.
    pub security: Option<Vec<String>>,
}

/// A declared security scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityScheme {
    ApiKey { param: String, location: String },
    HttpBasic,
    HttpBearer,
    OAuth2 { flows: Vec<String> },
    /// Kind outside the supported set; rejected when an operation uses it.
    Unknown(String),
}

/// The normalized document: read-only projection consumed by the mapper,
/// resolver and client generator.
#[derive(Debug)]
pub struct NormalizedDocument {
    schemas: Vec<SchemaNode>,
    by_name: BTreeMap<String, SchemaId>,
    pub operations: Vec<Operation>,
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    pub document_security: Vec<String>,
    pub base_path: Option<String>,
}

impl NormalizedDocument {
    pub fn schema(&self, id: SchemaId) -> &SchemaNode {
        &self.schemas[id.0]
    }

    pub fn schema_id(&self, name: &str) -> Option<SchemaId> {
        self.by_name.get(name).copied()
    }

    /// Named schemas in deterministic (name) order.
    pub fn named_schemas(&self) -> impl Iterator<Item = (&str, SchemaId)> {
        self.by_name.iter().map(|(n, id)| (n.as_str(), *id))
    }

    /// Follow reference nodes to the underlying definition. Terminates
    /// because reference cycles are rejected during normalization.
    pub(crate) fn resolve(&self, mut id: SchemaId) -> (SchemaId, &SchemaNode) {
        loop {
            match &self.schemas[id.0].kind {
                SchemaKind::Reference(target) => id = *target,
                _ => return (id, &self.schemas[id.0]),
            }
        }
    }
}

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const METHODS: [&str; 5] = ["get", "put", "post", "delete", "patch"];

/// Normalize a loaded document.
///
/// Resolves references, expands parameter defaults and validates top-level
/// structure. Fails with [`SpecError::UnresolvedReference`] for dangling
/// `$ref`s, [`SpecError::MalformedDocument`] for missing sections and
/// [`SpecError::CircularReference`] for non-terminating reference chains.
pub fn normalize(document: &SpecDocument) -> Result<NormalizedDocument> {
    let mut builder = Builder {
        root: document.as_json(),
        schemas: Vec::new(),
        by_name: BTreeMap::new(),
    };

    builder.build_named_schemas()?;
    let operations = builder.build_operations()?;
    let security_schemes = builder.build_security_schemes()?;
    let document_security = requirement_names(builder.root.get("security"));

    let schemas: Vec<SchemaNode> = builder
        .schemas
        .into_iter()
        .map(|s| s.expect("all schema slots filled after normalization"))
        .collect();

    let doc = NormalizedDocument {
        schemas,
        by_name: builder.by_name,
        operations,
        security_schemes,
        document_security,
        base_path: document.base_path(),
    };
    check_reference_cycles(&doc)?;
    Ok(doc)
}

struct Builder<'a> {
    root: &'a JsonValue,
    /// Arena under construction; named slots are allocated before their
    /// bodies are parsed so forward references resolve.
    schemas: Vec<Option<SchemaNode>>,
    by_name: BTreeMap<String, SchemaId>,
}

impl<'a> Builder<'a> {
    fn named_schema_defs(&self) -> Option<&'a serde_json::Map<String, JsonValue>> {
        self.root
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(JsonValue::as_object)
    }

    fn build_named_schemas(&mut self) -> Result<()> {
        let Some(defs) = self.named_schema_defs() else {
            return Ok(());
        };

        // Two passes: allocate every named slot first so $ref targets are
        // known, then parse bodies.
        for name in defs.keys() {
            let id = SchemaId(self.schemas.len());
            self.schemas.push(None);
            self.by_name.insert(name.clone(), id);
        }
        for (name, raw) in defs {
            let id = self.by_name[name];
            let node = self.parse_schema(raw, Some(name.as_str()))?;
            self.schemas[id.0] = Some(node);
        }
        Ok(())
    }

    fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.schemas.len());
        self.schemas.push(Some(node));
        id
    }

    fn resolve_ref(&self, ref_str: &str) -> Result<SchemaId> {
        let name = ref_str
            .strip_prefix(SCHEMA_REF_PREFIX)
            .ok_or_else(|| SpecError::UnresolvedReference(ref_str.to_string()))?;
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnresolvedReference(ref_str.to_string()).into())
    }

    /// Build a child schema, returning the referenced slot directly for
    /// `$ref` children so both reference sites share one identity.
    fn build_child(&mut self, raw: &JsonValue) -> Result<SchemaId> {
        if let Some(ref_str) = raw.get("$ref").and_then(JsonValue::as_str) {
            return self.resolve_ref(ref_str);
        }
        let node = self.parse_schema(raw, None)?;
        Ok(self.alloc(node))
    }

    fn parse_schema(&mut self, raw: &JsonValue, name: Option<&str>) -> Result<SchemaNode> {
        if let Some(ref_str) = raw.get("$ref").and_then(JsonValue::as_str) {
            let target = self.resolve_ref(ref_str)?;
            return Ok(SchemaNode {
                name: name.map(String::from),
                kind: SchemaKind::Reference(target),
                nullable: false,
                constraints: Constraints::default(),
            });
        }

        let obj = raw.as_object().ok_or_else(|| {
            SpecError::MalformedDocument(format!(
                "schema '{}' is not an object",
                name.unwrap_or("<inline>")
            ))
        })?;

        let nullable = obj
            .get("nullable")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        let constraints = parse_constraints(obj);
        let type_str = obj.get("type").and_then(JsonValue::as_str);

        let kind = if let Some(members) = obj.get("allOf").and_then(JsonValue::as_array) {
            SchemaKind::AllOf(self.build_children(members)?)
        } else if let Some(members) = obj
            .get("oneOf")
            .or_else(|| obj.get("anyOf"))
            .and_then(JsonValue::as_array)
        {
            SchemaKind::OneOf(self.build_children(members)?)
        } else if type_str == Some("object") || obj.contains_key("properties") {
            let required: Vec<&str> = obj
                .get("required")
                .and_then(JsonValue::as_array)
                .map(|arr| arr.iter().filter_map(JsonValue::as_str).collect())
                .unwrap_or_default();
            let mut properties = Vec::new();
            if let Some(props) = obj.get("properties").and_then(JsonValue::as_object) {
                for (prop_name, prop_raw) in props {
                    let schema = self.build_child(prop_raw)?;
                    properties.push(PropertySpec {
                        name: prop_name.clone(),
                        schema,
                        required: required.contains(&prop_name.as_str()),
                        default: prop_raw.get("default").cloned(),
                    });
                }
            }
            SchemaKind::Object { properties }
        } else if type_str == Some("array") {
            let items = match obj.get("items") {
                Some(items_raw) => Some(self.build_child(items_raw)?),
                None => None,
            };
            SchemaKind::Array { items }
        } else if let Some(t) = type_str {
            SchemaKind::Primitive(t.to_string())
        } else {
            SchemaKind::Any
        };

        Ok(SchemaNode {
            name: name.map(String::from),
            kind,
            nullable,
            constraints,
        })
    }

    fn build_children(&mut self, members: &[JsonValue]) -> Result<Vec<SchemaId>> {
        members.iter().map(|m| self.build_child(m)).collect()
    }

    fn build_operations(&mut self) -> Result<Vec<Operation>> {
        let paths = self
            .root
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| SpecError::MalformedDocument("missing 'paths' section".to_string()))?;

        let mut operations = Vec::new();
        for (path, item) in paths {
            let shared_params = item.get("parameters").and_then(JsonValue::as_array);
            for method in METHODS {
                let Some(op_raw) = item.get(method).and_then(JsonValue::as_object) else {
                    continue;
                };
                let id = op_raw
                    .get("operationId")
                    .and_then(JsonValue::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| {
                        format!("{}_{}", method, path.trim_start_matches('/').replace('/', "_"))
                    });

                let mut parameters = Vec::new();
                for raw_params in [shared_params, op_raw.get("parameters").and_then(JsonValue::as_array)]
                    .into_iter()
                    .flatten()
                {
                    for raw in raw_params {
                        if let Some(param) = self.parse_parameter(raw)? {
                            parameters.push(param);
                        }
                    }
                }

                let request = match op_raw
                    .get("requestBody")
                    .and_then(|rb| rb.get("content"))
                    .and_then(|c| c.get("application/json"))
                    .and_then(|mt| mt.get("schema"))
                {
                    Some(schema) => Some(self.build_child(schema)?),
                    None => None,
                };
                let response = match op_raw
                    .get("responses")
                    .and_then(|r| r.get("200"))
                    .and_then(|r| r.get("content"))
                    .and_then(|c| c.get("application/json"))
                    .and_then(|mt| mt.get("schema"))
                {
                    Some(schema) => Some(self.build_child(schema)?),
                    None => None,
                };

                let security = op_raw
                    .get("security")
                    .map(|s| requirement_names(Some(s)));

                operations.push(Operation {
                    id,
                    method: method.to_string(),
                    path: path.clone(),
                    parameters,
                    request,
                    response,
                    security,
                });
            }
        }
        Ok(operations)
    }

    fn parse_parameter(&mut self, raw: &JsonValue) -> Result<Option<ParameterSpec>> {
        // Parameter objects may themselves be referenced.
        let raw = match raw.get("$ref").and_then(JsonValue::as_str) {
            Some(ref_str) => self
                .root
                .pointer(&ref_str[1..])
                .ok_or_else(|| SpecError::UnresolvedReference(ref_str.to_string()))?,
            None => raw,
        };

        let name = raw
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| SpecError::MalformedDocument("parameter without a name".to_string()))?
            .to_string();
        let location = match raw.get("in").and_then(JsonValue::as_str) {
            Some("path") => ParamLocation::Path,
            Some("query") => ParamLocation::Query,
            Some("header") => ParamLocation::Header,
            other => {
                warn!("skipping parameter '{}' with unsupported location {:?}", name, other);
                return Ok(None);
            }
        };

        let has_content = raw.get("content").is_some();
        let schema_raw = raw.get("schema").or_else(|| {
            raw.get("content")
                .and_then(JsonValue::as_object)
                .and_then(|c| c.values().next())
                .and_then(|mt| mt.get("schema"))
        });
        let schema = match schema_raw {
            Some(s) => Some(self.build_child(s)?),
            None => None,
        };

        Ok(Some(ParameterSpec {
            required: location == ParamLocation::Path
                || raw.get("required").and_then(JsonValue::as_bool).unwrap_or(false),
            name,
            location,
            schema,
            style: raw.get("style").and_then(JsonValue::as_str).map(String::from),
            has_content,
        }))
    }

    fn build_security_schemes(&mut self) -> Result<BTreeMap<String, SecurityScheme>> {
        let mut schemes = BTreeMap::new();
        let Some(defs) = self
            .root
            .get("components")
            .and_then(|c| c.get("securitySchemes"))
            .and_then(JsonValue::as_object)
        else {
            return Ok(schemes);
        };

        for (name, raw) in defs {
            let kind = raw.get("type").and_then(JsonValue::as_str).unwrap_or("unspecified");
            let scheme = match kind {
                "apiKey" => SecurityScheme::ApiKey {
                    param: raw
                        .get("name")
                        .and_then(JsonValue::as_str)
                        .unwrap_or(name)
                        .to_string(),
                    location: raw
                        .get("in")
                        .and_then(JsonValue::as_str)
                        .unwrap_or("header")
                        .to_string(),
                },
                "http" => match raw.get("scheme").and_then(JsonValue::as_str) {
                    Some("basic") => SecurityScheme::HttpBasic,
                    Some("bearer") => SecurityScheme::HttpBearer,
                    other => SecurityScheme::Unknown(format!(
                        "http {}",
                        other.unwrap_or("unspecified")
                    )),
                },
                "oauth2" => SecurityScheme::OAuth2 {
                    flows: raw
                        .get("flows")
                        .and_then(JsonValue::as_object)
                        .map(|f| f.keys().cloned().collect())
                        .unwrap_or_default(),
                },
                other => SecurityScheme::Unknown(other.to_string()),
            };
            schemes.insert(name.clone(), scheme);
        }
        Ok(schemes)
    }
}

fn parse_constraints(obj: &serde_json::Map<String, JsonValue>) -> Constraints {
    Constraints {
        min_length: obj.get("minLength").and_then(JsonValue::as_u64),
        max_length: obj.get("maxLength").and_then(JsonValue::as_u64),
        min_items: obj.get("minItems").and_then(JsonValue::as_u64),
        max_items: obj.get("maxItems").and_then(JsonValue::as_u64),
        enum_values: obj
            .get("enum")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default(),
        default: obj.get("default").cloned(),
    }
}

/// Names mentioned by a security requirement array.
fn requirement_names(raw: Option<&JsonValue>) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(arr) = raw.and_then(JsonValue::as_array) {
        for entry in arr {
            if let Some(obj) = entry.as_object() {
                for key in obj.keys() {
                    if !names.contains(key) {
                        names.push(key.clone());
                    }
                }
            }
        }
    }
    names
}

/// Reject cycles that would expand forever on the type axis: chains of
/// reference nodes and `allOf` members. Object properties and array items
/// are value-level indirection and stay legal.
fn check_reference_cycles(doc: &NormalizedDocument) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        White,
        Grey,
        Black,
    }

    fn visit(doc: &NormalizedDocument, id: SchemaId, marks: &mut [Mark]) -> Result<()> {
        match marks[id.0] {
            Mark::Black => return Ok(()),
            Mark::Grey => {
                let name = doc
                    .schema(id)
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("schema #{}", id.0));
                return Err(SpecError::CircularReference(name).into());
            }
            Mark::White => {}
        }
        marks[id.0] = Mark::Grey;
        let targets: Vec<SchemaId> = match &doc.schema(id).kind {
            SchemaKind::Reference(t) => vec![*t],
            SchemaKind::AllOf(members) => members.clone(),
            _ => Vec::new(),
        };
        for t in targets {
            visit(doc, t, marks)?;
        }
        marks[id.0] = Mark::Black;
        Ok(())
    }

    let mut marks = vec![Mark::White; doc.schemas.len()];
    for idx in 0..doc.schemas.len() {
        visit(doc, SchemaId(idx), &mut marks)?;
    }
    Ok(())
}
