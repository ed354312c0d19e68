//! Parameter and path resolution.
//!
//! Turns a path template plus declared parameters into a resolved binding
//! model: placeholders matched against declarations, source names
//! sanitized into target identifiers, collisions disambiguated with
//! positional suffixes in declaration order, and the query-encoding
//! strategy chosen from parameter metadata alone.

// Internal imports (std, crate)
use std::collections::HashMap;

use crate::error::{ParamError, Result};
use crate::normalize::{NormalizedDocument, Operation, ParamLocation, ParameterSpec, SchemaKind};
use crate::target::TargetProfile;
use crate::typemap::{map_schema, FieldPath, PrimitiveType, TypeContext, TypeRef};

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"));

/// How the query string for an operation is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryEncoding {
    /// One binding per parameter, joined literally into the query string.
    Flat,
    /// Assemble a name-to-value map and serialize it uniformly; selected
    /// when a parameter declares deepObject style or a content encoding.
    Map,
}

/// A parameter bound to a target-language identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameter {
    /// Name as written in the spec
    pub source_name: String,
    /// Sanitized, collision-free identifier
    pub binding: String,
    pub location: ParamLocation,
    pub ty: TypeRef,
    pub required: bool,
    pub default: Option<JsonValue>,
}

/// One segment of a resolved path template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "segment", content = "value", rename_all = "lowercase")]
pub enum PathSegment {
    Literal(String),
    /// Binding identifier of the matching path parameter
    Placeholder(String),
}

/// The resolved parameter binding model for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPath {
    pub template: String,
    pub segments: Vec<PathSegment>,
    /// All bindings in declaration order
    pub parameters: Vec<ResolvedParameter>,
    pub query_encoding: QueryEncoding,
}

/// Resolve a path template against an operation's declared parameters.
pub fn resolve_path(
    op: &Operation,
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    target: &TargetProfile,
) -> Result<ResolvedPath> {
    let placeholders: Vec<String> = PLACEHOLDER_RE
        .captures_iter(&op.path)
        .map(|c| target.sanitize(&c[1]))
        .collect();

    let path_param_names: Vec<String> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
        .map(|p| target.sanitize(&p.name))
        .collect();

    // Placeholder/declaration agreement, both directions, compared on
    // sanitized names (pre-disambiguation).
    for placeholder in &placeholders {
        if !path_param_names.contains(placeholder) {
            return Err(ParamError::UnboundPathParameter {
                name: placeholder.clone(),
                template: op.path.clone(),
            }
            .into());
        }
    }
    for declared in &path_param_names {
        if !placeholders.contains(declared) {
            return Err(ParamError::UnboundPathParameter {
                name: declared.clone(),
                template: op.path.clone(),
            }
            .into());
        }
    }

    let parameters = resolve_parameters(op, ctx, doc, target)?;
    let segments = build_segments(&op.path, &parameters, target);
    let query_encoding = choose_query_encoding(&op.parameters);

    Ok(ResolvedPath {
        template: op.path.clone(),
        segments,
        parameters,
        query_encoding,
    })
}

fn resolve_parameters(
    op: &Operation,
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    target: &TargetProfile,
) -> Result<Vec<ResolvedParameter>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut resolved = Vec::with_capacity(op.parameters.len());

    for param in &op.parameters {
        let ty = parameter_type(op, param, ctx, doc)?;
        let sanitized = target.sanitize(&param.name);

        // Positional suffix in declaration order for duplicates
        let occurrence = seen.entry(sanitized.clone()).or_insert(0);
        *occurrence += 1;
        let disambiguated = if *occurrence == 1 {
            sanitized
        } else {
            format!("{}_{}", sanitized, *occurrence - 1)
        };
        let binding = if target.is_reserved(&disambiguated) {
            target.escape_reserved(&disambiguated)
        } else {
            disambiguated
        };

        let default = param
            .schema
            .map(|id| doc.schema(id).constraints.default.clone())
            .unwrap_or(None);

        // A default makes a query or header binding optional-with-default.
        // Path bindings stay mandatory: a segment cannot be omitted.
        let required = match param.location {
            ParamLocation::Path => true,
            _ => param.required && default.is_none(),
        };
        resolved.push(ResolvedParameter {
            source_name: param.name.clone(),
            binding,
            location: param.location,
            ty,
            required,
            default,
        });
    }
    Ok(resolved)
}

/// Validate the parameter's declared type against the binding whitelist
/// and map it. Path bindings accept primitives and enums of primitives;
/// query bindings additionally accept arrays of primitives and objects
/// with a declared serialization (deepObject style or content encoding).
fn parameter_type(
    op: &Operation,
    param: &ParameterSpec,
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
) -> Result<TypeRef> {
    let Some(schema_id) = param.schema else {
        // No schema at all: bind as a plain string
        return Ok(TypeRef::Primitive(PrimitiveType::String));
    };

    let (_, node) = doc.resolve(schema_id);
    let allowed = match &node.kind {
        SchemaKind::Primitive(_) | SchemaKind::Any => true,
        SchemaKind::Array { items } => {
            param.location == ParamLocation::Query
                && match items {
                    Some(item_id) => {
                        let (_, item_node) = doc.resolve(*item_id);
                        matches!(item_node.kind, SchemaKind::Primitive(_))
                    }
                    None => false,
                }
        }
        SchemaKind::Object { .. } | SchemaKind::AllOf(_) | SchemaKind::OneOf(_) => {
            param.location == ParamLocation::Query && has_serialization(param)
        }
        SchemaKind::Reference(_) => false,
    };
    if !allowed {
        return Err(ParamError::InvalidParameterType {
            name: param.name.clone(),
            location: param.location,
        }
        .into());
    }

    let path = FieldPath::root(&op.id).child(&param.name);
    map_schema(ctx, doc, schema_id, &path)
}

fn has_serialization(param: &ParameterSpec) -> bool {
    param.style.as_deref() == Some("deepObject") || param.has_content
}

/// Map encoding iff the metadata calls for it; never a function of count.
fn choose_query_encoding(parameters: &[ParameterSpec]) -> QueryEncoding {
    let needs_map = parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .any(has_serialization);
    if needs_map {
        QueryEncoding::Map
    } else {
        QueryEncoding::Flat
    }
}

fn build_segments(
    template: &str,
    parameters: &[ResolvedParameter],
    target: &TargetProfile,
) -> Vec<PathSegment> {
    // Match each placeholder to the first unconsumed path parameter with
    // the same sanitized source name.
    let mut consumed = vec![false; parameters.len()];
    let mut binding_for = |placeholder: &str| -> String {
        for (idx, p) in parameters.iter().enumerate() {
            if p.location == ParamLocation::Path
                && !consumed[idx]
                && target.sanitize(&p.source_name) == placeholder
            {
                consumed[idx] = true;
                return p.binding.clone();
            }
        }
        placeholder.to_string()
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let m = caps.get(0).expect("capture group 0 always present");
        if m.start() > last {
            segments.push(PathSegment::Literal(template[last..m.start()].to_string()));
        }
        let placeholder = target.sanitize(&caps[1]);
        segments.push(PathSegment::Placeholder(binding_for(&placeholder)));
        last = m.end();
    }
    if last < template.len() {
        segments.push(PathSegment::Literal(template[last..].to_string()));
    }
    segments
}
