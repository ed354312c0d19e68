//! Source emission: intermediate models to an abstract source tree.
//!
//! The emitter performs no validation; everything was checked upstream.
//! Its only obligation is deterministic ordering: type declarations in
//! first-seen order, then one client declaration with one method per
//! operation, so identical input compiles to a byte-identical tree. The
//! tree is serializable and handed to the external formatter/writer.

// Internal imports (std, crate)
use crate::client::{ClientOperationModel, SecurityBinding};
use crate::normalize::ParamLocation;
use crate::params::QueryEncoding;
use crate::typemap::{FieldDef, TypeContext, TypeRef, TypeShape};
use crate::utils::to_snake_case;

// External imports (alphabetized)
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Target-agnostic type expression in the emitted tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeExpr {
    Named { name: String },
    Primitive { name: &'static str },
    Array { items: Box<TypeExpr> },
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDecl {
    Alias { ty: TypeExpr },
    Record { fields: Vec<FieldDecl> },
    Array { items: TypeExpr },
    Union { variants: Vec<TypeExpr>, nullable: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(flatten)]
    pub shape: ShapeDecl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub source: String,
    pub location: ParamLocation,
    pub ty: TypeExpr,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    /// Callable name derived from the operation id
    pub name: String,
    pub http_method: String,
    pub path: String,
    pub parameters: Vec<ParamDecl>,
    pub query_encoding: QueryEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<TypeExpr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<TypeExpr>,
}

/// One configuration knob on the generated client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigField {
    /// Field name on the client
    pub name: String,
    /// Declared scheme name in the spec
    pub scheme: String,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDecl {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    pub config: Vec<ConfigField>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decl", rename_all = "lowercase")]
pub enum Declaration {
    Type(TypeDecl),
    Client(ClientDecl),
}

/// Ordered output of one compiler run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbstractSourceTree {
    pub declarations: Vec<Declaration>,
}

/// Emit the abstract source tree for a completed run.
pub fn emit(
    ctx: &TypeContext,
    operations: &[ClientOperationModel],
    base_path: Option<String>,
    client_name: &str,
) -> AbstractSourceTree {
    let mut declarations: Vec<Declaration> = ctx
        .types()
        .iter()
        .map(|t| {
            Declaration::Type(TypeDecl {
                name: t.identifier.clone(),
                shape: shape_decl(ctx, &t.shape),
            })
        })
        .collect();

    declarations.push(Declaration::Client(ClientDecl {
        name: client_name.to_string(),
        base_path,
        config: config_fields(operations),
        methods: operations.iter().map(|op| method_decl(ctx, op)).collect(),
    }));

    AbstractSourceTree { declarations }
}

fn type_expr(ctx: &TypeContext, ty: &TypeRef) -> TypeExpr {
    match ty {
        TypeRef::Named(id) => TypeExpr::Named { name: ctx.identifier(*id).to_string() },
        TypeRef::Primitive(p) => TypeExpr::Primitive { name: p.as_str() },
        TypeRef::Array(items) => TypeExpr::Array { items: Box::new(type_expr(ctx, items)) },
        TypeRef::Any => TypeExpr::Any,
    }
}

fn shape_decl(ctx: &TypeContext, shape: &TypeShape) -> ShapeDecl {
    match shape {
        TypeShape::Alias { ty } => ShapeDecl::Alias { ty: type_expr(ctx, ty) },
        TypeShape::Record { fields } => ShapeDecl::Record {
            fields: fields.iter().map(|f| field_decl(ctx, f)).collect(),
        },
        TypeShape::Array { items } => ShapeDecl::Array { items: type_expr(ctx, items) },
        TypeShape::Union { variants, nullable } => ShapeDecl::Union {
            variants: variants.iter().map(|v| type_expr(ctx, v)).collect(),
            nullable: *nullable,
        },
    }
}

fn field_decl(ctx: &TypeContext, field: &FieldDef) -> FieldDecl {
    FieldDecl {
        name: field.name.clone(),
        ty: type_expr(ctx, &field.ty),
        required: field.required,
        default: field.default.clone(),
    }
}

fn method_decl(ctx: &TypeContext, op: &ClientOperationModel) -> MethodDecl {
    MethodDecl {
        name: to_snake_case(&op.id),
        http_method: op.method.clone(),
        path: op.path.template.clone(),
        parameters: op
            .path
            .parameters
            .iter()
            .map(|p| ParamDecl {
                name: p.binding.clone(),
                source: p.source_name.clone(),
                location: p.location,
                ty: type_expr(ctx, &p.ty),
                required: p.required,
                default: p.default.clone(),
            })
            .collect(),
        query_encoding: op.path.query_encoding,
        request: op.request.as_ref().map(|t| type_expr(ctx, t)),
        response: op.response.as_ref().map(|t| type_expr(ctx, t)),
    }
}

/// Collect distinct credential knobs across operations in first-seen
/// order. API-key and HTTP/OAuth schemes remain independent fields.
fn config_fields(operations: &[ClientOperationModel]) -> Vec<ConfigField> {
    let mut fields: Vec<ConfigField> = Vec::new();
    let mut push = |fields: &mut Vec<ConfigField>, scheme: &str, kind: &'static str| {
        if !fields.iter().any(|f| f.scheme == scheme) {
            fields.push(ConfigField {
                name: to_snake_case(scheme),
                scheme: scheme.to_string(),
                kind,
            });
        }
    };

    for SecurityBinding { api_keys, auth } in operations.iter().map(|op| &op.security) {
        for key in api_keys {
            push(&mut fields, &key.scheme, "api_key");
        }
        for a in auth {
            let kind = match a.kind {
                crate::client::AuthKind::HttpBasic => "http_basic",
                crate::client::AuthKind::HttpBearer => "http_bearer",
                crate::client::AuthKind::OAuth2 => "oauth2",
            };
            push(&mut fields, &a.scheme, kind);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_operation;
    use crate::config::DEFAULT_MAX_ARRAY_ITEMS;
    use crate::document::SpecDocument;
    use crate::normalize::normalize;
    use crate::target::TargetProfile;
    use crate::typemap::{map_schema, FieldPath};
    use serde_json::json;

    fn tree_for(json: serde_json::Value) -> AbstractSourceTree {
        let doc = normalize(&SpecDocument { json }).unwrap();
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        for (name, id) in doc.named_schemas() {
            map_schema(&mut ctx, &doc, id, &FieldPath::root(name)).unwrap();
        }
        let models: Vec<_> = doc
            .operations
            .iter()
            .map(|op| build_operation(op, &mut ctx, &doc, TargetProfile::rust()).unwrap())
            .collect();
        emit(&ctx, &models, doc.base_path.clone(), "WidgetClient")
    }

    #[test]
    fn test_types_precede_client_declaration() {
        let tree = tree_for(json!({
            "paths": {"/widgets": {"get": {"operationId": "listWidgets"}}},
            "components": {"schemas": {
                "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}}
            }}
        }));
        assert_eq!(tree.declarations.len(), 2);
        assert!(matches!(&tree.declarations[0], Declaration::Type(t) if t.name == "Widget"));
        let Declaration::Client(client) = &tree.declarations[1] else {
            panic!("expected client declaration last")
        };
        assert_eq!(client.name, "WidgetClient");
        assert_eq!(client.methods[0].name, "list_widgets");
    }

    #[test]
    fn test_shared_schema_declared_once() {
        let tree = tree_for(json!({
            "paths": {
                "/a": {"get": {"operationId": "a",
                    "responses": {"200": {"content": {"application/json": {"schema":
                        {"$ref": "#/components/schemas/Widget"}}}}}}},
                "/b": {"get": {"operationId": "b",
                    "responses": {"200": {"content": {"application/json": {"schema":
                        {"$ref": "#/components/schemas/Widget"}}}}}}}
            },
            "components": {"schemas": {
                "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}}
            }}
        }));
        let widget_count = tree
            .declarations
            .iter()
            .filter(|d| matches!(d, Declaration::Type(t) if t.name == "Widget"))
            .count();
        assert_eq!(widget_count, 1);

        let Declaration::Client(client) = tree.declarations.last().unwrap() else {
            panic!("expected client declaration last")
        };
        let widget_expr = TypeExpr::Named { name: "Widget".to_string() };
        assert_eq!(client.methods[0].response, Some(widget_expr.clone()));
        assert_eq!(client.methods[1].response, Some(widget_expr));
    }

    #[test]
    fn test_dual_security_config_fields() {
        let tree = tree_for(json!({
            "paths": {"/widgets": {"get": {
                "operationId": "listWidgets",
                "security": [{"keyAuth": []}, {"oauth": []}]
            }}},
            "components": {"securitySchemes": {
                "keyAuth": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                "oauth": {"type": "oauth2", "flows": {"clientCredentials": {}}}
            }}
        }));
        let Declaration::Client(client) = tree.declarations.last().unwrap() else {
            panic!("expected client declaration last")
        };
        assert_eq!(client.config.len(), 2);
        assert_eq!(client.config[0].kind, "api_key");
        assert_eq!(client.config[1].kind, "oauth2");
        assert_ne!(client.config[0].name, client.config[1].name);
    }

    #[test]
    fn test_emission_is_deterministic() {
        let spec = json!({
            "paths": {"/v1/{version}/v2/{name}": {"get": {
                "operationId": "lookup",
                "parameters": [
                    {"name": "version", "in": "path", "schema": {"type": "string"}},
                    {"name": "name", "in": "path", "schema": {"type": "string"}}
                ]
            }}},
            "components": {"schemas": {
                "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}}
            }}
        });
        let first = serde_json::to_string(&tree_for(spec.clone())).unwrap();
        let second = serde_json::to_string(&tree_for(spec)).unwrap();
        assert_eq!(first, second);
    }
}
