//! Client operation assembly.
//!
//! Joins an operation's resolved path bindings, payload types and security
//! requirements into one [`ClientOperationModel`]. Security schemes of
//! different families (API-key vs. HTTP/OAuth2) stay separate so the
//! generated client can expose each as its own configuration knob.

// Internal imports (std, crate)
use crate::error::{ClientError, Result, SpecError};
use crate::normalize::{NormalizedDocument, Operation, SecurityScheme};
use crate::params::{resolve_path, ResolvedPath};
use crate::target::TargetProfile;
use crate::typemap::{map_schema, FieldPath, TypeContext, TypeRef};
use crate::utils::to_upper_camel_case;

// External imports (alphabetized)
use log::debug;
use serde::Serialize;

/// An API-key credential knob on the generated client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiKeyBinding {
    /// Declared scheme name
    pub scheme: String,
    /// Header/query parameter carrying the key
    pub param: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    HttpBasic,
    HttpBearer,
    OAuth2,
}

/// An HTTP/OAuth credential knob on the generated client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthBinding {
    pub scheme: String,
    pub kind: AuthKind,
}

/// Resolved credential requirements for one operation. API-key and
/// HTTP/OAuth schemes are carried side by side, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityBinding {
    pub api_keys: Vec<ApiKeyBinding>,
    pub auth: Vec<AuthBinding>,
}

impl SecurityBinding {
    pub fn is_empty(&self) -> bool {
        self.api_keys.is_empty() && self.auth.is_empty()
    }
}

/// Operation plus everything the emitter needs to declare its method.
#[derive(Debug, Clone, Serialize)]
pub struct ClientOperationModel {
    pub id: String,
    pub method: String,
    pub path: ResolvedPath,
    pub request: Option<TypeRef>,
    pub response: Option<TypeRef>,
    pub security: SecurityBinding,
}

/// Assemble the client model for one operation.
pub fn build_operation(
    op: &Operation,
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    target: &TargetProfile,
) -> Result<ClientOperationModel> {
    debug!("building client operation '{}'", op.id);

    let security = resolve_security(op, doc)?;
    let path = resolve_path(op, ctx, doc, target)?;

    let request = match op.request {
        Some(id) => {
            let root = FieldPath::root(format!("{}Request", to_upper_camel_case(&op.id)));
            Some(map_schema(ctx, doc, id, &root)?)
        }
        None => None,
    };
    let response = match op.response {
        Some(id) => {
            let root = FieldPath::root(format!("{}Response", to_upper_camel_case(&op.id)));
            Some(map_schema(ctx, doc, id, &root)?)
        }
        None => None,
    };

    Ok(ClientOperationModel {
        id: op.id.clone(),
        method: op.method.clone(),
        path,
        request,
        response,
        security,
    })
}

/// Merge document- and operation-scope security requirements into one
/// binding. Unknown scheme kinds are rejected rather than dropped.
fn resolve_security(op: &Operation, doc: &NormalizedDocument) -> Result<SecurityBinding> {
    let mut names: Vec<&str> = doc.document_security.iter().map(String::as_str).collect();
    if let Some(op_names) = &op.security {
        for name in op_names {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
    }

    let mut binding = SecurityBinding::default();
    for name in names {
        let scheme = doc.security_schemes.get(name).ok_or_else(|| {
            SpecError::UnresolvedReference(format!("security scheme '{}'", name))
        })?;
        match scheme {
            SecurityScheme::ApiKey { param, location } => binding.api_keys.push(ApiKeyBinding {
                scheme: name.to_string(),
                param: param.clone(),
                location: location.clone(),
            }),
            SecurityScheme::HttpBasic => binding.auth.push(AuthBinding {
                scheme: name.to_string(),
                kind: AuthKind::HttpBasic,
            }),
            SecurityScheme::HttpBearer => binding.auth.push(AuthBinding {
                scheme: name.to_string(),
                kind: AuthKind::HttpBearer,
            }),
            SecurityScheme::OAuth2 { .. } => binding.auth.push(AuthBinding {
                scheme: name.to_string(),
                kind: AuthKind::OAuth2,
            }),
            SecurityScheme::Unknown(kind) => {
                return Err(ClientError::UnsupportedSecurityScheme(kind.clone()).into());
            }
        }
    }
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_ARRAY_ITEMS;
    use crate::document::SpecDocument;
    use crate::error::Error;
    use crate::normalize::normalize;
    use serde_json::json;

    fn build_first(json: serde_json::Value) -> Result<ClientOperationModel> {
        let doc = normalize(&SpecDocument { json }).unwrap();
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        build_operation(&doc.operations[0], &mut ctx, &doc, TargetProfile::rust())
    }

    #[test]
    fn test_api_key_and_oauth_stay_separate() {
        let model = build_first(json!({
            "paths": {"/widgets": {"get": {
                "operationId": "listWidgets",
                "security": [{"keyAuth": []}, {"oauth": []}]
            }}},
            "components": {"securitySchemes": {
                "keyAuth": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                "oauth": {"type": "oauth2", "flows": {"clientCredentials": {}}}
            }}
        }))
        .unwrap();
        assert_eq!(model.security.api_keys.len(), 1);
        assert_eq!(model.security.auth.len(), 1);
        assert_eq!(model.security.api_keys[0].param, "X-API-Key");
        assert_eq!(model.security.auth[0].kind, AuthKind::OAuth2);
    }

    #[test]
    fn test_document_scope_security_inherited() {
        let model = build_first(json!({
            "security": [{"bearerAuth": []}],
            "paths": {"/widgets": {"get": {"operationId": "listWidgets"}}},
            "components": {"securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer"}
            }}
        }))
        .unwrap();
        assert_eq!(
            model.security.auth,
            vec![AuthBinding {
                scheme: "bearerAuth".to_string(),
                kind: AuthKind::HttpBearer
            }]
        );
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let err = build_first(json!({
            "paths": {"/widgets": {"get": {
                "operationId": "listWidgets",
                "security": [{"tls": []}]
            }}},
            "components": {"securitySchemes": {
                "tls": {"type": "mutualTLS"}
            }}
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported security scheme 'mutualTLS'");
    }

    #[test]
    fn test_missing_scheme_is_unresolved_reference() {
        let err = build_first(json!({
            "paths": {"/widgets": {"get": {
                "operationId": "listWidgets",
                "security": [{"ghost": []}]
            }}}
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Spec(SpecError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_payload_types_attached() {
        let model = build_first(json!({
            "paths": {"/widgets": {"post": {
                "operationId": "createWidget",
                "requestBody": {"content": {"application/json": {"schema": {
                    "$ref": "#/components/schemas/Widget"
                }}}},
                "responses": {"200": {"content": {"application/json": {"schema": {
                    "$ref": "#/components/schemas/Widget"
                }}}}}
            }}},
            "components": {"schemas": {
                "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}}
            }}
        }))
        .unwrap();
        // Both payload sites resolve to the identical generated type
        assert_eq!(model.request, model.response);
        assert!(model.request.is_some());
    }
}
