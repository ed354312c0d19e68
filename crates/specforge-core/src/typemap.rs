//! Schema-to-type mapping: the intermediate type model.
//!
//! `map_schema` walks normalized schema nodes and produces
//! [`GeneratedType`] declarations inside a per-run [`TypeContext`].
//! Mapping is memoized by schema identity, so two reference sites pointing
//! at the same target always yield the same [`TypeId`] and exactly one
//! declaration. Recursion through self-referential records terminates via
//! a reservation placeholder inserted before the descent. All naming is
//! derived from the enclosing field path with deterministic numeric
//! suffixes, never from hashes, so output is byte-reproducible.

// Internal imports (std, crate)
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Result, TypeError};
use crate::normalize::{NormalizedDocument, PropertySpec, SchemaId, SchemaKind};
use crate::utils::to_upper_camel_case;

// External imports (alphabetized)
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Handle to a generated type declaration, unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) usize);

/// Primitive kinds the target can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

/// Reference to a type from a field, parameter or payload position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "ref", content = "value", rename_all = "lowercase")]
pub enum TypeRef {
    Named(TypeId),
    Primitive(PrimitiveType),
    Array(Box<TypeRef>),
    /// Open placeholder for schemas with no type information (e.g. an
    /// array with no `items`).
    Any,
}

/// One field of a record shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    /// Mandatory iff required in the spec with no default.
    pub required: bool,
    pub default: Option<JsonValue>,
}

/// Shape of a generated type declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeShape {
    Alias { ty: TypeRef },
    Record { fields: Vec<FieldDef> },
    Array { items: TypeRef },
    Union { variants: Vec<TypeRef>, nullable: bool },
}

/// A resolved output type declaration.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedType {
    pub id: TypeId,
    /// Unique (case-sensitive) within the generated namespace
    pub identifier: String,
    pub shape: TypeShape,
}

/// Dotted path to the schema element being mapped; used both for error
/// locations and for naming anonymous synthesized types.
#[derive(Debug, Clone)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self { segments: vec![name.into()] }
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    /// Deterministic type name for an anonymous schema at this path.
    pub fn type_name(&self) -> String {
        self.segments.iter().map(|s| to_upper_camel_case(s)).collect()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Per-run mapping state: the deduplication and naming tables. Passed
/// explicitly to every mapping call so parallel runs never interfere.
#[derive(Debug)]
pub struct TypeContext {
    max_array_items: u64,
    /// Schema identity -> declaration; the memoization table.
    slots: HashMap<SchemaId, TypeId>,
    /// Declarations in first-seen order.
    types: Vec<GeneratedType>,
    used_identifiers: HashSet<String>,
    suffix_counters: HashMap<String, usize>,
    /// Structural fingerprint -> declaration, for anonymous types.
    dedup: HashMap<String, TypeId>,
}

impl TypeContext {
    pub fn new(max_array_items: u64) -> Self {
        Self {
            max_array_items,
            slots: HashMap::new(),
            types: Vec::new(),
            used_identifiers: HashSet::new(),
            suffix_counters: HashMap::new(),
            dedup: HashMap::new(),
        }
    }

    pub fn max_array_items(&self) -> u64 {
        self.max_array_items
    }

    /// Declarations in first-seen order.
    pub fn types(&self) -> &[GeneratedType] {
        &self.types
    }

    pub fn identifier(&self, id: TypeId) -> &str {
        &self.types[id.0].identifier
    }

    fn slot(&self, schema: SchemaId) -> Option<TypeId> {
        self.slots.get(&schema).copied()
    }

    /// Reserve a declaration slot before descending, so value-level
    /// recursion terminates without back-pointers.
    fn reserve(&mut self, schema: SchemaId, base: &str) -> TypeId {
        let identifier = self.unique_identifier(&to_upper_camel_case(base));
        let id = TypeId(self.types.len());
        self.types.push(GeneratedType {
            id,
            identifier,
            // Placeholder; overwritten by finish()
            shape: TypeShape::Alias { ty: TypeRef::Any },
        });
        self.slots.insert(schema, id);
        id
    }

    fn finish(&mut self, id: TypeId, shape: TypeShape) {
        self.types[id.0].shape = shape;
    }

    /// Declare an anonymous synthesized type, collapsing structurally
    /// identical shapes into one declaration.
    fn declare_anonymous(&mut self, base: &str, shape: TypeShape) -> TypeId {
        let key = fingerprint(&shape);
        if let Some(id) = self.dedup.get(&key) {
            return *id;
        }
        let identifier = self.unique_identifier(base);
        let id = TypeId(self.types.len());
        self.types.push(GeneratedType { id, identifier, shape });
        self.dedup.insert(key, id);
        id
    }

    /// Case-sensitive unique identifier with a numeric suffix appended in
    /// first-seen order on collision.
    fn unique_identifier(&mut self, base: &str) -> String {
        if self.used_identifiers.insert(base.to_string()) {
            return base.to_string();
        }
        let counter = self.suffix_counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", base, *counter);
            if self.used_identifiers.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Canonical structural key; serialization of the shape enum cannot fail.
fn fingerprint(shape: &TypeShape) -> String {
    serde_json::to_string(shape).expect("shape serialization is infallible")
}

fn primitive_type(raw: &str) -> Result<PrimitiveType> {
    match raw {
        "string" => Ok(PrimitiveType::String),
        "integer" => Ok(PrimitiveType::Integer),
        "number" => Ok(PrimitiveType::Number),
        "boolean" => Ok(PrimitiveType::Boolean),
        other => Err(TypeError::UnsupportedDataType(other.to_string()).into()),
    }
}

fn kind_description(kind: &SchemaKind) -> String {
    match kind {
        SchemaKind::Primitive(raw) => raw.clone(),
        SchemaKind::Object { .. } => "object".to_string(),
        SchemaKind::Array { .. } => "array".to_string(),
        SchemaKind::Reference(_) => "reference".to_string(),
        SchemaKind::AllOf(_) => "allOf".to_string(),
        SchemaKind::OneOf(_) => "oneOf".to_string(),
        SchemaKind::Any => "any".to_string(),
    }
}

/// Map a schema node into the intermediate type model.
///
/// Idempotent and order-independent: repeated calls for one schema return
/// the same `TypeRef` without new declarations.
pub fn map_schema(
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    id: SchemaId,
    path: &FieldPath,
) -> Result<TypeRef> {
    if let Some(existing) = ctx.slot(id) {
        return Ok(TypeRef::Named(existing));
    }

    let node = doc.schema(id);
    let name = node.name.clone();

    match &node.kind {
        SchemaKind::Primitive(raw) => {
            let prim = primitive_type(raw)?;
            match name {
                Some(n) => {
                    let tid = ctx.reserve(id, &n);
                    ctx.finish(tid, TypeShape::Alias { ty: TypeRef::Primitive(prim) });
                    Ok(TypeRef::Named(tid))
                }
                None => Ok(TypeRef::Primitive(prim)),
            }
        }

        SchemaKind::Any => match name {
            Some(n) => {
                let tid = ctx.reserve(id, &n);
                ctx.finish(tid, TypeShape::Alias { ty: TypeRef::Any });
                Ok(TypeRef::Named(tid))
            }
            None => Ok(TypeRef::Any),
        },

        SchemaKind::Reference(target) => {
            let target = *target;
            match name {
                Some(n) => {
                    let tid = ctx.reserve(id, &n);
                    let target_path = FieldPath::root(ref_base_name(doc, target));
                    let ty = map_schema(ctx, doc, target, &target_path)?;
                    ctx.finish(tid, TypeShape::Alias { ty });
                    Ok(TypeRef::Named(tid))
                }
                None => {
                    let target_path = FieldPath::root(ref_base_name(doc, target));
                    map_schema(ctx, doc, target, &target_path)
                }
            }
        }

        SchemaKind::Object { properties } => {
            let properties = properties.clone();
            match name {
                Some(n) => {
                    let tid = ctx.reserve(id, &n);
                    let fields = map_fields(ctx, doc, &properties, path)?;
                    ctx.finish(tid, TypeShape::Record { fields });
                    Ok(TypeRef::Named(tid))
                }
                None => {
                    let fields = map_fields(ctx, doc, &properties, path)?;
                    let tid = ctx.declare_anonymous(
                        &path.type_name(),
                        TypeShape::Record { fields },
                    );
                    Ok(TypeRef::Named(tid))
                }
            }
        }

        SchemaKind::Array { items } => {
            if let Some(max) = node.constraints.max_items {
                if max > ctx.max_array_items {
                    return Err(TypeError::MaxItemsExceeded {
                        limit: ctx.max_array_items,
                        path: path.to_string(),
                    }
                    .into());
                }
            }
            let items = *items;
            match name {
                Some(n) => {
                    let tid = ctx.reserve(id, &n);
                    let item_ref = match items {
                        Some(item_id) => map_schema(ctx, doc, item_id, &path.child("item"))?,
                        None => TypeRef::Any,
                    };
                    ctx.finish(tid, TypeShape::Array { items: item_ref });
                    Ok(TypeRef::Named(tid))
                }
                None => {
                    let item_ref = match items {
                        Some(item_id) => map_schema(ctx, doc, item_id, &path.child("item"))?,
                        None => TypeRef::Any,
                    };
                    Ok(TypeRef::Array(Box::new(item_ref)))
                }
            }
        }

        SchemaKind::AllOf(members) => {
            let members = members.clone();
            match name {
                Some(n) => {
                    let tid = ctx.reserve(id, &n);
                    let mut fields = Vec::new();
                    collect_composed_fields(ctx, doc, &members, path, &mut fields)?;
                    ctx.finish(tid, TypeShape::Record { fields });
                    Ok(TypeRef::Named(tid))
                }
                None => {
                    let mut fields = Vec::new();
                    collect_composed_fields(ctx, doc, &members, path, &mut fields)?;
                    let tid = ctx.declare_anonymous(
                        &path.type_name(),
                        TypeShape::Record { fields },
                    );
                    Ok(TypeRef::Named(tid))
                }
            }
        }

        SchemaKind::OneOf(members) => {
            let members = members.clone();
            let mut nullable = node.nullable;
            let declared = name.map(|n| ctx.reserve(id, &n));
            let mut variants = Vec::new();
            for (idx, member) in members.iter().enumerate() {
                let (_, member_node) = doc.resolve(*member);
                if member_node.nullable {
                    nullable = true;
                }
                let variant_path = path.child(&format!("variant{}", idx));
                let ty = map_schema(ctx, doc, *member, &variant_path)?;
                if !variants.contains(&ty) {
                    variants.push(ty);
                }
            }
            let shape = TypeShape::Union { variants, nullable };
            match declared {
                Some(tid) => {
                    ctx.finish(tid, shape);
                    Ok(TypeRef::Named(tid))
                }
                None => Ok(TypeRef::Named(ctx.declare_anonymous(&path.type_name(), shape))),
            }
        }
    }
}

fn ref_base_name(doc: &NormalizedDocument, id: SchemaId) -> String {
    doc.schema(id)
        .name
        .clone()
        .unwrap_or_else(|| format!("Schema{}", id.0))
}

fn map_fields(
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    properties: &[PropertySpec],
    path: &FieldPath,
) -> Result<Vec<FieldDef>> {
    let mut fields = Vec::with_capacity(properties.len());
    for prop in properties {
        let child = path.child(&prop.name);
        let ty = map_schema(ctx, doc, prop.schema, &child)?;
        fields.push(FieldDef {
            name: prop.name.clone(),
            ty,
            required: prop.required && prop.default.is_none(),
            default: prop.default.clone(),
        });
    }
    Ok(fields)
}

/// Union the field sets of `allOf` members, recursing through nested
/// compositions. Same-name fields must agree on type.
fn collect_composed_fields(
    ctx: &mut TypeContext,
    doc: &NormalizedDocument,
    members: &[SchemaId],
    path: &FieldPath,
    out: &mut Vec<FieldDef>,
) -> Result<()> {
    for member in members {
        let (_, member_node) = doc.resolve(*member);
        match &member_node.kind {
            SchemaKind::Object { properties } => {
                let properties = properties.clone();
                for prop in &properties {
                    let child = path.child(&prop.name);
                    let ty = map_schema(ctx, doc, prop.schema, &child)?;
                    if let Some(existing) = out.iter().find(|f| f.name == prop.name) {
                        if existing.ty != ty {
                            return Err(TypeError::ConflictingFieldType {
                                field: prop.name.clone(),
                                path: path.to_string(),
                            }
                            .into());
                        }
                    } else {
                        fields_push(out, prop, ty);
                    }
                }
            }
            SchemaKind::AllOf(inner) => {
                let inner = inner.clone();
                collect_composed_fields(ctx, doc, &inner, path, out)?;
            }
            SchemaKind::Any => {}
            other => {
                return Err(TypeError::UnsupportedDataType(kind_description(other)).into());
            }
        }
    }
    Ok(())
}

fn fields_push(out: &mut Vec<FieldDef>, prop: &PropertySpec, ty: TypeRef) {
    out.push(FieldDef {
        name: prop.name.clone(),
        ty,
        required: prop.required && prop.default.is_none(),
        default: prop.default.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_ARRAY_ITEMS;
    use crate::document::SpecDocument;
    use crate::error::Error;
    use crate::normalize::normalize;
    use serde_json::json;

    fn normalized(schemas: serde_json::Value) -> NormalizedDocument {
        normalize(&SpecDocument {
            json: json!({"paths": {}, "components": {"schemas": schemas}}),
        })
        .unwrap()
    }

    fn map_named(doc: &NormalizedDocument, ctx: &mut TypeContext, name: &str) -> Result<TypeRef> {
        let id = doc.schema_id(name).unwrap();
        map_schema(ctx, doc, id, &FieldPath::root(name))
    }

    #[test]
    fn test_object_record_required_and_defaults() {
        let doc = normalized(json!({
            "Widget": {
                "type": "object",
                "required": ["id", "label"],
                "properties": {
                    "id": {"type": "integer"},
                    "label": {"type": "string", "default": "none"},
                    "note": {"type": "string"}
                }
            }
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let ty = map_named(&doc, &mut ctx, "Widget").unwrap();
        let TypeRef::Named(tid) = ty else { panic!("expected named type") };
        let TypeShape::Record { fields } = &ctx.types()[tid.0].shape else {
            panic!("expected record")
        };
        assert_eq!(fields.len(), 3);
        assert!(fields[0].required);
        // required but carrying a default -> optional-with-default
        assert!(!fields[1].required);
        assert_eq!(fields[1].default, Some(json!("none")));
        assert!(!fields[2].required);
    }

    #[test]
    fn test_unsupported_data_type() {
        let doc = normalized(json!({"Blob": {"type": "file"}}));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let err = map_named(&doc, &mut ctx, "Blob").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported data type 'file'");
    }

    #[test]
    fn test_array_without_items_is_open() {
        let doc = normalized(json!({"Tags": {"type": "array"}}));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let TypeRef::Named(tid) = map_named(&doc, &mut ctx, "Tags").unwrap() else {
            panic!("expected named type")
        };
        assert_eq!(
            ctx.types()[tid.0].shape,
            TypeShape::Array { items: TypeRef::Any }
        );
    }

    #[test]
    fn test_max_items_at_limit_succeeds() {
        let doc = normalized(json!({
            "Tags": {"type": "array", "maxItems": 4095, "items": {"type": "string"}}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        assert!(map_named(&doc, &mut ctx, "Tags").is_ok());
    }

    #[test]
    fn test_max_items_exceeded_names_path() {
        let doc = normalized(json!({
            "Pet": {"type": "object", "properties": {
                "tags": {"type": "array", "maxItems": 5000, "items": {"type": "string"}}
            }}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let err = map_named(&doc, &mut ctx, "Pet").unwrap_err();
        let Error::Type(TypeError::MaxItemsExceeded { limit, path }) = err else {
            panic!("expected MaxItemsExceeded, got {:?}", err)
        };
        assert_eq!(limit, 4095);
        assert_eq!(path, "Pet.tags");
    }

    #[test]
    fn test_shared_reference_maps_to_one_declaration() {
        let doc = normalized(json!({
            "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}},
            "Left": {"type": "object", "properties": {"w": {"$ref": "#/components/schemas/Widget"}}},
            "Right": {"type": "object", "properties": {"w": {"$ref": "#/components/schemas/Widget"}}}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let left = map_named(&doc, &mut ctx, "Left").unwrap();
        let right = map_named(&doc, &mut ctx, "Right").unwrap();
        assert_ne!(left, right);

        let widget_decls: Vec<_> = ctx
            .types()
            .iter()
            .filter(|t| t.identifier == "Widget")
            .collect();
        assert_eq!(widget_decls.len(), 1);

        // Both record fields point at the identical TypeId
        let field_ty = |r: &TypeRef| -> TypeRef {
            let TypeRef::Named(tid) = r else { panic!() };
            let TypeShape::Record { fields } = &ctx.types()[tid.0].shape else { panic!() };
            fields[0].ty.clone()
        };
        assert_eq!(field_ty(&left), field_ty(&right));
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let doc = normalized(json!({
            "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let first = map_named(&doc, &mut ctx, "Widget").unwrap();
        let count = ctx.types().len();
        let second = map_named(&doc, &mut ctx, "Widget").unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.types().len(), count);
    }

    #[test]
    fn test_all_of_merges_fields() {
        let doc = normalized(json!({
            "Base": {"type": "object", "required": ["id"], "properties": {"id": {"type": "integer"}}},
            "Extended": {"allOf": [
                {"$ref": "#/components/schemas/Base"},
                {"type": "object", "properties": {"label": {"type": "string"}}}
            ]}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let TypeRef::Named(tid) = map_named(&doc, &mut ctx, "Extended").unwrap() else {
            panic!("expected named type")
        };
        let TypeShape::Record { fields } = &ctx.types()[tid.0].shape else {
            panic!("expected record")
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label"]);
        assert!(fields[0].required);
    }

    #[test]
    fn test_all_of_conflicting_field_type() {
        let doc = normalized(json!({
            "Broken": {"allOf": [
                {"type": "object", "properties": {"id": {"type": "integer"}}},
                {"type": "object", "properties": {"id": {"type": "string"}}}
            ]}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let err = map_named(&doc, &mut ctx, "Broken").unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::ConflictingFieldType { .. })
        ));
    }

    #[test]
    fn test_one_of_nullable_member_adds_null_variant() {
        let doc = normalized(json!({
            "Value": {"oneOf": [
                {"type": "string"},
                {"type": "integer", "nullable": true}
            ]}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let TypeRef::Named(tid) = map_named(&doc, &mut ctx, "Value").unwrap() else {
            panic!("expected named type")
        };
        let TypeShape::Union { variants, nullable } = &ctx.types()[tid.0].shape else {
            panic!("expected union")
        };
        assert_eq!(variants.len(), 2);
        assert!(nullable);
    }

    #[test]
    fn test_anonymous_structural_dedup() {
        let doc = normalized(json!({
            "Left": {"type": "object", "properties": {
                "point": {"type": "object", "properties": {"x": {"type": "number"}}}
            }},
            "Right": {"type": "object", "properties": {
                "point": {"type": "object", "properties": {"x": {"type": "number"}}}
            }}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        map_named(&doc, &mut ctx, "Left").unwrap();
        map_named(&doc, &mut ctx, "Right").unwrap();
        // The two inline point records collapse into one declaration,
        // named from the first-seen enclosing path.
        let anon: Vec<_> = ctx
            .types()
            .iter()
            .filter(|t| matches!(&t.shape, TypeShape::Record { fields } if fields.len() == 1 && fields[0].name == "x"))
            .collect();
        assert_eq!(anon.len(), 1);
        assert_eq!(anon[0].identifier, "LeftPoint");
    }

    #[test]
    fn test_identifier_collision_gets_deterministic_suffix() {
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        assert_eq!(ctx.unique_identifier("Widget"), "Widget");
        assert_eq!(ctx.unique_identifier("Widget"), "Widget1");
        assert_eq!(ctx.unique_identifier("Widget"), "Widget2");
        assert_eq!(ctx.unique_identifier("widget"), "widget");
    }

    #[test]
    fn test_type_ref_serialization() {
        // Named and nested array references must serialize; the structural
        // fingerprint relies on it for every record shape.
        let nested = TypeRef::Array(Box::new(TypeRef::Named(TypeId(3))));
        let json = serde_json::to_string(&nested).unwrap();
        assert!(json.contains("\"ref\":\"array\""));
        assert!(json.contains("\"ref\":\"named\""));

        let shape = TypeShape::Record {
            fields: vec![FieldDef {
                name: "w".to_string(),
                ty: TypeRef::Named(TypeId(0)),
                required: true,
                default: None,
            }],
        };
        assert!(!fingerprint(&shape).is_empty());
    }

    #[test]
    fn test_named_alias_to_reference() {
        let doc = normalized(json!({
            "Widget": {"type": "object", "properties": {"id": {"type": "integer"}}},
            "Alias": {"$ref": "#/components/schemas/Widget"}
        }));
        let mut ctx = TypeContext::new(DEFAULT_MAX_ARRAY_ITEMS);
        let TypeRef::Named(alias_tid) = map_named(&doc, &mut ctx, "Alias").unwrap() else {
            panic!("expected named type")
        };
        let TypeShape::Alias { ty: TypeRef::Named(widget_tid) } =
            &ctx.types()[alias_tid.0].shape
        else {
            panic!("expected alias to named type")
        };
        assert_eq!(ctx.identifier(*widget_tid), "Widget");
    }
}
