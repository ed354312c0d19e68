//! End-to-end compilation of a spec document into a source tree.

// Internal imports (std, crate)
use crate::client::{build_operation, ClientOperationModel};
use crate::config::GeneratorConfig;
use crate::document::SpecDocument;
use crate::emit::{emit, AbstractSourceTree};
use crate::error::Result;
use crate::normalize::normalize;
use crate::target::TargetProfile;
use crate::typemap::{map_schema, FieldPath, TypeContext};

// External imports (alphabetized)
use log::{debug, info};

/// Run the whole pipeline: normalize, map types, resolve parameters,
/// assemble client operations, emit.
///
/// The run either produces a complete tree or fails at the first error;
/// no partial output reaches the caller.
pub fn compile(document: &SpecDocument, config: &GeneratorConfig) -> Result<AbstractSourceTree> {
    let doc = normalize(document)?;
    info!(
        "compiling {} operation(s), {} named schema(s)",
        doc.operations.len(),
        doc.named_schemas().count()
    );

    let target = TargetProfile::rust();
    let mut ctx = TypeContext::new(config.max_array_items);

    // Named schemas first so every spec type gets a declaration, then the
    // operations, which reuse them through the memoization table.
    for (name, id) in doc.named_schemas() {
        debug!("mapping schema '{}'", name);
        map_schema(&mut ctx, &doc, id, &FieldPath::root(name))?;
    }

    let mut operations: Vec<ClientOperationModel> = Vec::with_capacity(doc.operations.len());
    for op in &doc.operations {
        operations.push(build_operation(op, &mut ctx, &doc, target)?);
    }

    let base_path = config
        .base_url
        .as_ref()
        .map(|u| u.to_string())
        .or_else(|| doc.base_path.clone());

    Ok(emit(&ctx, &operations, base_path, &config.client_name()))
}
