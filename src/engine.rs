//! Extraction engine: drives one type pair through the structural pass, the
//! field classifier and the pattern scanner, and batches whole categories.
//!
//! Per-type extraction is embarrassingly parallel; results are produced
//! independently and merged into a sorted map afterward, so the catalog
//! ordering and the diagnostic ordering stay deterministic regardless of
//! scheduling. One bad type never aborts the rest of the corpus.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::catalog::{Category, FieldRecord, ParamKind, TypeRecord};
use crate::classify;
use crate::diag::{DiagSink, Diagnostic};
use crate::manifest::Introspect;
use crate::scan;

/// One candidate builder/parser pair, as the corpus walker hands it over.
#[derive(Debug, Clone)]
pub struct TypeSource {
    pub builder_class: String,
    pub parser_class: String,
    pub source_text: String,
}

/// Result of one category's batch run: the sorted catalog plus every
/// non-fatal diagnostic, in corpus order.
#[derive(Debug)]
pub struct CategoryResult {
    pub types: BTreeMap<String, TypeRecord>,
    pub diags: DiagSink,
}

/// Extract one type. Reflective lookups (the parser's `NAME`, the builder's
/// field list) are the fallible part; a failure there drops the type with a
/// diagnostic and `None`, never the run.
pub fn extract_type(
    source: &TypeSource,
    category: Category,
    intro: &dyn Introspect,
) -> (Option<TypeRecord>, DiagSink) {
    let mut diags = DiagSink::default();

    let dsl_name = match intro.constant(&source.parser_class, "NAME") {
        Ok(n) => n.to_string(),
        Err(e) => {
            diags.push(Diagnostic::TypeFailed {
                type_name: source.builder_class.clone(),
                reason: e.to_string(),
            });
            return (None, diags);
        }
    };
    let declared = match intro.declared_fields(&source.builder_class) {
        Ok(fields) => fields,
        Err(e) => {
            diags.push(Diagnostic::TypeFailed {
                type_name: source.builder_class.clone(),
                reason: e.to_string(),
            });
            return (None, diags);
        }
    };

    let mut record = TypeRecord::new(&dsl_name, category);
    let body = scan::detect_named_form(&mut record, &source.source_text);

    for field in declared {
        // the caller-name holder is structural, not a payload field
        if (record.named_object || record.named_array) && field.name == scan::NAME_HOLDER_FIELD {
            continue;
        }
        let Some(classified) = classify::classify(field) else {
            continue;
        };
        if classified.kind == ParamKind::Other {
            diags.push(Diagnostic::UnknownFieldType {
                type_name: dsl_name.clone(),
                field: field.name.clone(),
                declared: field.type_name.clone(),
            });
        }
        let mut rec = FieldRecord::new(classified.kind);
        rec.external_name = classified.default_name;
        record.fields.insert(field.name.clone(), rec);
    }

    scan::run_passes(&mut record, body, intro, &mut diags);
    (Some(record), diags)
}

/// Batch-extract a category. `sources` order (the walker's sorted listing)
/// fixes the diagnostic order; the catalog map is sorted by wire name.
pub fn extract_category(
    sources: &[TypeSource],
    category: Category,
    intro: &dyn Introspect,
) -> CategoryResult {
    let per_type: Vec<(Option<TypeRecord>, DiagSink)> = sources
        .par_iter()
        .map(|ts| extract_type(ts, category, intro))
        .collect();

    let mut types = BTreeMap::new();
    let mut diags = DiagSink::default();
    for (record, type_diags) in per_type {
        diags.extend(type_diags);
        if let Some(record) = record {
            types.insert(record.external_name.clone(), record);
        }
    }
    CategoryResult { types, diags }
}
