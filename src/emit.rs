//! Document emitter: catalog → schema document.
//!
//! Emission is a pure rendering of the final catalog; everything here is
//! deterministic given the catalog: sorted maps in, ordered JSON out (the
//! `preserve_order` feature keeps insertion order in the document).

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::catalog::TypeRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    /// Also emit each field's internal identifier (`javaField`) for
    /// diagnostics/debugging.
    pub internal_ids: bool,
}

/// Render one type. Structural flag groups are mutually exclusive and only
/// present when true; the named-object group wins if a record carries both
/// flags (the workaround table normally restores exclusivity before
/// emission).
pub fn emit_type(record: &TypeRecord, opts: &EmitOptions) -> Value {
    let mut obj = serde_json::Map::new();

    if record.named_object {
        obj.insert("namedObject".into(), Value::Bool(true));
        if record.named_object_shortcut {
            obj.insert("namedObjectValue".into(), Value::Bool(true));
        }
    } else if record.named_array {
        obj.insert("namedArray".into(), Value::Bool(true));
        if !record.named_array_components.is_empty() {
            obj.insert(
                "namedArrayValues".into(),
                Value::from(record.named_array_components.join(",")),
            );
        }
    }

    // two-pass emission: plain kinds first, reference kinds second; the
    // document consumer depends on this split
    let mut fields = Vec::new();
    for emit_references in [false, true] {
        for (key, field) in &record.fields {
            let Some(name) = field.external_name.as_deref() else {
                // never observed being serialized; invisible downstream
                continue;
            };
            if field.kind.is_reference() != emit_references {
                continue;
            }
            let mut entry = json!({ "name": name, "type": field.kind });
            if let Some(label) = &field.display_label {
                entry["label"] = Value::from(label.clone());
            }
            if opts.internal_ids {
                entry["javaField"] = Value::from(key.clone());
            }
            fields.push(entry);
        }
    }
    obj.insert("fields".into(), Value::Array(fields));

    Value::Object(obj)
}

/// Render one category section: ordered mapping wire name → type object.
pub fn emit_category(types: &BTreeMap<String, TypeRecord>, opts: &EmitOptions) -> Value {
    let section: serde_json::Map<String, Value> = types
        .iter()
        .map(|(name, record)| (name.clone(), emit_type(record, opts)))
        .collect();
    Value::Object(section)
}

/// The full persisted document: one section per category.
pub fn emit_document(
    queries: &BTreeMap<String, TypeRecord>,
    filters: &BTreeMap<String, TypeRecord>,
    opts: &EmitOptions,
) -> Value {
    json!({
        "query": emit_category(queries, opts),
        "filter": emit_category(filters, opts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, FieldRecord, ParamKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn unresolved_fields_are_omitted_entirely() {
        let mut rec = TypeRecord::new("ids", Category::Query);
        rec.fields.insert("types".into(), FieldRecord::named(ParamKind::List, "types"));
        rec.fields.insert("lat".into(), FieldRecord::new(ParamKind::Double));
        let doc = emit_type(&rec, &EmitOptions::default());
        let fields = doc["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["name"], "types");
        assert_eq!(fields[0]["type"], "LIST");
    }

    #[test]
    fn reference_kinds_are_emitted_after_plain_kinds() {
        let mut rec = TypeRecord::new("bool", Category::Query);
        rec.fields.insert(
            "aClauses".into(),
            FieldRecord::named(ParamKind::ListOfNestedQuery, "must"),
        );
        rec.fields.insert("boost".into(), FieldRecord::named(ParamKind::Float, "boost"));
        rec.fields.insert(
            "filterClauses".into(),
            FieldRecord::named(ParamKind::ListOfNestedFilter, "filters"),
        );
        rec.fields.insert(
            "zQuery".into(),
            FieldRecord::named(ParamKind::NestedQuery, "query"),
        );

        let doc = emit_type(&rec, &EmitOptions::default());
        let types: Vec<&str> = doc["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["type"].as_str().unwrap())
            .collect();
        // LIST_OF_NESTED_FILTER rides in the first pass; the two reference
        // kinds come last regardless of key order
        assert_eq!(
            types,
            ["FLOAT", "LIST_OF_NESTED_FILTER", "LIST_OF_NESTED_QUERY", "NESTED_QUERY"]
        );
    }

    #[test]
    fn structural_flag_groups_are_exclusive_and_conditional() {
        let mut rec = TypeRecord::new("terms", Category::Filter);
        rec.named_object = true;
        rec.named_object_shortcut = true;
        let doc = emit_type(&rec, &EmitOptions::default());
        assert_eq!(doc["namedObject"], true);
        assert_eq!(doc["namedObjectValue"], true);
        assert!(doc.get("namedArray").is_none());

        let mut rec = TypeRecord::new("geo_distance", Category::Filter);
        rec.named_array = true;
        rec.named_array_components = vec!["lon".into(), "lat".into()];
        let doc = emit_type(&rec, &EmitOptions::default());
        assert!(doc.get("namedObject").is_none());
        assert_eq!(doc["namedArray"], true);
        assert_eq!(doc["namedArrayValues"], "lon,lat");

        let rec = TypeRecord::new("term", Category::Query);
        let doc = emit_type(&rec, &EmitOptions::default());
        assert!(doc.get("namedObject").is_none());
        assert!(doc.get("namedArray").is_none());
    }

    #[test]
    fn labels_and_internal_ids_are_optional() {
        let mut rec = TypeRecord::new("geo_bbox", Category::Filter);
        rec.fields.insert(
            "top_left[0]".into(),
            FieldRecord::labeled(ParamKind::Double, "top_left[0]", "left"),
        );
        let doc = emit_type(&rec, &EmitOptions { internal_ids: true });
        let f = &doc["fields"][0];
        assert_eq!(f["label"], "left");
        assert_eq!(f["javaField"], "top_left[0]");

        let doc = emit_type(&rec, &EmitOptions::default());
        assert!(doc["fields"][0].get("javaField").is_none());
    }

    #[test]
    fn document_has_one_section_per_category() {
        let mut queries = BTreeMap::new();
        queries.insert("term".to_string(), TypeRecord::new("term", Category::Query));
        let filters = BTreeMap::new();
        let doc = emit_document(&queries, &filters, &EmitOptions::default());
        assert!(doc["query"]["term"].is_object());
        assert_eq!(doc["filter"], json!({}));
    }
}
