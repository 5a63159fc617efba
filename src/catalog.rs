// Strongly-typed catalog of extracted DSL types. No serde_json::Value here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diag::{DiagSink, Diagnostic};

/// Which namespace of the wire format a type belongs to. The two namespaces
/// have identically-shaped entries but independent name spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Query,
    Filter,
}

impl Category {
    /// File-name suffix prefix for this category: `FooQueryBuilder.java`,
    /// `FooFilterParser.java`, ...
    pub fn file_prefix(self) -> &'static str {
        match self {
            Category::Query => "Query",
            Category::Filter => "Filter",
        }
    }

    /// Top-level section key in the emitted document.
    pub fn section(self) -> &'static str {
        match self {
            Category::Query => "query",
            Category::Filter => "filter",
        }
    }
}

/// Semantic kind of one builder field, as the downstream renderer sees it.
/// Serialized names match the document contract (`NESTED_QUERY`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamKind {
    Boolean,
    String,
    Integer,
    Float,
    Double,
    Object,
    List,
    Map,
    Fuzziness,
    Operator,
    NestedQuery,
    NestedFilter,
    ListOfNestedQuery,
    ListOfNestedFilter,
    GeoDistance,
    Shape,
    SpatialStrategy,
    ShapeRelation,
    OptimizeBbox,
    Other,
}

impl ParamKind {
    /// Reference kinds are emitted after all plain kinds (two-pass emission).
    /// LIST_OF_NESTED_FILTER deliberately rides in the first pass; the
    /// document consumer depends on that split.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            ParamKind::NestedQuery | ParamKind::NestedFilter | ParamKind::ListOfNestedQuery
        )
    }
}

/// One field of a [`TypeRecord`].
///
/// `external_name` stays `None` until a scanner pass observes the field being
/// written; such fields are retained for diagnostics but never emitted.
#[derive(Debug, Clone)]
pub struct FieldRecord {
    pub kind: ParamKind,
    pub external_name: Option<String>,
    /// Human label distinct from the wire name; only a handful of synthetic
    /// positional fields carry one.
    pub display_label: Option<String>,
}

impl FieldRecord {
    pub fn new(kind: ParamKind) -> Self {
        FieldRecord { kind, external_name: None, display_label: None }
    }

    pub fn named(kind: ParamKind, external_name: &str) -> Self {
        FieldRecord { kind, external_name: Some(external_name.to_string()), display_label: None }
    }

    pub fn labeled(kind: ParamKind, external_name: &str, label: &str) -> Self {
        FieldRecord {
            kind,
            external_name: Some(external_name.to_string()),
            display_label: Some(label.to_string()),
        }
    }
}

/// One extracted builder/parser pair.
///
/// Field keys are the internal identifiers from the reflective field list;
/// `BTreeMap` iteration gives the sorted-key ordering the emitted document
/// promises. Created empty, populated once by the classifier and the pattern
/// scanner, optionally corrected once by the workaround table, then read-only.
#[derive(Debug, Clone)]
pub struct TypeRecord {
    /// The name this type is addressed by in the wire format. Usually the
    /// parser class's `NAME` constant.
    pub external_name: String,
    pub category: Category,

    /// Serializes nested under a caller-supplied name:
    /// `{ "<callerName>": { ...fields... } }`.
    pub named_object: bool,
    /// Additionally supports the single-value shortcut `{ "<callerName>": v }`.
    pub named_object_shortcut: bool,
    /// Serializes as `{ "<callerName>": [ ... ] }`.
    pub named_array: bool,
    /// Ordered component expressions when the named array is built
    /// positionally (e.g. `lon`, `lat`). Empty when not positional.
    pub named_array_components: Vec<String>,

    pub fields: BTreeMap<String, FieldRecord>,
}

impl TypeRecord {
    pub fn new(external_name: &str, category: Category) -> Self {
        TypeRecord {
            external_name: external_name.to_string(),
            category,
            named_object: false,
            named_object_shortcut: false,
            named_array: false,
            named_array_components: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Bind the wire name of an already-classified field. A key that is not
    /// in the reflective field set is a pattern-resolution miss: recorded as
    /// a diagnostic and otherwise ignored.
    pub fn set_param_name(&mut self, key: &str, param: &str, diags: &mut DiagSink) {
        match self.fields.get_mut(key) {
            Some(f) => f.external_name = Some(param.to_string()),
            None => diags.push(Diagnostic::UnknownField {
                type_name: self.external_name.clone(),
                field: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_param_name_miss_records_diagnostic() {
        let mut rec = TypeRecord::new("term", Category::Query);
        rec.fields.insert("value".into(), FieldRecord::new(ParamKind::Object));
        let mut diags = DiagSink::default();

        rec.set_param_name("value", "value", &mut diags);
        rec.set_param_name("renamedInSource", "x", &mut diags);

        assert_eq!(rec.fields["value"].external_name.as_deref(), Some("value"));
        assert_eq!(diags.records().len(), 1);
        assert!(matches!(
            diags.records()[0],
            Diagnostic::UnknownField { ref field, .. } if field == "renamedInSource"
        ));
    }

    #[test]
    fn field_iteration_is_sorted_by_internal_identifier() {
        let mut rec = TypeRecord::new("bool", Category::Filter);
        for key in ["shouldClauses", "mustClauses", "boost"] {
            rec.fields.insert(key.into(), FieldRecord::new(ParamKind::Other));
        }
        let keys: Vec<&str> = rec.fields.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, ["boost", "mustClauses", "shouldClauses"]);
    }

    #[test]
    fn kind_wire_names_are_screaming_snake() {
        let j = serde_json::to_value(ParamKind::ListOfNestedQuery).unwrap();
        assert_eq!(j, serde_json::json!("LIST_OF_NESTED_QUERY"));
        let j = serde_json::to_value(ParamKind::OptimizeBbox).unwrap();
        assert_eq!(j, serde_json::json!("OPTIMIZE_BBOX"));
    }
}
