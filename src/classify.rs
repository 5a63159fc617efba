//! Field classifier: reflected declared type → semantic parameter kind.
//!
//! Pure function of the declared type and its first generic argument; no
//! text scanning, no I/O. Several kinds come with a default wire-name hint
//! that the pattern scanner may later overwrite.

use crate::catalog::ParamKind;
use crate::manifest::DeclaredField;

/// Classification result: the kind, plus an optional default wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: ParamKind,
    pub default_name: Option<String>,
}

impl Classified {
    fn plain(kind: ParamKind) -> Self {
        Classified { kind, default_name: None }
    }

    fn named(kind: ParamKind, name: &str) -> Self {
        Classified { kind, default_name: Some(name.to_string()) }
    }
}

// The corpus's own bookkeeping container; carries per-term boosts, never
// serialized as a field. Skipped without a diagnostic.
const SKIPPED_CONTAINERS: &[&str] = &["ObjectFloatOpenHashMap"];

/// Classify one reflected field. Returns `None` for types the extractor
/// skips entirely. A result of kind [`ParamKind::Other`] means nothing
/// matched; the caller records that as an unknown-type diagnostic.
///
/// Rules apply in priority order; first match wins.
pub fn classify(field: &DeclaredField) -> Option<Classified> {
    let declared = simple_name(&field.type_name);

    // 1. exact primitive / boxed scalars
    match declared {
        "String" => return Some(Classified::plain(ParamKind::String)),
        "Boolean" | "boolean" => return Some(Classified::plain(ParamKind::Boolean)),
        "Float" | "float" => return Some(Classified::plain(ParamKind::Float)),
        "Double" | "double" => return Some(Classified::plain(ParamKind::Double)),
        "Integer" | "int" => return Some(Classified::plain(ParamKind::Integer)),
        _ => {}
    }

    // 2./3. nested query/filter markers (the marker interface itself or any
    // concrete builder named after it)
    if declared.ends_with("QueryBuilder") {
        return Some(Classified::named(ParamKind::NestedQuery, "query"));
    }
    if declared.ends_with("FilterBuilder") {
        return Some(Classified::named(ParamKind::NestedFilter, "filter"));
    }

    // 4.–6. marker types
    if declared == "Fuzziness" {
        return Some(Classified::named(ParamKind::Fuzziness, "fuzziness"));
    }
    if declared == "Object" {
        return Some(Classified::plain(ParamKind::Object));
    }
    if declared.contains("Operator") {
        return Some(Classified::plain(ParamKind::Operator));
    }

    // 7. domain-specific suffixes
    if declared.ends_with("GeoDistance") {
        return Some(Classified::plain(ParamKind::GeoDistance));
    }
    if declared.ends_with("SpatialStrategy") {
        return Some(Classified::plain(ParamKind::SpatialStrategy));
    }
    if declared.ends_with("ShapeBuilder") {
        return Some(Classified::plain(ParamKind::Shape));
    }
    if declared.ends_with("ShapeRelation") {
        return Some(Classified::plain(ParamKind::ShapeRelation));
    }

    // 8. arrays and sequence containers; lists default to their own
    // identifier as the wire name (usually self-descriptive)
    if is_sequence(&field.type_name, declared) {
        let kind = match field.generic.as_deref().map(simple_name) {
            Some("QueryBuilder") => ParamKind::ListOfNestedQuery,
            Some("FilterBuilder") => ParamKind::ListOfNestedFilter,
            _ => ParamKind::List,
        };
        return Some(Classified::named(kind, &field.name));
    }

    // 9. key/value mapping
    if declared == "Map" {
        return Some(Classified::plain(ParamKind::Map));
    }

    if SKIPPED_CONTAINERS.contains(&declared) {
        return None;
    }

    // 10. no match; caller records the diagnostic
    Some(Classified::plain(ParamKind::Other))
}

/// Simple-name tail of a possibly-qualified declared type, with any generic
/// suffix stripped: `java.util.List<String>` → `List`.
fn simple_name(ty: &str) -> &str {
    let ty = ty.split('<').next().unwrap_or(ty);
    ty.rsplit('.').next().unwrap_or(ty)
}

/// Arrays are spelled `[L...;` (binary name) or with a `[]` suffix;
/// sequence containers are exactly `List`/`ArrayList`.
fn is_sequence(raw: &str, declared: &str) -> bool {
    raw.starts_with("[L")
        || raw.ends_with("[]")
        || declared == "List"
        || declared == "ArrayList"
}
