//! Hand-maintained corrections for known-irregular corpus members.
//!
//! A few types serialize in ways the generic passes cannot express
//! (irregular name prefixing, parameters written by helper code the scanner
//! never sees, positional corner components). Each correction is named,
//! targets one type, and is idempotent; corrections run in a fixed order
//! after the generic result set exists. A correction whose target type or
//! field is missing fails the whole run: the correction itself is stale and
//! silent continuation would emit a wrong schema.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::catalog::{Category, FieldRecord, ParamKind, TypeRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkaroundError {
    #[error("workaround {workaround}: type {external_name} missing from extracted set")]
    StaleType {
        workaround: &'static str,
        external_name: &'static str,
    },
    #[error("workaround {workaround}: field {field} missing on {external_name}")]
    StaleField {
        workaround: &'static str,
        external_name: &'static str,
        field: &'static str,
    },
}

/// One correction: the targeted wire name plus the mutation. The fix
/// reports a missing field by name; the driver wraps it with context.
pub struct Correction {
    pub target: &'static str,
    fix: fn(&mut TypeRecord) -> Result<(), &'static str>,
}

/// Ordered correction registry for one category, keyed by workaround name.
pub fn corrections(category: Category) -> IndexMap<&'static str, Correction> {
    let mut reg = IndexMap::new();
    match category {
        Category::Query => {
            reg.insert(
                "common-minimum-should-match-prefix",
                Correction { target: "common", fix: fix_common_prefixes },
            );
            reg.insert(
                "multi-match-untracked-params",
                Correction { target: "multi_match", fix: fix_multi_match },
            );
            reg.insert(
                "match-zero-terms-query",
                Correction { target: "match", fix: fix_match },
            );
            reg.insert(
                "query-string-locale",
                Correction { target: "query_string", fix: fix_query_string },
            );
            reg.insert(
                "template-field-set",
                Correction { target: "template", fix: fix_template },
            );
        }
        Category::Filter => {
            reg.insert(
                "geo-distance-range-plain-object",
                Correction { target: "geo_distance_range", fix: fix_geo_plain_object },
            );
            reg.insert(
                "geo-distance-plain-object",
                Correction { target: "geo_distance", fix: fix_geo_plain_object },
            );
            reg.insert(
                "geo-bbox-corner-components",
                Correction { target: "geo_bbox", fix: fix_geo_bbox },
            );
        }
    }
    reg
}

/// Apply every correction for `category`, in registry order.
pub fn apply(
    category: Category,
    types: &mut BTreeMap<String, TypeRecord>,
) -> Result<(), WorkaroundError> {
    for (name, correction) in corrections(category) {
        let record = types
            .get_mut(correction.target)
            .ok_or(WorkaroundError::StaleType { workaround: name, external_name: correction.target })?;
        (correction.fix)(record).map_err(|field| WorkaroundError::StaleField {
            workaround: name,
            external_name: correction.target,
            field,
        })?;
    }
    Ok(())
}

const MINIMUM_SHOULD_MATCH_PREFIX: &str = "minimum_should_match.";

/// Prefix a bound wire name; at most once, so re-application is a no-op.
fn prefix_param(record: &mut TypeRecord, field: &'static str) -> Result<(), &'static str> {
    let rec = record.fields.get_mut(field).ok_or(field)?;
    let name = rec.external_name.as_mut().ok_or(field)?;
    if !name.starts_with(MINIMUM_SHOULD_MATCH_PREFIX) {
        *name = format!("{MINIMUM_SHOULD_MATCH_PREFIX}{name}");
    }
    Ok(())
}

// the common terms query writes its two minimum_should_match variants inside
// a sub-object the scanner reads as flat names
fn fix_common_prefixes(record: &mut TypeRecord) -> Result<(), &'static str> {
    prefix_param(record, "lowFreqMinimumShouldMatch")?;
    prefix_param(record, "highFreqMinimumShouldMatch")
}

// type and zero_terms_query are written through an enum helper the scanner
// never sees as a field write
fn fix_multi_match(record: &mut TypeRecord) -> Result<(), &'static str> {
    record
        .fields
        .insert("type".to_string(), FieldRecord::named(ParamKind::String, "type"));
    record.fields.insert(
        "zeroTermsQuery".to_string(),
        FieldRecord::named(ParamKind::String, "zero_terms_query"),
    );
    Ok(())
}

fn fix_match(record: &mut TypeRecord) -> Result<(), &'static str> {
    record.fields.insert(
        "zeroTermsQuery".to_string(),
        FieldRecord::named(ParamKind::String, "zero_terms_query"),
    );
    Ok(())
}

fn fix_query_string(record: &mut TypeRecord) -> Result<(), &'static str> {
    record
        .fields
        .insert("locale".to_string(), FieldRecord::named(ParamKind::String, "locale"));
    Ok(())
}

// the template query delegates its whole body to a helper; replace the
// extracted field set outright
fn fix_template(record: &mut TypeRecord) -> Result<(), &'static str> {
    record.fields.clear();
    record
        .fields
        .insert("file".to_string(), FieldRecord::named(ParamKind::String, "file"));
    record
        .fields
        .insert("id".to_string(), FieldRecord::named(ParamKind::String, "id"));
    record
        .fields
        .insert("query".to_string(), FieldRecord::named(ParamKind::NestedQuery, "query"));
    record
        .fields
        .insert("params".to_string(), FieldRecord::named(ParamKind::Map, "params"));
    Ok(())
}

// geo distance filters open an object keyed by the field name, which the
// structural pass misreads as the named-object form; the positional array
// is the real structure
fn fix_geo_plain_object(record: &mut TypeRecord) -> Result<(), &'static str> {
    record.named_object = false;
    record.named_object_shortcut = false;
    let rec = record.fields.get_mut("optimizeBbox").ok_or("optimizeBbox")?;
    rec.kind = ParamKind::OptimizeBbox;
    Ok(())
}

// corner coordinates are written positionally; surface them as labeled
// synthetic fields
fn fix_geo_bbox(record: &mut TypeRecord) -> Result<(), &'static str> {
    for (key, label) in [
        ("top_left[0]", "left"),
        ("top_left[1]", "top"),
        ("bottom_right[0]", "right"),
        ("bottom_right[1]", "bottom"),
    ] {
        record
            .fields
            .insert(key.to_string(), FieldRecord::labeled(ParamKind::Double, key, label));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter_set() -> BTreeMap<String, TypeRecord> {
        let mut types = BTreeMap::new();

        let mut geo = TypeRecord::new("geo_distance", Category::Filter);
        geo.named_object = true;
        geo.named_array = true;
        geo.named_array_components = vec!["lon".into(), "lat".into()];
        geo.fields.insert(
            "optimizeBbox".into(),
            FieldRecord::named(ParamKind::String, "optimize_bbox"),
        );
        types.insert("geo_distance".into(), geo.clone());

        let mut range = geo;
        range.external_name = "geo_distance_range".into();
        types.insert("geo_distance_range".into(), range);

        types.insert("geo_bbox".into(), TypeRecord::new("geo_bbox", Category::Filter));
        types
    }

    fn query_set() -> BTreeMap<String, TypeRecord> {
        let mut types = BTreeMap::new();
        for name in ["common", "multi_match", "match", "query_string", "template"] {
            types.insert(name.to_string(), TypeRecord::new(name, Category::Query));
        }
        let common = types.get_mut("common").unwrap();
        common.fields.insert(
            "lowFreqMinimumShouldMatch".into(),
            FieldRecord::named(ParamKind::String, "low_freq"),
        );
        common.fields.insert(
            "highFreqMinimumShouldMatch".into(),
            FieldRecord::named(ParamKind::String, "high_freq"),
        );
        types
    }

    #[test]
    fn common_prefixing_applies_once_and_is_idempotent() {
        let mut types = query_set();
        apply(Category::Query, &mut types).unwrap();
        assert_eq!(
            types["common"].fields["lowFreqMinimumShouldMatch"].external_name.as_deref(),
            Some("minimum_should_match.low_freq")
        );

        // re-running the corrections must not stack the prefix
        apply(Category::Query, &mut types).unwrap();
        assert_eq!(
            types["common"].fields["lowFreqMinimumShouldMatch"].external_name.as_deref(),
            Some("minimum_should_match.low_freq")
        );
        assert_eq!(
            types["common"].fields["highFreqMinimumShouldMatch"].external_name.as_deref(),
            Some("minimum_should_match.high_freq")
        );
    }

    #[test]
    fn template_field_set_is_replaced() {
        let mut types = query_set();
        types.get_mut("template").unwrap().fields.insert(
            "junkFromScanner".into(),
            FieldRecord::named(ParamKind::Other, "junk"),
        );
        apply(Category::Query, &mut types).unwrap();
        let keys: Vec<&str> = types["template"].fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["file", "id", "params", "query"]);
        assert_eq!(types["template"].fields["query"].kind, ParamKind::NestedQuery);
    }

    #[test]
    fn geo_corrections_restore_flag_exclusivity() {
        let mut types = filter_set();
        apply(Category::Filter, &mut types).unwrap();
        let geo = &types["geo_distance"];
        assert!(!geo.named_object);
        assert!(geo.named_array);
        assert_eq!(geo.fields["optimizeBbox"].kind, ParamKind::OptimizeBbox);

        let bbox = &types["geo_bbox"];
        assert_eq!(bbox.fields["top_left[1]"].display_label.as_deref(), Some("top"));
        assert_eq!(bbox.fields["bottom_right[0]"].external_name.as_deref(), Some("bottom_right[0]"));
    }

    #[test]
    fn missing_target_type_fails_loudly() {
        let mut types = filter_set();
        types.remove("geo_bbox");
        let err = apply(Category::Filter, &mut types).unwrap_err();
        assert_eq!(
            err,
            WorkaroundError::StaleType {
                workaround: "geo-bbox-corner-components",
                external_name: "geo_bbox",
            }
        );
    }

    #[test]
    fn missing_target_field_fails_loudly() {
        let mut types = filter_set();
        types.get_mut("geo_distance").unwrap().fields.remove("optimizeBbox");
        let err = apply(Category::Filter, &mut types).unwrap_err();
        assert_eq!(
            err,
            WorkaroundError::StaleField {
                workaround: "geo-distance-plain-object",
                external_name: "geo_distance",
                field: "optimizeBbox",
            }
        );
    }
}
