//! Pattern scanner: ordered text-pattern passes over one type's
//! serialization source.
//!
//! The corpus spells "write field X under name Y" several different ways
//! depending on field type and code vintage, so the scanner runs a fixed,
//! ordered sequence of independent passes over the same text. Each pass takes
//! an immutable view of the source and returns the effects it wants applied;
//! the driver applies them in list order, last-write-wins per field. More
//! specific patterns sit later in the list so they take precedence over
//! generic ones that coincidentally also match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::TypeRecord;
use crate::diag::{DiagSink, Diagnostic};
use crate::manifest::Introspect;
use crate::resolve::{self, Resolved};

/// The internal field that holds the caller-supplied name in named-object
/// and named-array types. The structural pass, the shortcut pass and the
/// field-population filter must all agree on this identifier.
pub const NAME_HOLDER_FIELD: &str = "name";

// Structural markers: the type opens its result object/array keyed by the
// caller-supplied name before writing its own fields.
static OBJECT_MARKER: Lazy<String> =
    Lazy::new(|| format!("builder.startObject({NAME_HOLDER_FIELD});"));
static ARRAY_MARKER: Lazy<String> =
    Lazy::new(|| format!("builder.startArray({NAME_HOLDER_FIELD});"));

// builder.field("param", expr) / builder.array("param", expr)
static DIRECT_WRITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\.(?:field|array)\("(.*?)",\s*(.*?)\)"#).unwrap());

// builder.startArray("param"); for (... : expr)
static LOOPED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)builder\.startArray\("(.*?)"\);\s*?for \(.*?: (.*?)\)"#).unwrap()
});

// builder.field("param"); expr.toXContent(builder, params)
static DELEGATED_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)builder\.field\("([^"]*?)"\);\s*?([a-zA-Z]+?)\.toXContent\(builder, params\)"#)
        .unwrap()
});

// doXArrayContent("param", expr, ...)
static ARRAY_CONTENT_HELPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"doXArrayContent\("(.*?)", (.*?),"#).unwrap());

// builder.startArray(name).value(a).value(b)....endArray();
static POSITIONAL_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"builder\.startArray\({NAME_HOLDER_FIELD}\)((?:\.value\([^)]+\))+)\.endArray\(\);"
    ))
    .unwrap()
});
static VALUE_COMPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"value\((.*?)\)").unwrap());

// builder.field(symbolic, expr) / builder.array(symbolic, expr), where the
// name is an expression, not a string literal
static SYMBOLIC_WRITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\.(?:field|array)\(([^"]*?),\s+(.*?)\)"#).unwrap());

// builder.startArray(symbolic); ... for (... : expr)
static SYMBOLIC_LOOPED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\.startArray\(([^"]*?)\);.*?for \(.*?: (.*?)\)"#).unwrap()
});

// builder.field(name, expr); the shortcut form of a named object
static SHORTCUT_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"builder\.field\({NAME_HOLDER_FIELD},\s*(.*?)\);")).unwrap()
});

/// Effects one pass requests. The driver applies `assign` through
/// [`TypeRecord::set_param_name`] (so misses surface as diagnostics),
/// structural effects directly.
#[derive(Debug, Default)]
struct Effects {
    /// internal field key → wire name, in match order
    assign: Vec<(String, String)>,
    /// ordered positional components; also marks the record a named array
    positional: Option<Vec<String>>,
    /// field keys consumed by the shortcut form; also marks the record a
    /// shortcut named object
    shortcut_fields: Vec<String>,
    /// symbolic name expressions kept verbatim after a failed lookup
    unresolved: Vec<String>,
}

type Pass = fn(&str, &dyn Introspect) -> Effects;

/// Passes 2–9, in precedence order (pass 1 is [`detect_named_form`],
/// pass 10 is the cleanup at the end of [`run_passes`]).
const PASSES: &[Pass] = &[
    pass_direct_write,
    pass_looped_array,
    pass_delegated_write,
    pass_array_content,
    pass_positional_write,
    pass_symbolic_write,
    pass_symbolic_looped_array,
    pass_shortcut_write,
];

/// Pass 1: named-object/array detection. When the structural marker is
/// found the working text is truncated so later passes never mis-attribute
/// the shortcut form's internals as ordinary fields; anything textually
/// before the marker is unreachable for them (accepted lossiness). The
/// object form keeps the marker line in the working text, the array form
/// starts right after it.
pub fn detect_named_form<'a>(record: &mut TypeRecord, source: &'a str) -> &'a str {
    if let Some(idx) = source.find(OBJECT_MARKER.as_str()) {
        record.named_object = true;
        &source[idx..]
    } else if let Some(idx) = source.find(ARRAY_MARKER.as_str()) {
        record.named_array = true;
        &source[idx + ARRAY_MARKER.len()..]
    } else {
        source
    }
}

/// Run passes 2–10 over the (already truncated) working text, binding wire
/// names and structural flags onto `record`.
pub fn run_passes(
    record: &mut TypeRecord,
    body: &str,
    intro: &dyn Introspect,
    diags: &mut DiagSink,
) {
    for pass in PASSES {
        apply(record, pass(body, intro), diags);
    }

    // pass 10: positional/shortcut payloads are captured structurally, not
    // as named fields
    if record.named_array {
        record.fields.remove("values");
    }
    if record.named_object {
        record.fields.remove("value");
    }
}

fn apply(record: &mut TypeRecord, fx: Effects, diags: &mut DiagSink) {
    for (key, param) in &fx.assign {
        record.set_param_name(key, param, diags);
    }
    for expr in fx.unresolved {
        diags.push(Diagnostic::UnresolvedName {
            type_name: record.external_name.clone(),
            expr,
        });
    }
    if let Some(components) = fx.positional {
        record.named_array = true;
        record.named_array_components = components;
    }
    if !fx.shortcut_fields.is_empty() {
        record.named_object = true;
        record.named_object_shortcut = true;
        for key in &fx.shortcut_fields {
            record.fields.remove(key);
        }
        record.fields.remove(NAME_HOLDER_FIELD);
    }
}

/// Normalize a value expression to the internal field key: strip a leading
/// self-qualifier, truncate at the first member access.
/// `this.foo.bar()` and `foo` both resolve to `foo`.
fn field_key(expr: &str) -> &str {
    let expr = expr.trim();
    let expr = expr.strip_prefix("this.").unwrap_or(expr);
    match expr.find('.') {
        Some(i) => &expr[..i],
        None => expr,
    }
}

// pass 2
fn pass_direct_write(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in DIRECT_WRITE.captures_iter(body) {
        let mut key = field_key(&cap[2]);
        let mut param = &cap[1];
        // negated boolean write: the literal names the inverse parameter,
        // so the underlying flag binds under its own identifier
        if let Some(flag) = key.strip_prefix('!') {
            key = flag;
            param = flag;
        }
        fx.assign.push((key.to_string(), param.to_string()));
    }
    fx
}

// pass 3
fn pass_looped_array(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in LOOPED_ARRAY.captures_iter(body) {
        fx.assign.push((field_key(&cap[2]).to_string(), cap[1].to_string()));
    }
    fx
}

// pass 4: nested values that serialize themselves
fn pass_delegated_write(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in DELEGATED_WRITE.captures_iter(body) {
        fx.assign.push((field_key(&cap[2]).to_string(), cap[1].to_string()));
    }
    fx
}

// pass 5
fn pass_array_content(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in ARRAY_CONTENT_HELPER.captures_iter(body) {
        fx.assign.push((field_key(&cap[2]).to_string(), cap[1].to_string()));
    }
    fx
}

// pass 6: fixed-arity positional components under the caller name. The
// repeated group only retains its last match, so the chain is re-scanned
// for the individual components.
fn pass_positional_write(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in POSITIONAL_WRITE.captures_iter(body) {
        let components = VALUE_COMPONENT
            .captures_iter(&cap[1])
            .map(|c| c[1].to_string())
            .collect();
        fx.positional = Some(components);
    }
    fx
}

// pass 7
fn pass_symbolic_write(body: &str, intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in SYMBOLIC_WRITE.captures_iter(body) {
        let key = field_key(&cap[2]).to_string();
        match resolve::resolve_param_name(&cap[1], intro) {
            Resolved::Literal(name) | Resolved::Verbatim(name) => fx.assign.push((key, name)),
            Resolved::Failed(expr) => {
                fx.assign.push((key, expr.clone()));
                fx.unresolved.push(expr);
            }
        }
    }
    fx
}

// pass 8
fn pass_symbolic_looped_array(body: &str, intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in SYMBOLIC_LOOPED_ARRAY.captures_iter(body) {
        let key = field_key(&cap[2]).to_string();
        match resolve::resolve_param_name(&cap[1], intro) {
            Resolved::Literal(name) | Resolved::Verbatim(name) => fx.assign.push((key, name)),
            Resolved::Failed(expr) => {
                fx.assign.push((key, expr.clone()));
                fx.unresolved.push(expr);
            }
        }
    }
    fx
}

// pass 9: some types have *only* the shortcut form and never open a nested
// object. Runs last since it deletes fields earlier passes may have
// annotated. Keys are removed as written in source (no normalization),
// mirroring the write call's value argument.
fn pass_shortcut_write(body: &str, _intro: &dyn Introspect) -> Effects {
    let mut fx = Effects::default();
    for cap in SHORTCUT_WRITE.captures_iter(body) {
        fx.shortcut_fields.push(cap[1].to_string());
    }
    fx
}
