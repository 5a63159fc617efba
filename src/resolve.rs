//! Symbolic wire-name resolution.
//!
//! Some write calls name their parameter through a constant table instead of
//! a string literal: `FooQueryParser.Fields.LIKE_THIS.getPreferredName()`.
//! The table is a type nested in the owner whose simple name ends in
//! `Fields`; the accessor value is pre-evaluated into the manifest, so
//! resolution is a table lookup through the [`Introspect`] capability.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::manifest::Introspect;

const TABLE_SUFFIX: &str = "Fields";
const ACCESSOR: &str = "getPreferredName";

static SYMBOLIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(.*?)\.{TABLE_SUFFIX}\.(.*?)\.{ACCESSOR}\(\)")).unwrap()
});

/// Outcome of resolving one name expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Symbolic reference resolved to its literal wire name.
    Literal(String),
    /// Not a symbolic table reference; the expression is used verbatim.
    Verbatim(String),
    /// Symbolic reference whose lookup failed; the original text is kept
    /// (visibly wrong, signals corpus drift) and the caller records one
    /// diagnostic.
    Failed(String),
}

/// Resolve a name expression to a literal wire name. Never fails past this
/// boundary: on any lookup miss the original expression is returned.
pub fn resolve_param_name(expr: &str, intro: &dyn Introspect) -> Resolved {
    let expr = expr.trim();
    let Some(cap) = SYMBOLIC.captures(expr) else {
        return Resolved::Verbatim(expr.to_string());
    };
    match intro.table_constant(&cap[1], TABLE_SUFFIX, &cap[2]) {
        Ok(lit) => Resolved::Literal(lit.to_string()),
        Err(e) => {
            log::debug!("symbolic name lookup failed for `{expr}`: {e}");
            Resolved::Failed(expr.to_string())
        }
    }
}
