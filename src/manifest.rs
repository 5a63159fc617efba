//! Reflective manifest: the introspection capability the engine depends on.
//!
//! The scanner needs three reflective lookups it cannot perform natively:
//! a type's declared field list, a scalar constant (the parser's `NAME`),
//! and a member of a nested `*Fields` preferred-name table. [`Introspect`]
//! abstracts those; the shipped implementation is a pre-generated JSON
//! manifest produced from the corpus build (one entry per class).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// One reflected field: identifier, declared type, first generic argument.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclaredField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub generic: Option<String>,
}

impl DeclaredField {
    pub fn new(name: &str, type_name: &str, generic: Option<&str>) -> Self {
        DeclaredField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            generic: generic.map(str::to_string),
        }
    }
}

/// Per-class manifest entry. All sections optional; parser classes usually
/// carry only `constants`, builder classes only `fields`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeEntry {
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
    /// Nested constant tables, keyed by the table's simple name
    /// (e.g. `Fields`), each member mapped to its accessor value.
    #[serde(default)]
    pub tables: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    pub types: BTreeMap<String, TypeEntry>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntrospectError {
    #[error("unknown type {0}")]
    UnknownType(String),
    #[error("no constant {member} on {type_name}")]
    UnknownConstant { type_name: String, member: String },
    #[error("no *{suffix} table on {type_name}")]
    UnknownTable { type_name: String, suffix: String },
    #[error("no member {member} in {type_name}.{table}")]
    UnknownMember { type_name: String, table: String, member: String },
}

/// Reflective lookups over corpus types. `Sync` so per-type extraction can
/// fan out over a shared instance.
pub trait Introspect: Sync {
    fn declared_fields(&self, type_name: &str) -> Result<&[DeclaredField], IntrospectError>;

    fn constant(&self, type_name: &str, member: &str) -> Result<&str, IntrospectError>;

    /// Read `member` from the nested constant table of `type_name` whose
    /// simple name ends with `suffix` (naming convention of the corpus).
    fn table_constant(
        &self,
        type_name: &str,
        suffix: &str,
        member: &str,
    ) -> Result<&str, IntrospectError>;
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read manifest {}: {e}", path.display()))?;
        from_str_with_path(&src)
            .map_err(|e| anyhow::anyhow!("failed to parse manifest {}: {e}", path.display()))
    }

    fn entry(&self, type_name: &str) -> Result<&TypeEntry, IntrospectError> {
        self.types
            .get(type_name)
            .ok_or_else(|| IntrospectError::UnknownType(type_name.to_string()))
    }
}

impl Introspect for Manifest {
    fn declared_fields(&self, type_name: &str) -> Result<&[DeclaredField], IntrospectError> {
        Ok(&self.entry(type_name)?.fields)
    }

    fn constant(&self, type_name: &str, member: &str) -> Result<&str, IntrospectError> {
        self.entry(type_name)?
            .constants
            .get(member)
            .map(String::as_str)
            .ok_or_else(|| IntrospectError::UnknownConstant {
                type_name: type_name.to_string(),
                member: member.to_string(),
            })
    }

    fn table_constant(
        &self,
        type_name: &str,
        suffix: &str,
        member: &str,
    ) -> Result<&str, IntrospectError> {
        let entry = self.entry(type_name)?;
        let (table_name, table) = entry
            .tables
            .iter()
            .find(|(name, _)| name.ends_with(suffix))
            .ok_or_else(|| IntrospectError::UnknownTable {
                type_name: type_name.to_string(),
                suffix: suffix.to_string(),
            })?;
        table
            .get(member)
            .map(String::as_str)
            .ok_or_else(|| IntrospectError::UnknownMember {
                type_name: type_name.to_string(),
                table: table_name.clone(),
                member: member.to_string(),
            })
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}
