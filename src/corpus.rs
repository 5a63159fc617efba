//! Corpus walker: enumerate builder/parser pairs and drive the engine.
//!
//! A candidate pair is `<Stem><Category>Builder.java` with a sibling
//! `<Stem><Category>Parser.java` in the same directory. The walker reads the
//! builder source, hands the pair to the engine, and applies the workaround
//! table to the merged result. Configuration is one immutable value; the
//! engine itself takes none.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::catalog::{Category, TypeRecord};
use crate::diag::Diagnostic;
use crate::engine::{self, TypeSource};
use crate::manifest::Manifest;
use crate::workaround;

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Directory holding the builder/parser sources.
    pub src_dir: PathBuf,
    /// Pre-generated reflective manifest (JSON).
    pub manifest_path: PathBuf,
}

/// Full result of one mining run.
#[derive(Debug)]
pub struct Extraction {
    pub queries: BTreeMap<String, TypeRecord>,
    pub filters: BTreeMap<String, TypeRecord>,
    pub diags: Vec<Diagnostic>,
}

/// Enumerate one category's type pairs, sorted by file name so downstream
/// ordering is deterministic. An unreadable builder file skips that pair
/// (logged); a missing parser sibling silently disqualifies it.
pub fn collect_sources(config: &CorpusConfig, category: Category) -> Result<Vec<TypeSource>> {
    let prefix = category.file_prefix();
    let builder_suffix = format!("{prefix}Builder.java");
    let parser_suffix = format!("{prefix}Parser.java");

    let pattern = config.src_dir.join(format!("*{builder_suffix}"));
    let pattern = pattern
        .to_str()
        .with_context(|| format!("non-UTF-8 corpus path: {}", config.src_dir.display()))?;

    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("bad corpus pattern: {pattern}"))?
        .collect::<std::result::Result<_, _>>()
        .context("failed to list corpus directory")?;
    paths.sort();

    let mut sources = Vec::new();
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(&builder_suffix) else {
            continue;
        };
        if stem.is_empty() {
            // the marker interface's own file, not a concrete builder
            continue;
        }
        if !config.src_dir.join(format!("{stem}{parser_suffix}")).exists() {
            continue;
        }
        let source_text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("skipping unreadable builder source {}: {e}", path.display());
                continue;
            }
        };
        sources.push(TypeSource {
            builder_class: format!("{stem}{prefix}Builder"),
            parser_class: format!("{stem}{prefix}Parser"),
            source_text,
        });
    }
    Ok(sources)
}

/// Mine one category end to end: walk, extract, correct.
pub fn mine_category(
    config: &CorpusConfig,
    category: Category,
    manifest: &Manifest,
) -> Result<(BTreeMap<String, TypeRecord>, Vec<Diagnostic>)> {
    let sources = collect_sources(config, category)?;
    let result = engine::extract_category(&sources, category, manifest);
    let mut types = result.types;
    workaround::apply(category, &mut types)
        .with_context(|| format!("stale workaround while mining {} types", category.section()))?;
    Ok((types, result.diags.into_records()))
}

/// Mine the whole corpus: both categories against one manifest.
pub fn mine(config: &CorpusConfig) -> Result<Extraction> {
    let manifest = Manifest::load(&config.manifest_path)?;
    let (queries, mut diags) = mine_category(config, Category::Query, &manifest)?;
    let (filters, filter_diags) = mine_category(config, Category::Filter, &manifest)?;
    diags.extend(filter_diags);
    Ok(Extraction { queries, filters, diags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &std::path::Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn pairing_requires_a_parser_sibling_and_skips_the_marker_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "TermQueryBuilder.java", "builder.field(\"value\", value);");
        write(dir.path(), "TermQueryParser.java", "");
        // no parser sibling
        write(dir.path(), "OrphanQueryBuilder.java", "");
        // the marker interface itself
        write(dir.path(), "QueryBuilder.java", "");
        // wrong category
        write(dir.path(), "TermFilterBuilder.java", "");
        write(dir.path(), "TermFilterParser.java", "");

        let config = CorpusConfig {
            src_dir: dir.path().to_path_buf(),
            manifest_path: dir.path().join("manifest.json"),
        };
        let sources = collect_sources(&config, Category::Query).unwrap();
        let builders: Vec<&str> = sources.iter().map(|s| s.builder_class.as_str()).collect();
        assert_eq!(builders, ["TermQueryBuilder"]);

        let sources = collect_sources(&config, Category::Filter).unwrap();
        let builders: Vec<&str> = sources.iter().map(|s| s.builder_class.as_str()).collect();
        assert_eq!(builders, ["TermFilterBuilder"]);
    }

    #[test]
    fn mine_runs_both_categories_and_applies_corrections() {
        let dir = tempfile::tempdir().unwrap();

        // a minimal corpus where every workaround target exists
        let manifest = serde_json::json!({
            "types": {
                "CommonQueryParser": { "constants": { "NAME": "common" } },
                "CommonQueryBuilder": { "fields": [
                    { "name": "lowFreqMinimumShouldMatch",  "type": "String" },
                    { "name": "highFreqMinimumShouldMatch", "type": "String" }
                ]},
                "MultiMatchQueryParser": { "constants": { "NAME": "multi_match" } },
                "MultiMatchQueryBuilder": { "fields": [] },
                "MatchQueryParser": { "constants": { "NAME": "match" } },
                "MatchQueryBuilder": { "fields": [] },
                "QueryStringQueryParser": { "constants": { "NAME": "query_string" } },
                "QueryStringQueryBuilder": { "fields": [] },
                "TemplateQueryParser": { "constants": { "NAME": "template" } },
                "TemplateQueryBuilder": { "fields": [] },
                "GeoDistanceFilterParser": { "constants": { "NAME": "geo_distance" } },
                "GeoDistanceFilterBuilder": { "fields": [
                    { "name": "optimizeBbox", "type": "String" }
                ]},
                "GeoDistanceRangeFilterParser": { "constants": { "NAME": "geo_distance_range" } },
                "GeoDistanceRangeFilterBuilder": { "fields": [
                    { "name": "optimizeBbox", "type": "String" }
                ]},
                "GeoBoundingBoxFilterParser": { "constants": { "NAME": "geo_bbox" } },
                "GeoBoundingBoxFilterBuilder": { "fields": [] }
            }
        });
        write(dir.path(), "manifest.json", &manifest.to_string());

        let common_src = r#"
            builder.field("low_freq", lowFreqMinimumShouldMatch);
            builder.field("high_freq", highFreqMinimumShouldMatch);
        "#;
        let geo_src = r#"
            builder.startObject(name);
            builder.startArray(name).value(lon).value(lat).endArray();
            builder.endObject();
            builder.field("optimize_bbox", optimizeBbox);
        "#;
        for (builder, parser, src) in [
            ("CommonQueryBuilder.java", "CommonQueryParser.java", common_src),
            ("MultiMatchQueryBuilder.java", "MultiMatchQueryParser.java", ""),
            ("MatchQueryBuilder.java", "MatchQueryParser.java", ""),
            ("QueryStringQueryBuilder.java", "QueryStringQueryParser.java", ""),
            ("TemplateQueryBuilder.java", "TemplateQueryParser.java", ""),
            ("GeoDistanceFilterBuilder.java", "GeoDistanceFilterParser.java", geo_src),
            ("GeoDistanceRangeFilterBuilder.java", "GeoDistanceRangeFilterParser.java", geo_src),
            ("GeoBoundingBoxFilterBuilder.java", "GeoBoundingBoxFilterParser.java", ""),
        ] {
            write(dir.path(), builder, src);
            write(dir.path(), parser, "");
        }

        let config = CorpusConfig {
            src_dir: dir.path().to_path_buf(),
            manifest_path: dir.path().join("manifest.json"),
        };
        let extraction = mine(&config).unwrap();

        assert_eq!(
            extraction.queries["common"].fields["lowFreqMinimumShouldMatch"]
                .external_name
                .as_deref(),
            Some("minimum_should_match.low_freq")
        );
        assert!(extraction.queries["multi_match"].fields.contains_key("zeroTermsQuery"));
        let geo = &extraction.filters["geo_distance"];
        assert!(geo.named_array && !geo.named_object);
        assert_eq!(geo.named_array_components, vec!["lon", "lat"]);
        assert!(extraction.filters["geo_bbox"].fields.contains_key("top_left[0]"));
    }

    #[test]
    fn a_missing_workaround_target_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "manifest.json", r#"{ "types": {} }"#);
        let config = CorpusConfig {
            src_dir: dir.path().to_path_buf(),
            manifest_path: dir.path().join("manifest.json"),
        };
        let err = mine(&config).unwrap_err();
        assert!(err.to_string().contains("stale workaround"), "{err}");
    }
}
