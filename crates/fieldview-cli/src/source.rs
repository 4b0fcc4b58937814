// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use fieldview_app::{Dataset, DatasetKind, DatasetSource, Record};
use fieldview_testkit::CatalogFaker;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEMO_SEED: u64 = 2024;
pub const DEMO_ROWS: usize = 40;

/// One entry of the data file: either a bare record list or a list with a
/// search field override.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetEntry {
    Records(Vec<Record>),
    Configured {
        search_field: Option<String>,
        records: Vec<Record>,
    },
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DatasetSource for JsonFileSource {
    fn load_datasets(&mut self) -> Result<Vec<Dataset>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read data file {}", self.path.display()))?;
        parse_datasets(&raw).with_context(|| format!("decode data file {}", self.path.display()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DemoSource {
    seed: u64,
    rows: usize,
}

impl DemoSource {
    pub fn new(seed: u64, rows: usize) -> Self {
        Self { seed, rows }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(DEMO_SEED, DEMO_ROWS)
    }
}

impl DatasetSource for DemoSource {
    fn load_datasets(&mut self) -> Result<Vec<Dataset>> {
        CatalogFaker::new(self.seed).datasets(self.rows)
    }
}

pub fn parse_datasets(raw: &str) -> Result<Vec<Dataset>> {
    let entries: BTreeMap<String, DatasetEntry> = serde_json::from_str(raw).context(
        "expected a JSON object keyed by dataset label, each value a record array or {\"search_field\", \"records\"}",
    )?;

    let mut datasets = Vec::with_capacity(entries.len());
    for (label, entry) in entries {
        let kind = DatasetKind::parse(&label).ok_or_else(|| {
            anyhow!(
                "unknown dataset {label:?}; expected one of: {}",
                DatasetKind::ALL
                    .iter()
                    .map(|kind| kind.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;
        let (search_field, records) = match entry {
            DatasetEntry::Records(records) => (None, records),
            DatasetEntry::Configured {
                search_field,
                records,
            } => (search_field, records),
        };

        let search_field = search_field.unwrap_or_else(|| kind.default_search_field().to_owned());
        let dataset = Dataset::with_search(kind, records, search_field)
            .with_context(|| format!("dataset {label}"))?;
        debug!(
            dataset = %kind,
            records = dataset.len(),
            search_field = dataset.search_field(),
            "loaded dataset"
        );
        datasets.push(dataset);
    }
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::{DemoSource, JsonFileSource, parse_datasets};
    use anyhow::Result;
    use fieldview_app::{DatasetKind, DatasetRegistry, DatasetSource, RecordId};
    use fieldview_testkit::{sample_data_json, write_data_file};

    #[test]
    fn json_file_loads_plain_and_configured_entries() -> Result<()> {
        let (_temp, path) = write_data_file(&sample_data_json())?;
        let registry = DatasetRegistry::from_source(&mut JsonFileSource::new(&path))?;

        let products = registry.dataset(DatasetKind::Products);
        assert_eq!(products.len(), 2);
        assert_eq!(products.search_field(), "name");

        let pages = registry.dataset(DatasetKind::Pages);
        assert_eq!(pages.search_field(), "slug");
        assert_eq!(
            pages
                .record(RecordId::new(1))
                .map(|record| record.display_value("title")),
            Some("Home".to_owned())
        );

        assert!(registry.dataset(DatasetKind::PricePlans).is_empty());
        Ok(())
    }

    #[test]
    fn labels_accept_lowercase_forms() -> Result<()> {
        let datasets = parse_datasets(r#"{"price_plans": [{"id": 1, "description": "Team"}]}"#)?;
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].kind(), DatasetKind::PricePlans);
        assert_eq!(datasets[0].search_field(), "description");
        Ok(())
    }

    #[test]
    fn unknown_label_is_rejected() {
        let error = parse_datasets(r#"{"Orders": []}"#).expect_err("unknown label should fail");
        let message = format!("{error:#}");
        assert!(message.contains("unknown dataset \"Orders\""));
        assert!(message.contains("Products, Pages, PricePlans"));
    }

    #[test]
    fn mixed_field_sets_are_rejected() {
        let error = parse_datasets(
            r#"{"Products": [{"id": 1, "name": "Shoe"}, {"id": 2, "title": "Shirt"}]}"#,
        )
        .expect_err("heterogeneous records should fail");
        assert!(format!("{error:#}").contains("dataset Products"));
    }

    #[test]
    fn search_field_override_must_exist() {
        let error = parse_datasets(
            r#"{"Pages": {"search_field": "body", "records": [{"id": 1, "title": "Home"}]}}"#,
        )
        .expect_err("missing search field should fail");
        let message = format!("{error:#}");
        assert!(message.contains("search_field \"body\""));
        assert!(message.contains("pick one of: title"));
    }

    #[test]
    fn id_cannot_be_the_search_field() {
        let error = parse_datasets(
            r#"{"Products": {"search_field": "id", "records": [{"id": 1, "name": "Shoe"}, {"id": 2, "name": "Shirt"}]}}"#,
        )
        .expect_err("id is not an editable field");
        let message = format!("{error:#}");
        assert!(message.contains("dataset Products"));
        assert!(message.contains("search_field \"id\""));
        assert!(message.contains("pick one of: name"));
    }

    #[test]
    fn default_search_field_must_exist() {
        let error = parse_datasets(
            r#"{"Products": [{"id": 1, "title": "Shoe"}, {"id": 2, "title": "Shirt"}]}"#,
        )
        .expect_err("products without a name field should fail");
        let message = format!("{error:#}");
        assert!(message.contains("search_field \"name\""));
        assert!(message.contains("pick one of: title"));
    }

    #[test]
    fn override_rescues_a_dataset_missing_its_default_field() -> Result<()> {
        let datasets = parse_datasets(
            r#"{"Products": {"search_field": "title", "records": [{"id": 1, "title": "Shoe"}]}}"#,
        )?;
        assert_eq!(datasets[0].search_field(), "title");
        Ok(())
    }

    #[test]
    fn booleans_and_null_load_and_stringify() -> Result<()> {
        let datasets = parse_datasets(
            r#"{"PricePlans": [{"description": "Team", "id": 1, "active": true, "note": null}]}"#,
        )?;
        let record = &datasets[0].records()[0];
        assert_eq!(record.display_value("active"), "true");
        assert_eq!(record.display_value("note"), "null");
        assert_eq!(record.keys(), vec!["description", "id", "active", "note"]);
        Ok(())
    }

    #[test]
    fn malformed_json_explains_expected_shape() {
        let error = parse_datasets("[1, 2]").expect_err("array root should fail");
        assert!(format!("{error:#}").contains("keyed by dataset label"));
    }

    #[test]
    fn missing_file_names_the_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("absent.json");
        let error = JsonFileSource::new(&path)
            .load_datasets()
            .expect_err("missing file should fail");
        assert!(format!("{error:#}").contains("absent.json"));
        Ok(())
    }

    #[test]
    fn demo_source_is_deterministic() -> Result<()> {
        let left = DemoSource::new(3, 5).load_datasets()?;
        let right = DemoSource::new(3, 5).load_datasets()?;
        assert_eq!(left, right);
        assert_eq!(left.len(), DatasetKind::ALL.len());
        Ok(())
    }
}
