// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};

use crate::{Dataset, DatasetKind, FieldValue, Record, RecordId};

/// Supplies the initial record collections at startup.
pub trait DatasetSource {
    fn load_datasets(&mut self) -> Result<Vec<Dataset>>;
}

/// Owns every dataset's records. Each dataset keeps its own copy, so edits
/// survive switching away and back.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRegistry {
    datasets: Vec<Dataset>,
    active: DatasetKind,
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self {
            datasets: DatasetKind::ALL.into_iter().map(Dataset::empty).collect(),
            active: DatasetKind::ALL[0],
        }
    }
}

impl DatasetRegistry {
    pub fn new(datasets: Vec<Dataset>) -> Result<Self> {
        let mut registry = Self::default();
        let mut supplied = Vec::new();
        for dataset in datasets {
            let kind = dataset.kind();
            if supplied.contains(&kind) {
                bail!("dataset {kind} supplied twice -- merge the record lists into one entry");
            }
            supplied.push(kind);
            registry.datasets[kind.index()] = dataset;
        }
        Ok(registry)
    }

    pub fn from_source<S: DatasetSource + ?Sized>(source: &mut S) -> Result<Self> {
        let datasets = source.load_datasets().context("load datasets")?;
        Self::new(datasets)
    }

    pub fn active_kind(&self) -> DatasetKind {
        self.active
    }

    pub fn active(&self) -> &Dataset {
        self.dataset(self.active)
    }

    pub fn active_records(&self) -> &[Record] {
        self.active().records()
    }

    pub fn dataset(&self, kind: DatasetKind) -> &Dataset {
        &self.datasets[kind.index()]
    }

    /// Returns whether the active dataset changed.
    pub fn select(&mut self, kind: DatasetKind) -> bool {
        if self.active == kind {
            return false;
        }
        self.active = kind;
        true
    }

    /// Writes `value` into `field` of the matching record. Unknown ids are
    /// ignored; the return value reports whether a record matched.
    pub fn commit_edit(
        &mut self,
        kind: DatasetKind,
        record_id: RecordId,
        field: &str,
        value: impl Into<String>,
    ) -> bool {
        let dataset = &mut self.datasets[kind.index()];
        match dataset.record_mut(record_id) {
            Some(record) => {
                record.set_field(field, FieldValue::Text(value.into()));
                true
            }
            None => false,
        }
    }
}
