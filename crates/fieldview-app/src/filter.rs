// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::Record;

/// Keeps records whose value at `field` contains `query`, case-sensitively.
pub fn search_records<'a>(records: &'a [Record], field: &str, query: &str) -> Vec<&'a Record> {
    if query.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record.display_value(field).contains(query))
        .collect()
}

/// Narrows already-searched records to those whose value at `field` is one
/// of `values`. An empty selection keeps everything.
pub fn filter_by_values<'a>(
    records: Vec<&'a Record>,
    field: Option<&str>,
    values: &BTreeSet<String>,
) -> Vec<&'a Record> {
    let Some(field) = field else {
        return records;
    };
    if values.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| values.contains(&record.display_value(field)))
        .collect()
}

/// Distinct values of `field` in first-seen order. Callers pass the
/// unfiltered dataset, so a search never shrinks the offered choices.
pub fn filter_choices(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .map(|record| record.display_value(field))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
