// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::RecordId;

pub const ID_FIELD: &str = "id";

/// Placeholder shown for a field a record does not carry.
pub const MISSING_FIELD: &str = "undefined";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for FieldValue {
    /// Renders the value the way a browser stringifies it, so filter choices
    /// and search matches agree with what the table shows.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => format_float(*value, f),
            Self::Text(value) => f.write_str(value),
            Self::Null => f.write_str("null"),
        }
    }
}

fn format_float(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("NaN");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if value == 0.0 {
        return f.write_str("0");
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 {
        let rendered = format!("{value:e}");
        return f.write_str(&rendered.replacen('e', "e+", 1));
    }
    if magnitude < 1e-6 {
        return write!(f, "{value:e}");
    }
    write!(f, "{value}")
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One row: a required id plus named fields in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    // Number of fields that precede `id` in the source document.
    id_position: usize,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id: RecordId::new(id),
            id_position: 0,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set_field(name, value.into());
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// All keys including `id`, in document order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.field_names().map(str::to_owned).collect();
        keys.insert(self.id_index(), ID_FIELD.to_owned());
        keys
    }

    fn id_index(&self) -> usize {
        self.id_position.min(self.fields.len())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn display_value(&self, field: &str) -> String {
        if field == ID_FIELD {
            return self.id.to_string();
        }
        match self.get(field) {
            Some(value) => value.to_string(),
            None => MISSING_FIELD.to_owned(),
        }
    }

    /// Replaces the value in place, or appends the field when it is absent.
    /// `id` is immutable and writes to it are dropped.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if name == ID_FIELD {
            return;
        }
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    fn field_set(&self) -> BTreeSet<&str> {
        self.field_names().collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (before, after) = self.fields.split_at(self.id_index());
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, value) in before {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (name, value) in after {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a record object with an integer `id`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
        let mut id = None;
        let mut id_position = 0;
        let mut fields: Vec<(String, FieldValue)> = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == ID_FIELD {
                if id.is_some() {
                    return Err(de::Error::duplicate_field("id"));
                }
                id = Some(map.next_value::<RecordId>()?);
                id_position = fields.len();
                continue;
            }

            let value = map.next_value::<FieldValue>()?;
            match fields.iter_mut().find(|(name, _)| *name == key) {
                Some((_, slot)) => *slot = value,
                None => fields.push((key, value)),
            }
        }

        let id = id.ok_or_else(|| de::Error::missing_field("id"))?;
        Ok(Record {
            id,
            id_position,
            fields,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    Products,
    Pages,
    PricePlans,
}

impl DatasetKind {
    pub const ALL: [Self; 3] = [Self::Products, Self::Pages, Self::PricePlans];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Pages => "Pages",
            Self::PricePlans => "PricePlans",
        }
    }

    pub const fn default_search_field(self) -> &'static str {
        match self {
            Self::Products => "name",
            Self::Pages => "title",
            Self::PricePlans => "description",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Products" | "products" => Some(Self::Products),
            "Pages" | "pages" => Some(Self::Pages),
            "PricePlans" | "priceplans" | "price_plans" | "price-plans" => Some(Self::PricePlans),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, homogeneous collection of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    kind: DatasetKind,
    search_field: String,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, records: Vec<Record>) -> Result<Self> {
        Self::with_search(kind, records, kind.default_search_field())
    }

    /// Builds a dataset searched and edited through `search_field`, which
    /// must be a non-`id` field of the records.
    pub fn with_search(
        kind: DatasetKind,
        records: Vec<Record>,
        search_field: impl Into<String>,
    ) -> Result<Self> {
        let search_field = search_field.into();
        let mut ids = BTreeSet::new();
        if let Some(first) = records.first() {
            let expected = first.field_set();
            for record in &records {
                if !ids.insert(record.id()) {
                    bail!(
                        "dataset {kind} has duplicate record id {} -- ids must be unique per dataset",
                        record.id()
                    );
                }
                let actual = record.field_set();
                if actual != expected {
                    bail!(
                        "dataset {kind} record {} has fields {:?}; expected {:?} like the first record",
                        record.id(),
                        actual,
                        expected
                    );
                }
            }
        }

        ensure_search_field(kind, &records, &search_field)?;
        Ok(Self {
            kind,
            search_field,
            records,
        })
    }

    pub fn empty(kind: DatasetKind) -> Self {
        Self {
            kind,
            search_field: kind.default_search_field().to_owned(),
            records: Vec::new(),
        }
    }

    /// Overrides the search field, which must be a non-`id` field of the
    /// records. Edits write to this field.
    pub fn with_search_field(mut self, field: impl Into<String>) -> Result<Self> {
        let field = field.into();
        ensure_search_field(self.kind, &self.records, &field)?;
        self.search_field = field;
        Ok(self)
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub(crate) fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    /// Column names of the first record, `id` excluded. `None` when empty.
    pub fn columns(&self) -> Option<Vec<String>> {
        self.records
            .first()
            .map(|record| record.field_names().map(str::to_owned).collect())
    }
}

fn ensure_search_field(kind: DatasetKind, records: &[Record], field: &str) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    if field == ID_FIELD || first.get(field).is_none() {
        bail!(
            "dataset {kind}: search_field {field:?} is not a field of its records; pick one of: {}",
            first.field_names().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(())
}
