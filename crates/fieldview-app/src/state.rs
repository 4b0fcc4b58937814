// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::{
    DatasetKind, DatasetRegistry, EditSession, Record, RecordId, filter_by_values, filter_choices,
    format_date, format_heading, search_records,
};

/// Everything the user has chosen. Rows are never stored here; they are
/// recomputed from the registry by [`derive_view`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub active: DatasetKind,
    pub search_field: String,
    pub search_query: String,
    pub filter_field: Option<String>,
    pub filter_values: BTreeSet<String>,
    pub columns: Vec<String>,
    pub edit: Option<EditSession>,
    pub status_line: Option<String>,
}

impl ViewState {
    pub fn for_registry(registry: &DatasetRegistry) -> Self {
        let dataset = registry.active();
        Self {
            active: dataset.kind(),
            search_field: dataset.search_field().to_owned(),
            search_query: String::new(),
            filter_field: None,
            filter_values: BTreeSet::new(),
            columns: dataset.columns().unwrap_or_default(),
            edit: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SelectDataset(DatasetKind),
    NextDataset,
    PrevDataset,
    SetSearchQuery(String),
    SetFilterField(String),
    ToggleFilterValue(String),
    SetFilterValues(Vec<String>),
    ClearFilterValues,
    OpenEdit(RecordId),
    UpdateEditPending(String),
    SaveEdit,
    CancelEdit,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    DatasetChanged(DatasetKind),
    SearchChanged(String),
    FilterFieldChanged(String),
    FilterValuesChanged(Vec<String>),
    EditOpened(RecordId),
    EditPendingChanged(String),
    EditSaved(RecordId),
    EditCancelled(RecordId),
    EditDiscarded(RecordId),
    StatusUpdated(String),
    StatusCleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: RecordId,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditView {
    pub record_id: RecordId,
    pub field: String,
    pub heading: String,
    pub pending: String,
}

/// Render-ready projection of the registry under the current view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub dataset: DatasetKind,
    pub datasets: Vec<DatasetKind>,
    pub columns: Vec<String>,
    pub headings: Vec<String>,
    pub rows: Vec<RowView>,
    pub total_rows: usize,
    pub search_field: String,
    pub search_query: String,
    pub filter_fields: Vec<String>,
    pub filter_field: Option<String>,
    pub filter_choices: Vec<String>,
    pub filter_values: Vec<String>,
    pub edit: Option<EditView>,
    pub status_line: Option<String>,
}

/// Search narrows first, then the value filter narrows what is left. Filter
/// choices always come from the full dataset.
pub fn derive_view(registry: &DatasetRegistry, state: &ViewState) -> ViewSnapshot {
    let records = registry.dataset(state.active).records();
    let searched = search_records(records, &state.search_field, &state.search_query);
    let visible = filter_by_values(
        searched,
        state.filter_field.as_deref(),
        &state.filter_values,
    );

    let rows = visible
        .into_iter()
        .map(|record| RowView {
            id: record.id(),
            cells: state
                .columns
                .iter()
                .map(|column| format_date(&record.display_value(column)))
                .collect(),
        })
        .collect();

    ViewSnapshot {
        dataset: state.active,
        datasets: DatasetKind::ALL.to_vec(),
        columns: state.columns.clone(),
        headings: state
            .columns
            .iter()
            .map(|column| format_heading(column))
            .collect(),
        rows,
        total_rows: records.len(),
        search_field: state.search_field.clone(),
        search_query: state.search_query.clone(),
        filter_fields: records.first().map(Record::keys).unwrap_or_default(),
        filter_field: state.filter_field.clone(),
        filter_choices: state
            .filter_field
            .as_deref()
            .map(|field| filter_choices(records, field))
            .unwrap_or_default(),
        filter_values: state.filter_values.iter().cloned().collect(),
        edit: state.edit.as_ref().map(|session| EditView {
            record_id: session.record_id,
            field: session.field.clone(),
            heading: format_heading(&session.field),
            pending: session.pending.clone(),
        }),
        status_line: state.status_line.clone(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewController {
    registry: DatasetRegistry,
    state: ViewState,
}

impl ViewController {
    pub fn new(registry: DatasetRegistry) -> Self {
        let state = ViewState::for_registry(&registry);
        Self { registry, state }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        derive_view(&self.registry, &self.state)
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        debug!(?command, dataset = %self.state.active, "dispatch view command");
        match command {
            ViewCommand::SelectDataset(kind) => self.select_dataset(kind),
            ViewCommand::NextDataset => self.rotate_dataset(1),
            ViewCommand::PrevDataset => self.rotate_dataset(-1),
            ViewCommand::SetSearchQuery(query) => {
                self.state.search_query = query.clone();
                vec![ViewEvent::SearchChanged(query)]
            }
            ViewCommand::SetFilterField(field) => {
                self.state.filter_field = Some(field.clone());
                self.state.filter_values.clear();
                vec![
                    ViewEvent::FilterFieldChanged(field.clone()),
                    ViewEvent::FilterValuesChanged(Vec::new()),
                    self.set_status(&format!("filter on {field}")),
                ]
            }
            ViewCommand::ToggleFilterValue(value) => {
                if self.state.filter_field.is_none() {
                    return vec![self.set_status("pick a filter field first")];
                }
                if !self.state.filter_values.remove(&value) {
                    self.state.filter_values.insert(value);
                }
                vec![self.filter_values_changed()]
            }
            ViewCommand::SetFilterValues(values) => {
                if self.state.filter_field.is_none() {
                    return vec![self.set_status("pick a filter field first")];
                }
                self.state.filter_values = values.into_iter().collect();
                vec![self.filter_values_changed()]
            }
            ViewCommand::ClearFilterValues => {
                self.state.filter_values.clear();
                vec![
                    ViewEvent::FilterValuesChanged(Vec::new()),
                    self.set_status("filters cleared"),
                ]
            }
            ViewCommand::OpenEdit(record_id) => self.open_edit(record_id),
            ViewCommand::UpdateEditPending(value) => match self.state.edit.as_mut() {
                Some(session) => {
                    session.update_pending(value.clone());
                    vec![ViewEvent::EditPendingChanged(value)]
                }
                None => Vec::new(),
            },
            ViewCommand::SaveEdit => self.save_edit(),
            ViewCommand::CancelEdit => match self.state.edit.take() {
                Some(session) => {
                    let record_id = session.record_id;
                    session.cancel();
                    vec![
                        ViewEvent::EditCancelled(record_id),
                        self.set_status("edit cancelled"),
                    ]
                }
                None => Vec::new(),
            },
            ViewCommand::SetStatus(message) => vec![self.set_status(&message)],
            ViewCommand::ClearStatus => {
                self.state.status_line = None;
                vec![ViewEvent::StatusCleared]
            }
        }
    }

    fn select_dataset(&mut self, kind: DatasetKind) -> Vec<ViewEvent> {
        if !self.registry.select(kind) {
            return Vec::new();
        }

        let mut events = Vec::new();
        if let Some(session) = self.state.edit.take() {
            events.push(ViewEvent::EditDiscarded(session.record_id));
            session.cancel();
        }

        let dataset = self.registry.active();
        self.state.active = kind;
        self.state.search_field = dataset.search_field().to_owned();
        self.state.search_query.clear();
        self.state.filter_field = None;
        self.state.filter_values.clear();
        // An empty dataset keeps the previous header row.
        if let Some(columns) = dataset.columns() {
            self.state.columns = columns;
        }

        info!(dataset = %kind, records = dataset.len(), "dataset selected");
        events.push(ViewEvent::DatasetChanged(kind));
        events.push(self.set_status(&format!("dataset {kind}")));
        events
    }

    fn rotate_dataset(&mut self, delta: isize) -> Vec<ViewEvent> {
        let kinds = DatasetKind::ALL;
        let current = self.state.active.index() as isize;
        let len = kinds.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.select_dataset(kinds[next])
    }

    fn open_edit(&mut self, record_id: RecordId) -> Vec<ViewEvent> {
        let Some(record) = self.registry.dataset(self.state.active).record(record_id) else {
            return vec![self.set_status(&format!("record {record_id} not found"))];
        };
        let session = EditSession::open(self.state.active, record, &self.state.search_field);

        let mut events = Vec::new();
        if let Some(previous) = self.state.edit.replace(session) {
            events.push(ViewEvent::EditDiscarded(previous.record_id));
        }
        events.push(ViewEvent::EditOpened(record_id));
        events
    }

    fn save_edit(&mut self) -> Vec<ViewEvent> {
        let Some(session) = self.state.edit.take() else {
            return Vec::new();
        };
        let record_id = session.record_id;
        let field = session.field.clone();
        if !session.save(&mut self.registry) {
            return vec![self.set_status(&format!("record {record_id} not found"))];
        }

        if let Some(columns) = self.registry.dataset(self.state.active).columns() {
            self.state.columns = columns;
        }
        info!(record = %record_id, %field, "edit saved");
        vec![ViewEvent::EditSaved(record_id), self.set_status("edit saved")]
    }

    fn filter_values_changed(&self) -> ViewEvent {
        ViewEvent::FilterValuesChanged(self.state.filter_values.iter().cloned().collect())
    }

    fn set_status(&mut self, message: &str) -> ViewEvent {
        self.state.status_line = Some(message.to_owned());
        ViewEvent::StatusUpdated(message.to_owned())
    }
}
