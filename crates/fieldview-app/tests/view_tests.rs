// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use fieldview_app::{
    DatasetKind, DatasetRegistry, EditSession, Record, RecordId, ViewCommand, ViewController,
    filter_by_values, format_date, search_records,
};
use fieldview_testkit::{CatalogFaker, sample_registry};
use std::collections::BTreeSet;

fn visible_ids(controller: &ViewController) -> Vec<i64> {
    controller
        .snapshot()
        .rows
        .iter()
        .map(|row| row.id.get())
        .collect()
}

#[test]
fn empty_value_set_returns_every_record_for_every_field() -> Result<()> {
    for dataset in CatalogFaker::new(5).datasets(25)? {
        let records = dataset.records();
        for field in records[0].keys() {
            let kept = filter_by_values(
                records.iter().collect(),
                Some(field.as_str()),
                &BTreeSet::new(),
            );
            assert_eq!(kept.len(), records.len(), "{} {field}", dataset.kind());
            assert!(
                kept.iter()
                    .zip(records)
                    .all(|(left, right)| left.id() == right.id())
            );
        }
    }
    Ok(())
}

#[test]
fn empty_search_is_identity_on_demo_data() -> Result<()> {
    for dataset in CatalogFaker::new(9).datasets(10)? {
        let records = dataset.records();
        let found = search_records(records, dataset.search_field(), "");
        assert_eq!(found.len(), records.len());
    }
    Ok(())
}

#[test]
fn date_formatter_examples() {
    assert_eq!(format_date("2023-05-09T14:22:31.5Z"), "09.05.2023");
    assert_eq!(format_date("not-a-date"), "not-a-date");
}

#[test]
fn edit_survives_a_round_trip_through_another_dataset() -> Result<()> {
    let mut controller = ViewController::new(sample_registry()?);
    controller.dispatch(ViewCommand::OpenEdit(RecordId::new(2)));
    controller.dispatch(ViewCommand::UpdateEditPending("X".to_owned()));
    controller.dispatch(ViewCommand::SaveEdit);

    controller.dispatch(ViewCommand::SelectDataset(DatasetKind::Pages));
    assert_eq!(controller.snapshot().rows[0].cells, vec!["Home", "09.05.2023"]);
    controller.dispatch(ViewCommand::SelectDataset(DatasetKind::Products));

    let record = controller
        .registry()
        .active()
        .record(RecordId::new(2))
        .expect("record 2 present");
    assert_eq!(record.display_value("name"), "X");
    Ok(())
}

#[test]
fn edit_session_save_and_cancel_against_registry() -> Result<()> {
    let mut registry = sample_registry()?;
    let record = registry.active_records()[0].clone();

    let mut saved = EditSession::open(DatasetKind::Products, &record, "name");
    saved.update_pending("NewValue");
    saved.save(&mut registry);
    assert_eq!(registry.active_records()[0].display_value("name"), "NewValue");

    let mut cancelled = EditSession::open(DatasetKind::Products, &record, "name");
    cancelled.update_pending("Other");
    cancelled.cancel();
    assert_eq!(registry.active_records()[0].display_value("name"), "NewValue");
    Ok(())
}

#[test]
fn search_then_filter_end_to_end() -> Result<()> {
    let mut controller = ViewController::new(sample_registry()?);
    controller.dispatch(ViewCommand::SetSearchQuery("Sh".to_owned()));
    assert_eq!(visible_ids(&controller), vec![1, 2]);

    controller.dispatch(ViewCommand::SetFilterField("price".to_owned()));
    controller.dispatch(ViewCommand::SetFilterValues(vec!["10".to_owned()]));
    assert_eq!(visible_ids(&controller), vec![1]);
    Ok(())
}

#[test]
fn editing_a_number_turns_it_into_text_but_renders_the_same() -> Result<()> {
    let products = fieldview_app::Dataset::new(
        DatasetKind::Products,
        vec![
            Record::new(1)
                .with_field("price", 10_i64)
                .with_field("name", "Shoe"),
        ],
    )?
    .with_search_field("price")?;
    let mut controller = ViewController::new(DatasetRegistry::new(vec![products])?);

    controller.dispatch(ViewCommand::OpenEdit(RecordId::new(1)));
    assert_eq!(
        controller.snapshot().edit.map(|edit| edit.pending),
        Some("10".to_owned())
    );
    controller.dispatch(ViewCommand::SaveEdit);
    controller.dispatch(ViewCommand::SetFilterField("price".to_owned()));
    assert_eq!(controller.snapshot().filter_choices, vec!["10"]);
    Ok(())
}

#[test]
fn view_state_serializes_for_inspection() -> Result<()> {
    let mut controller = ViewController::new(sample_registry()?);
    controller.dispatch(ViewCommand::SetFilterField("price".to_owned()));
    controller.dispatch(ViewCommand::ToggleFilterValue("20".to_owned()));

    let encoded = serde_json::to_value(controller.state())?;
    assert_eq!(encoded["active"], "Products");
    assert_eq!(encoded["filter_values"], serde_json::json!(["20"]));

    let snapshot = serde_json::to_value(controller.snapshot())?;
    assert_eq!(snapshot["rows"][0]["id"], 2);
    Ok(())
}

#[test]
fn records_deserialize_in_document_order() -> Result<()> {
    let record: Record =
        serde_json::from_str(r#"{"title": "Home", "id": 3, "slug": "/", "views": 1.5}"#)?;
    assert_eq!(record.id(), RecordId::new(3));
    assert_eq!(
        record.field_names().collect::<Vec<_>>(),
        vec!["title", "slug", "views"]
    );
    assert_eq!(record.display_value("views"), "1.5");

    let encoded = serde_json::to_string(&record)?;
    assert_eq!(encoded, r#"{"id":3,"title":"Home","slug":"/","views":1.5}"#);

    assert!(serde_json::from_str::<Record>(r#"{"title": "No id"}"#).is_err());
    assert!(serde_json::from_str::<Record>(r#"{"id": "x"}"#).is_err());
    Ok(())
}
