// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{DatasetKind, DatasetRegistry, Record, RecordId};

/// Pending single-field edit of one record. Holding a value means the edit
/// dialog is open; `save` and `cancel` consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    pub dataset: DatasetKind,
    pub record_id: RecordId,
    pub field: String,
    pub pending: String,
}

impl EditSession {
    pub fn open(dataset: DatasetKind, record: &Record, field: &str) -> Self {
        Self {
            dataset,
            record_id: record.id(),
            field: field.to_owned(),
            pending: record.display_value(field),
        }
    }

    pub fn update_pending(&mut self, value: impl Into<String>) {
        self.pending = value.into();
    }

    /// Commits the pending value; reports whether the record still existed.
    pub fn save(self, registry: &mut DatasetRegistry) -> bool {
        registry.commit_edit(self.dataset, self.record_id, &self.field, self.pending)
    }

    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::EditSession;
    use crate::{Dataset, DatasetKind, DatasetRegistry, Record, RecordId};
    use anyhow::Result;

    fn registry() -> Result<DatasetRegistry> {
        DatasetRegistry::new(vec![Dataset::new(
            DatasetKind::Products,
            vec![
                Record::new(1)
                    .with_field("name", "Shoe")
                    .with_field("price", 10_i64),
            ],
        )?])
    }

    #[test]
    fn open_captures_current_value() -> Result<()> {
        let registry = registry()?;
        let record = &registry.active_records()[0];
        let session = EditSession::open(DatasetKind::Products, record, "price");
        assert_eq!(session.record_id, RecordId::new(1));
        assert_eq!(session.pending, "10");
        Ok(())
    }

    #[test]
    fn save_writes_pending_value() -> Result<()> {
        let mut registry = registry()?;
        let mut session =
            EditSession::open(DatasetKind::Products, &registry.active_records()[0], "name");
        session.update_pending("NewValue");
        assert!(session.save(&mut registry));
        assert_eq!(registry.active_records()[0].display_value("name"), "NewValue");
        Ok(())
    }

    #[test]
    fn cancel_leaves_record_untouched() -> Result<()> {
        let registry = registry()?;
        let mut session =
            EditSession::open(DatasetKind::Products, &registry.active_records()[0], "name");
        session.update_pending("NewValue");
        session.cancel();
        assert_eq!(registry.active_records()[0].display_value("name"), "Shoe");
        Ok(())
    }
}
