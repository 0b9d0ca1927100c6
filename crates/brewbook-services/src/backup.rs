use brewbook_core::{Result, SCHEMA_VERSION};
use brewbook_domain::{Backup, Dataset};
use serde_json::Value;

/// Assemble a whole-dataset backup. Brew logs and tasting notes are owned
/// by external collaborators and carried as opaque JSON, which keeps the
/// round trip exact without this crate adopting their schema. The export
/// date is caller-supplied so the core stays clock-free.
pub fn make_backup(
    dataset: &Dataset,
    brew_logs: Vec<Value>,
    tasting_notes: Vec<Value>,
    export_date: impl Into<String>,
) -> Backup {
    Backup {
        version: SCHEMA_VERSION,
        export_date: export_date.into(),
        recipes: dataset.recipes.clone(),
        brew_logs,
        tasting_notes,
        library: dataset.library.clone(),
    }
}

pub fn backup_to_json(backup: &Backup) -> Result<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

pub fn backup_from_json(json: &str) -> Result<Backup> {
    Ok(serde_json::from_str(json)?)
}

/// Split a backup back into the in-memory dataset and the collaborator
/// collections.
pub fn restore_backup(backup: Backup) -> (Dataset, Vec<Value>, Vec<Value>) {
    (
        Dataset {
            recipes: backup.recipes,
            library: backup.library,
        },
        backup.brew_logs,
        backup.tasting_notes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewbook_domain::{Amount, IngredientKind, LibraryIngredient, Recipe};
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset {
            recipes: vec![Recipe {
                id: "r-1".into(),
                name: "Helles".into(),
                batch_size: Amount::new(20.0, "liters"),
                ..Default::default()
            }],
            library: vec![LibraryIngredient {
                alpha_percent: Some(3.8),
                ..LibraryIngredient::new("l-1", "Saaz", IngredientKind::Hop)
            }],
        }
    }

    #[test]
    fn backup_round_trips_exactly() {
        let logs = vec![json!({"gravity": 1.048, "note": "day 3"})];
        let notes = vec![json!({"score": 8, "text": "crisp"})];
        let backup = make_backup(&dataset(), logs.clone(), notes.clone(), "2024-11-02");

        let text = backup_to_json(&backup).unwrap();
        let restored = backup_from_json(&text).unwrap();
        assert_eq!(restored.version, SCHEMA_VERSION);
        assert_eq!(restored.export_date, "2024-11-02");

        let (ds, restored_logs, restored_notes) = restore_backup(restored);
        assert_eq!(ds.recipes, dataset().recipes);
        assert_eq!(ds.library, dataset().library);
        assert_eq!(restored_logs, logs);
        assert_eq!(restored_notes, notes);
    }

    #[test]
    fn unknown_collaborator_fields_survive() {
        let logs = vec![json!({"custom_field": {"deep": [1, 2, 3]}})];
        let backup = make_backup(&dataset(), logs.clone(), Vec::new(), "");
        let text = backup_to_json(&backup).unwrap();
        let (_, restored_logs, _) = restore_backup(backup_from_json(&text).unwrap());
        assert_eq!(restored_logs, logs);
    }
}
