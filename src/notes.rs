use std::collections::HashMap;

use log::warn;

use crate::{
    core::{
        models::{
            DenormalizeOptions,
            UnknownModelPolicy,
            ANKI_SEPARATOR,
        },
        AnkipeekError,
        DenormalizedNote,
        LoadContext,
        RawNote,
    },
    patches::apply_patches,
};

/// Join raw note rows against their model's field names.
///
/// Notes are grouped by model id; output order is the order each model id
/// first appears in the input. Within a group, every field blob is split on
/// the separator and zipped positionally against the model's field names.
///
/// A note referencing a model absent from the schema either aborts the load
/// ([`UnknownModelPolicy::Fail`], the default) or drops just that group
/// ([`UnknownModelPolicy::Skip`]).
pub fn denormalize(
    raw_notes: &[RawNote],
    context: &LoadContext,
    options: &DenormalizeOptions,
) -> Result<Vec<DenormalizedNote>, AnkipeekError> {
    let mut first_seen: Vec<i64> = Vec::new();
    let mut grouped: HashMap<i64, Vec<&RawNote>> = HashMap::new();

    for note in raw_notes {
        let group = grouped.entry(note.model_id).or_insert_with(|| {
            first_seen.push(note.model_id);
            Vec::new()
        });
        group.push(note);
    }

    let mut tables = Vec::with_capacity(first_seen.len());
    for model_id in first_seen {
        let model = match context.models.get(&model_id) {
            Some(model) => model,
            None => match options.unknown_model {
                UnknownModelPolicy::Fail => {
                    return Err(AnkipeekError::UnknownModelReference(model_id));
                }
                UnknownModelPolicy::Skip => {
                    warn!(
                        "Skipping {} notes referencing unknown model {}",
                        grouped[&model_id].len(),
                        model_id
                    );
                    continue;
                }
            },
        };

        let notes = grouped[&model_id]
            .iter()
            .map(|raw| split_fields(&raw.fields_blob, &model.fields))
            .collect();

        tables.push(DenormalizedNote {
            name: model.name.clone(),
            field_names: model.fields.clone(),
            notes,
        });
    }

    Ok(tables)
}

/// Split one field blob on the separator and pair the values with field
/// names by position. There is no count check: a short row leaves trailing
/// fields unset and surplus values are dropped, exactly as a misaligned
/// collection would misalign.
pub fn split_fields(blob: &str, field_names: &[String]) -> HashMap<String, String> {
    field_names
        .iter()
        .cloned()
        .zip(blob.split(ANKI_SEPARATOR).map(|value| apply_patches(value).into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Model;

    fn context() -> LoadContext {
        let mut models = HashMap::new();
        models.insert(
            10,
            Model {
                id: 10,
                name: "Basic".to_string(),
                fields: vec!["Front".to_string(), "Back".to_string()],
            },
        );
        models.insert(
            20,
            Model { id: 20, name: "Cloze".to_string(), fields: vec!["Text".to_string()] },
        );
        LoadContext { models, decks: HashMap::new() }
    }

    fn note(model_id: i64, blob: &str) -> RawNote {
        RawNote { model_id, fields_blob: blob.to_string() }
    }

    #[test]
    fn key_set_equals_model_fields_for_every_note() {
        let raw = vec![note(10, "a\u{1f}b"), note(10, "c\u{1f}d"), note(20, "cloze text")];
        let tables = denormalize(&raw, &context(), &DenormalizeOptions::default()).unwrap();

        assert_eq!(tables.len(), 2);
        for table in &tables {
            for fields in &table.notes {
                let mut keys: Vec<&String> = fields.keys().collect();
                let mut expected: Vec<&String> = table.field_names.iter().collect();
                keys.sort();
                expected.sort();
                assert_eq!(keys, expected);
            }
        }
    }

    #[test]
    fn output_order_follows_first_appearance_of_each_model() {
        let raw = vec![note(20, "x"), note(10, "a\u{1f}b"), note(20, "y")];
        let tables = denormalize(&raw, &context(), &DenormalizeOptions::default()).unwrap();

        assert_eq!(tables[0].name, "Cloze");
        assert_eq!(tables[0].notes.len(), 2);
        assert_eq!(tables[1].name, "Basic");
    }

    #[test]
    fn joined_blob_round_trips_through_split() {
        let values = ["front value", "back & more"];
        let blob = values.join("\u{1f}");
        let names = vec!["Front".to_string(), "Back".to_string()];

        let fields = split_fields(&blob, &names);
        assert_eq!(fields["Front"], values[0]);
        assert_eq!(fields["Back"], values[1]);
    }

    #[test]
    fn unknown_model_fails_by_default() {
        let raw = vec![note(99, "orphan")];
        match denormalize(&raw, &context(), &DenormalizeOptions::default()) {
            Err(AnkipeekError::UnknownModelReference(99)) => {}
            other => panic!("expected UnknownModelReference(99), got {other:?}"),
        }
    }

    #[test]
    fn unknown_model_can_be_skipped() {
        let raw = vec![note(99, "orphan"), note(20, "kept")];
        let options = DenormalizeOptions { unknown_model: UnknownModelPolicy::Skip };
        let tables = denormalize(&raw, &context(), &options).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Cloze");
    }

    #[test]
    fn short_rows_leave_trailing_fields_unset() {
        let names = vec!["Front".to_string(), "Back".to_string()];
        let fields = split_fields("only front", &names);

        assert_eq!(fields["Front"], "only front");
        assert!(!fields.contains_key("Back"));
    }
}
