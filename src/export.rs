use std::borrow::Cow;

use crate::core::{
    DenormalizedNote,
    EnrichedReviewEvent,
};

/// Column order of the review CSV. Fixed: downstream spreadsheets key on it.
pub const REVIEW_CSV_COLUMNS: &[&str] = &[
    "dateString",
    "ease",
    "interval",
    "lastInterval",
    "timeToAnswer",
    "noteSortKeyFact",
    "deckName",
    "modelName",
    "lapses",
    "reps",
    "cardId",
    "noteFactsJSON",
];

/// Flat CSV text for one model's denormalized notes: the model's field names
/// as the header, one row per note in field order.
pub fn notes_to_csv(table: &DenormalizedNote) -> String {
    let mut out = String::new();
    push_row(&mut out, table.field_names.iter().map(String::as_str));

    for note in &table.notes {
        push_row(
            &mut out,
            table.field_names.iter().map(|name| note.get(name).map_or("", String::as_str)),
        );
    }

    out
}

/// Flat CSV text for the enriched review stream in [`REVIEW_CSV_COLUMNS`]
/// order. Note facts are serialized as a JSON object in the last column.
pub fn reviews_to_csv(reviews: &[EnrichedReviewEvent]) -> String {
    let mut out = String::new();
    push_row(&mut out, REVIEW_CSV_COLUMNS.iter().copied());

    for review in reviews {
        let fields = [
            review.date.to_rfc3339(),
            review.ease.to_string(),
            review.interval.to_string(),
            review.last_interval.to_string(),
            review.time_to_answer.to_string(),
            review.note_sort_key.clone().unwrap_or_default(),
            review.deck_name.clone(),
            review.model_name.clone(),
            format_nullable(review.lapses),
            format_nullable(review.reps),
            format_nullable(review.card_id),
            review.note_facts.to_json(),
        ];
        push_row(&mut out, fields.iter().map(String::as_str));
    }

    out
}

fn format_nullable(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape(field));
        first = false;
    }
    out.push('\n');
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
