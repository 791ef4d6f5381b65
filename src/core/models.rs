use std::collections::HashMap;

use chrono::{
    DateTime,
    Utc,
};

/// Byte that Anki uses to join a note's field values into one blob.
pub const ANKI_SEPARATOR: char = '\u{1f}';

pub const UNKNOWN_DECK: &str = "unknown deck";
pub const UNKNOWN_MODEL: &str = "unknown model";
pub const UNKNOWN_NOTE_FACTS: &str = "unknown note facts";

/// A note type: the ordered field schema shared by a group of notes.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>, // declaration order parallels the 0x1F-split value order
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub id: i64,
    pub name: String,
}

/// Immutable snapshot of one collection's schema metadata. Built once per
/// load and passed explicitly to the denormalizer and reducer, never mutated
/// after publication.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub models: HashMap<i64, Model>,
    pub decks: HashMap<i64, Deck>,
}

impl LoadContext {
    pub fn deck_name(&self, deck_id: Option<i64>) -> String {
        deck_id
            .and_then(|id| self.decks.get(&id))
            .map(|deck| deck.name.clone())
            .unwrap_or_else(|| UNKNOWN_DECK.to_string())
    }

    pub fn model_name(&self, model_id: Option<i64>) -> String {
        model_id
            .and_then(|id| self.models.get(&id))
            .map(|model| model.name.clone())
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string())
    }

    pub fn model_fields(&self, model_id: Option<i64>) -> Option<&[String]> {
        model_id.and_then(|id| self.models.get(&id)).map(|model| model.fields.as_slice())
    }
}

/// Raw `(mid, flds)` row from the notes table.
#[derive(Debug, Clone)]
pub struct RawNote {
    pub model_id: i64,
    pub fields_blob: String,
}

/// All notes of one model, with the field blob split into named values.
#[derive(Debug, Clone)]
pub struct DenormalizedNote {
    pub name: String,
    pub field_names: Vec<String>,
    pub notes: Vec<HashMap<String, String>>,
}

/// Artifacts of one `.apkg` load, handed to the view layer as a unit.
#[derive(Debug, Clone)]
pub struct ApkgTables {
    pub context: LoadContext,
    pub tables: Vec<DenormalizedNote>,
    pub media: Option<crate::media::MediaMap>,
}

/// One row of the revlog join, as it comes out of SQL. Card/note/deck columns
/// are nullable because the join is a LEFT OUTER JOIN.
#[derive(Debug, Clone)]
pub struct ReviewEvent {
    pub rev_id: i64, // revlog.id doubles as a millisecond timestamp
    pub ease: i64,
    pub interval: i64,
    pub last_interval: i64,
    pub time_to_answer_ms: i64,
    pub note_facts_raw: Option<String>,
    pub note_sort_key: Option<String>,
    pub card_id: Option<i64>,
    pub reps: Option<i64>,
    pub lapses: Option<i64>,
    pub deck_id: Option<i64>,
    pub model_id: Option<i64>,
    pub template_num: Option<i64>,
}

/// Field values for a review's note, or a sentinel when the note or its
/// model could not be resolved through the outer join.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteFacts {
    Fields(HashMap<String, String>),
    Unknown,
}

impl NoteFacts {
    pub fn get(&self, field_name: &str) -> Option<&str> {
        match self {
            NoteFacts::Fields(fields) => fields.get(field_name).map(String::as_str),
            NoteFacts::Unknown => None,
        }
    }

    /// JSON rendering used by the CSV projection.
    pub fn to_json(&self) -> String {
        match self {
            NoteFacts::Fields(fields) => serde_json::to_string(fields)
                .unwrap_or_else(|_| UNKNOWN_NOTE_FACTS.to_string()),
            NoteFacts::Unknown => UNKNOWN_NOTE_FACTS.to_string(),
        }
    }
}

/// A [`ReviewEvent`] annotated with resolved names, split note facts, the
/// review date, and the answer time in seconds.
#[derive(Debug, Clone)]
pub struct EnrichedReviewEvent {
    pub rev_id: i64,
    pub ease: i64, // 1 = failure, anything else = graded success
    pub interval: i64,
    pub last_interval: i64,
    pub time_to_answer: f64, // seconds
    pub note_sort_key: Option<String>,
    pub card_id: Option<i64>,
    pub reps: Option<i64>,
    pub lapses: Option<i64>,
    pub deck_id: Option<i64>,
    pub model_id: Option<i64>,
    pub template_num: Option<i64>,
    pub deck_name: String,
    pub model_name: String,
    pub note_facts: NoteFacts,
    pub date: DateTime<Utc>,
}

/// Everything known about one card after folding the review stream.
///
/// `reps`, `lapses`, `date_learned` and `note_facts` are pinned to the
/// first event seen for the card in traversal order; later events are only
/// appended to `all_events`, never reconciled back into these fields.
#[derive(Debug, Clone)]
pub struct CardHistory {
    pub card_id: i64,
    pub model_id: Option<i64>,
    pub reps: i64,
    pub lapses: i64,
    pub date_learned: DateTime<Utc>,
    pub note_facts: NoteFacts,
    pub temporal_index: usize,
    pub all_events: Vec<EnrichedReviewEvent>,
}

/// Output of one reduction pass: card histories keyed by card id plus the
/// parallel `temporal_index -> card_id` sequence for reverse lookup.
#[derive(Debug, Clone)]
pub struct RevlogSummary {
    pub histories: HashMap<i64, CardHistory>,
    pub order: Vec<i64>,
}

/// Caller-supplied shape of the revlog query.
#[derive(Debug, Clone, Copy)]
pub struct RevlogOptions {
    pub limit: Option<u32>,
    pub recent: bool,
}

impl Default for RevlogOptions {
    fn default() -> Self {
        RevlogOptions { limit: Some(100), recent: true }
    }
}

/// What to do with notes whose model id is absent from the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownModelPolicy {
    /// Abort the load. Matches the historical behavior.
    #[default]
    Fail,
    /// Drop just the offending notes and keep going.
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DenormalizeOptions {
    pub unknown_model: UnknownModelPolicy,
}
