use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use crate::core::{
    AnkipeekError,
    Deck,
    LoadContext,
    Model,
};

// The col table stores models and decks as JSON objects keyed by the
// stringified integer id. Only the fields the pipeline consumes are
// deserialized; everything else in Anki's schema blobs is ignored.

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    name: String,
    flds: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawDeck {
    name: String,
}

/// Parse the `col.models` JSON document into models keyed by integer id.
/// Field names keep their declaration order: position in `fields` matches
/// position in every note's separator-split value list.
pub fn resolve_models(json: &str) -> Result<HashMap<i64, Model>, AnkipeekError> {
    let raw: HashMap<String, RawModel> = serde_json::from_str(json)?;

    raw.into_iter()
        .map(|(key, model)| {
            let id = parse_id(&key, "model")?;
            let fields = model.flds.into_iter().map(|f| f.name).collect();
            Ok((id, Model { id, name: model.name, fields }))
        })
        .collect()
}

/// Parse the `col.decks` JSON document into decks keyed by integer id.
pub fn resolve_decks(json: &str) -> Result<HashMap<i64, Deck>, AnkipeekError> {
    let raw: HashMap<String, RawDeck> = serde_json::from_str(json)?;

    raw.into_iter()
        .map(|(key, deck)| {
            let id = parse_id(&key, "deck")?;
            Ok((id, Deck { id, name: deck.name }))
        })
        .collect()
}

/// Resolve both schema documents into one immutable snapshot for the load.
pub fn resolve_context(
    models_json: &str,
    decks_json: &str,
) -> Result<LoadContext, AnkipeekError> {
    let models = resolve_models(models_json)?;
    let decks = resolve_decks(decks_json)?;
    debug!("Resolved {} models, {} decks", models.len(), decks.len());
    Ok(LoadContext { models, decks })
}

fn parse_id(key: &str, kind: &str) -> Result<i64, AnkipeekError> {
    key.parse::<i64>()
        .map_err(|_| AnkipeekError::SchemaParse(format!("non-numeric {kind} id key '{key}'")))
}
