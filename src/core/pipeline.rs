use std::time::Instant;

use log::info;

use super::{
    models::{
        ApkgTables,
        DenormalizeOptions,
        EnrichedReviewEvent,
        LoadContext,
        RevlogOptions,
    },
    AnkipeekError,
};
use crate::{
    archive::ApkgArchive,
    collection::Collection,
    media::MediaMap,
    notes::denormalize,
    revlog::enrich,
    schema::resolve_context,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApkgOptions {
    /// Parse the media index so images can be resolved later. Off by default
    /// since most loads never touch media.
    pub load_media: bool,
    pub denormalize: DenormalizeOptions,
}

/// Full deck-browser pipeline: unzip, open the embedded collection, resolve
/// schema metadata, and denormalize every note against its model.
///
/// Archive, database, and schema failures abort the load; no partial tables
/// are returned.
pub fn load_apkg(bytes: Vec<u8>, options: &ApkgOptions) -> Result<ApkgTables, AnkipeekError> {
    let start = Instant::now();

    let mut archive = ApkgArchive::open(bytes)?;
    let sqlite_bytes = archive.collection_bytes()?;
    let collection = Collection::open(&sqlite_bytes)?;

    let (models_json, decks_json) = collection.schema_json()?;
    let context = resolve_context(&models_json, &decks_json)?;

    let raw_notes = collection.raw_notes()?;
    let tables = denormalize(&raw_notes, &context, &options.denormalize)?;

    let media = if options.load_media { MediaMap::load(&mut archive)? } else { None };

    info!(
        "Loaded {} note tables ({} notes) in {:.2}s",
        tables.len(),
        tables.iter().map(|t| t.notes.len()).sum::<usize>(),
        start.elapsed().as_secs_f32()
    );

    Ok(ApkgTables { context, tables, media })
}

/// Review-browser pipeline over a bare collection image: resolve schema,
/// run the revlog join, and annotate every event.
pub fn load_reviews(
    sqlite_bytes: &[u8],
    options: &RevlogOptions,
) -> Result<(LoadContext, Vec<EnrichedReviewEvent>), AnkipeekError> {
    let start = Instant::now();

    let collection = Collection::open(sqlite_bytes)?;
    let (models_json, decks_json) = collection.schema_json()?;
    let context = resolve_context(&models_json, &decks_json)?;

    let events = collection.review_events(options)?;
    let enriched = enrich(events, &context);

    info!("Loaded {} reviews in {:.2}s", enriched.len(), start.elapsed().as_secs_f32());

    Ok((context, enriched))
}

/// Same as [`load_reviews`] but starting from `.apkg` bytes.
pub fn load_reviews_from_apkg(
    bytes: Vec<u8>,
    options: &RevlogOptions,
) -> Result<(LoadContext, Vec<EnrichedReviewEvent>), AnkipeekError> {
    let mut archive = ApkgArchive::open(bytes)?;
    let sqlite_bytes = archive.collection_bytes()?;
    load_reviews(&sqlite_bytes, options)
}
