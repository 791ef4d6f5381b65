pub mod archive;

pub mod collection;

pub mod core;

pub mod export;

pub mod media;

pub mod notes;

pub mod patches;

pub mod revlog;

pub mod schema;

#[cfg(test)]
mod revlog_tests;

pub use crate::core::{
    pipeline::{
        load_apkg,
        load_reviews,
        load_reviews_from_apkg,
        ApkgOptions,
    },
    AnkipeekError,
};
