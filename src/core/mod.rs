pub mod errors;
pub mod http;
pub mod models;
pub mod pipeline;

pub use errors::AnkipeekError;
pub use models::{
    CardHistory,
    Deck,
    DenormalizedNote,
    EnrichedReviewEvent,
    LoadContext,
    Model,
    NoteFacts,
    RawNote,
    ReviewEvent,
    RevlogSummary,
};
