use std::collections::{
    hash_map::Entry,
    HashMap,
    HashSet,
};

use chrono::DateTime;

use crate::{
    core::{
        models::RevlogSummary,
        CardHistory,
        EnrichedReviewEvent,
        LoadContext,
        NoteFacts,
        ReviewEvent,
    },
    notes::split_fields,
};

/// Annotate raw join rows with resolved deck/model names, split note facts,
/// the review date, and the answer time in seconds.
///
/// NULL deck/model references are legitimate here (the join is outer), so
/// they resolve to sentinel strings instead of failing the load.
pub fn enrich(events: Vec<ReviewEvent>, context: &LoadContext) -> Vec<EnrichedReviewEvent> {
    events.into_iter().map(|event| enrich_one(event, context)).collect()
}

fn enrich_one(event: ReviewEvent, context: &LoadContext) -> EnrichedReviewEvent {
    let deck_name = context.deck_name(event.deck_id);
    let model_name = context.model_name(event.model_id);

    let note_facts = match (&event.note_facts_raw, context.model_fields(event.model_id)) {
        (Some(blob), Some(field_names)) => NoteFacts::Fields(split_fields(blob, field_names)),
        _ => NoteFacts::Unknown,
    };

    // revlog.id doubles as the review's millisecond timestamp.
    let date = DateTime::from_timestamp_millis(event.rev_id).unwrap_or(DateTime::UNIX_EPOCH);

    EnrichedReviewEvent {
        rev_id: event.rev_id,
        ease: event.ease,
        interval: event.interval,
        last_interval: event.last_interval,
        time_to_answer: event.time_to_answer_ms as f64 / 1000.0,
        note_sort_key: event.note_sort_key,
        card_id: event.card_id,
        reps: event.reps,
        lapses: event.lapses,
        deck_id: event.deck_id,
        model_id: event.model_id,
        template_num: event.template_num,
        deck_name,
        model_name,
        note_facts,
        date,
    }
}

/// Fold the review stream into per-card histories.
///
/// The stream is walked oldest-first. Rather than re-sorting, the direction
/// of the source query is detected from the first two events' dates and the
/// fold runs forward or backward accordingly.
///
/// A non-empty `deck_filter` drops events from other decks before any
/// accumulation, so filtered-out cards consume no temporal index. The first
/// event seen for a card seeds its history (see [`CardHistory`] for what
/// stays pinned to that event); later events only extend `all_events`.
pub fn reduce(events: &[EnrichedReviewEvent], deck_filter: &HashSet<i64>) -> RevlogSummary {
    // A 0- or 1-event stream has no detectable direction; forward is fine.
    let oldest_first = match (events.first(), events.get(1)) {
        (Some(first), Some(second)) => first.date < second.date,
        _ => true,
    };

    let mut histories: HashMap<i64, CardHistory> = HashMap::new();
    let mut order: Vec<i64> = Vec::new();

    if oldest_first {
        for event in events {
            accumulate(&mut histories, &mut order, deck_filter, event);
        }
    } else {
        for event in events.iter().rev() {
            accumulate(&mut histories, &mut order, deck_filter, event);
        }
    }

    RevlogSummary { histories, order }
}

fn accumulate(
    histories: &mut HashMap<i64, CardHistory>,
    order: &mut Vec<i64>,
    deck_filter: &HashSet<i64>,
    event: &EnrichedReviewEvent,
) {
    if !deck_filter.is_empty() && !event.deck_id.is_some_and(|id| deck_filter.contains(&id)) {
        return;
    }

    // The outer join guarantees a card per review; if one is somehow absent,
    // the review id (unique per row) gives the event its own fresh card.
    let key = event.card_id.unwrap_or(event.rev_id);

    match histories.entry(key) {
        Entry::Occupied(mut history) => {
            history.get_mut().all_events.push(event.clone());
        }
        Entry::Vacant(slot) => {
            let temporal_index = order.len();
            order.push(key);
            slot.insert(CardHistory {
                card_id: key,
                model_id: event.model_id,
                reps: event.reps.unwrap_or(0),
                lapses: event.lapses.unwrap_or(0),
                date_learned: event.date,
                note_facts: event.note_facts.clone(),
                temporal_index,
                all_events: vec![event.clone()],
            });
        }
    }
}

/// Share of graded reviews that were not lapses. Ease 1 is the only failing
/// grade. `reps == 0` has no defined rate and yields NaN; display layers
/// show it as "undefined" rather than anything throwing here.
pub fn pass_rate(reps: i64, lapses: i64) -> f64 {
    if reps == 0 {
        return f64::NAN;
    }
    1.0 - lapses as f64 / reps as f64
}

impl CardHistory {
    pub fn pass_rate(&self) -> f64 {
        pass_rate(self.reps, self.lapses)
    }
}
