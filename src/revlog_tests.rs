use std::collections::{
    HashMap,
    HashSet,
};

use chrono::DateTime;

use crate::{
    core::{
        EnrichedReviewEvent,
        LoadContext,
        Model,
        NoteFacts,
        ReviewEvent,
    },
    revlog::{
        enrich,
        pass_rate,
        reduce,
    },
};

fn event(card_id: i64, deck_id: i64, millis: i64) -> EnrichedReviewEvent {
    EnrichedReviewEvent {
        rev_id: millis,
        ease: 3,
        interval: 1,
        last_interval: 0,
        time_to_answer: 4.2,
        note_sort_key: None,
        card_id: Some(card_id),
        reps: Some(5),
        lapses: Some(1),
        deck_id: Some(deck_id),
        model_id: Some(10),
        template_num: Some(0),
        deck_name: "Default".to_string(),
        model_name: "Basic".to_string(),
        note_facts: NoteFacts::Unknown,
        date: DateTime::from_timestamp_millis(millis).unwrap(),
    }
}

fn raw_event(millis: i64) -> ReviewEvent {
    ReviewEvent {
        rev_id: millis,
        ease: 3,
        interval: 1,
        last_interval: 0,
        time_to_answer_ms: 3500,
        note_facts_raw: None,
        note_sort_key: None,
        card_id: Some(1),
        reps: Some(1),
        lapses: Some(0),
        deck_id: None,
        model_id: None,
        template_num: None,
    }
}

fn empty_context() -> LoadContext {
    LoadContext { models: HashMap::new(), decks: HashMap::new() }
}

#[test]
fn ascending_stream_assigns_first_seen_indexes() {
    let events = vec![event(1, 7, 1000), event(2, 7, 2000), event(1, 7, 3000)];
    let summary = reduce(&events, &HashSet::new());

    assert_eq!(summary.order, vec![1, 2]);
    assert_eq!(summary.histories[&1].temporal_index, 0);
    assert_eq!(summary.histories[&1].all_events.len(), 2);
    assert_eq!(summary.histories[&2].temporal_index, 1);
    assert_eq!(summary.histories[&2].all_events.len(), 1);
}

#[test]
fn descending_stream_is_folded_backwards() {
    // Same stream as above, newest first; results must be identical.
    let events = vec![event(1, 7, 3000), event(2, 7, 2000), event(1, 7, 1000)];
    let summary = reduce(&events, &HashSet::new());

    assert_eq!(summary.order, vec![1, 2]);
    assert_eq!(summary.histories[&1].all_events.len(), 2);
    assert_eq!(summary.histories[&1].date_learned, DateTime::from_timestamp_millis(1000).unwrap());
}

#[test]
fn temporal_indexes_are_contiguous_from_zero() {
    let events: Vec<_> = (0..50).map(|i| event(i % 7, 1, 1000 + i * 10)).collect();
    let summary = reduce(&events, &HashSet::new());

    let mut indexes: Vec<usize> =
        summary.histories.values().map(|history| history.temporal_index).collect();
    indexes.sort();
    assert_eq!(indexes, (0..summary.order.len()).collect::<Vec<_>>());

    for (index, card_id) in summary.order.iter().enumerate() {
        assert_eq!(summary.histories[card_id].temporal_index, index);
    }
}

#[test]
fn deck_filter_drops_events_before_indexing() {
    let events = vec![event(1, 7, 1000), event(2, 8, 2000), event(1, 7, 3000)];
    let filter: HashSet<i64> = [7].into_iter().collect();
    let summary = reduce(&events, &filter);

    assert_eq!(summary.order, vec![1]);
    assert!(!summary.histories.contains_key(&2));
    assert_eq!(summary.histories[&1].all_events.len(), 2);
}

#[test]
fn empty_filter_keeps_everything() {
    let events = vec![event(1, 7, 1000), event(2, 8, 2000)];
    let summary = reduce(&events, &HashSet::new());
    assert_eq!(summary.order.len(), 2);
}

#[test]
fn reduce_is_idempotent() {
    let events = vec![event(1, 7, 1000), event(2, 7, 2000), event(1, 7, 3000)];
    let filter: HashSet<i64> = [7].into_iter().collect();

    let first = reduce(&events, &filter);
    let second = reduce(&events, &filter);

    assert_eq!(first.order, second.order);
    assert_eq!(first.histories.len(), second.histories.len());
    for (card_id, history) in &first.histories {
        let other = &second.histories[card_id];
        assert_eq!(history.temporal_index, other.temporal_index);
        assert_eq!(history.all_events.len(), other.all_events.len());
    }
}

#[test]
fn aggregates_stay_pinned_to_the_first_seen_event() {
    let mut later = event(1, 7, 2000);
    later.reps = Some(99);
    later.lapses = Some(42);

    let events = vec![event(1, 7, 1000), later];
    let summary = reduce(&events, &HashSet::new());

    let history = &summary.histories[&1];
    assert_eq!(history.reps, 5);
    assert_eq!(history.lapses, 1);
    assert_eq!(history.date_learned, DateTime::from_timestamp_millis(1000).unwrap());
}

#[test]
fn missing_card_id_becomes_its_own_entry() {
    let mut orphan = event(0, 7, 5000);
    orphan.card_id = None;

    let events = vec![event(1, 7, 1000), orphan];
    let summary = reduce(&events, &HashSet::new());

    assert_eq!(summary.order, vec![1, 5000]);
    assert_eq!(summary.histories[&5000].all_events.len(), 1);
}

#[test]
fn single_event_stream_reduces_without_panicking() {
    let events = vec![event(1, 7, 1000)];
    let summary = reduce(&events, &HashSet::new());
    assert_eq!(summary.order, vec![1]);
}

#[test]
fn empty_stream_reduces_to_nothing() {
    let summary = reduce(&[], &HashSet::new());
    assert!(summary.order.is_empty());
    assert!(summary.histories.is_empty());
}

#[test]
fn time_to_answer_converts_milliseconds_to_seconds() {
    let enriched = enrich(vec![raw_event(1000)], &empty_context());
    assert_eq!(enriched[0].time_to_answer, 3.5);
}

#[test]
fn null_deck_and_model_resolve_to_sentinels() {
    let enriched = enrich(vec![raw_event(1000)], &empty_context());
    assert_eq!(enriched[0].deck_name, "unknown deck");
    assert_eq!(enriched[0].model_name, "unknown model");
    assert_eq!(enriched[0].note_facts, NoteFacts::Unknown);
}

#[test]
fn resolvable_references_split_note_facts() {
    let mut context = empty_context();
    context.models.insert(
        10,
        Model {
            id: 10,
            name: "Basic".to_string(),
            fields: vec!["Front".to_string(), "Back".to_string()],
        },
    );

    let mut raw = raw_event(1000);
    raw.model_id = Some(10);
    raw.note_facts_raw = Some("f\u{1f}b".to_string());

    let enriched = enrich(vec![raw], &context);
    assert_eq!(enriched[0].model_name, "Basic");
    assert_eq!(enriched[0].note_facts.get("Front"), Some("f"));
    assert_eq!(enriched[0].note_facts.get("Back"), Some("b"));
}

#[test]
fn review_id_is_the_review_date() {
    let enriched = enrich(vec![raw_event(1_417_180_000_000)], &empty_context());
    assert_eq!(enriched[0].date.timestamp_millis(), 1_417_180_000_000);
}

#[test]
fn pass_rate_follows_the_lapse_convention() {
    assert_eq!(pass_rate(10, 2), 0.8);
    assert_eq!(pass_rate(4, 0), 1.0);
    assert!(pass_rate(0, 0).is_nan());
}
