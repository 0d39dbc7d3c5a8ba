//! Integration tests for SyncAdapter dispatch and request shaping.


use std::sync::Arc;

use model_sync::{
    Document, DocumentCollection, InMemoryEngine, Outcome, SyncAdapter, SyncError, SyncOptions,
    Target, Verb,
};
use serde_json::{json, Value};
use support::{Note, Notes, RecordingEngine, StorageDown, UnwritableNote};

fn recording(reply: Value) -> (Arc<RecordingEngine>, SyncAdapter<Arc<RecordingEngine>>) {
    let engine = Arc::new(RecordingEngine::replying(reply));
    (engine.clone(), SyncAdapter::new(engine))
}

#[tokio::test]
async fn read_model_calls_find_item_with_identity() {
    let (engine, adapter) = recording(json!({ "id": "42", "title": "hello" }));
    let mut note = Note::new("42", json!({ "title": "x" }));

    let outcome = adapter
        .sync(Verb::Read, Target::Model(&mut note), SyncOptions::new())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Model);
    assert_eq!(
        engine.calls(),
        vec![(
            "findItem",
            json!([{ "profileId": "p1", "storeName": "notes", "idAttribute": "id", "id": "42" }])
        )]
    );
    assert_eq!(note.applied, vec![json!({ "id": "42", "title": "hello" })]);
}

#[tokio::test]
async fn save_sends_serialized_payload_as_data() {
    let (engine, adapter) = recording(json!({ "id": "42", "title": "x", "rev": 2 }));
    let mut note = Note::new("42", json!({ "title": "x" }));

    adapter
        .sync(Verb::Update, Target::Model(&mut note), SyncOptions::new())
        .await
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec![(
            "save",
            json!([{
                "data": { "title": "x" },
                "profileId": "p1",
                "storeName": "notes",
                "idAttribute": "id",
                "id": "42"
            }])
        )]
    );
    assert_eq!(note.applied, vec![json!({ "id": "42", "title": "x", "rev": 2 })]);
}

#[tokio::test]
async fn read_routes_on_identifying_field() {
    let (engine, adapter) = recording(json!([]));

    let mut notes = Notes::default();
    adapter
        .sync(Verb::Read, Target::Collection(&mut notes), SyncOptions::new())
        .await
        .unwrap();

    let mut note = Note::new("1", json!({}));
    let _ = adapter
        .sync(Verb::Read, Target::Model(&mut note), SyncOptions::new())
        .await;

    let operations: Vec<_> = engine.calls().into_iter().map(|(op, _)| op).collect();
    assert_eq!(operations, vec!["find", "findItem"]);
}

#[tokio::test]
async fn find_item_rejects_every_falsy_payload() {
    for falsy in [Value::Null, json!(false), json!(0), json!(0.0), json!("")] {
        let (_, adapter) = recording(falsy.clone());
        let mut note = Note::new("42", json!({ "title": "x" }));

        let err = adapter
            .sync(Verb::Read, Target::Model(&mut note), SyncOptions::new())
            .await
            .unwrap_err();

        assert!(err.is_not_found(), "{} should be not-found", falsy);
        assert!(note.applied.is_empty());
    }
}

#[tokio::test]
async fn find_item_accepts_empty_object() {
    let (_, adapter) = recording(json!({}));
    let mut note = Note::new("42", json!({}));

    adapter
        .sync(Verb::Read, Target::Model(&mut note), SyncOptions::new())
        .await
        .unwrap();
    assert_eq!(note.applied, vec![json!({})]);
}

#[tokio::test]
async fn find_adds_records_in_engine_order() {
    let records = json!([{ "id": 3 }, { "id": 1 }, { "id": 2 }]);
    let (_, adapter) = recording(records.clone());
    let mut notes = Notes::default();

    let outcome = adapter
        .sync(Verb::Read, Target::Collection(&mut notes), SyncOptions::new())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Collection { added: 3 });
    assert_eq!(Value::Array(notes.records), records);
}

#[tokio::test]
async fn find_with_no_records_leaves_collection_alone() {
    for empty in [json!([]), Value::Null] {
        let (_, adapter) = recording(empty);
        let mut notes = Notes::default();

        let outcome = adapter
            .sync(Verb::Read, Target::Collection(&mut notes), SyncOptions::new())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Collection { added: 0 });
        assert_eq!(notes.add_calls, 0);
    }
}

#[tokio::test]
async fn find_rejects_non_array_reply() {
    let (_, adapter) = recording(json!({ "id": 1 }));
    let mut notes = Notes::default();

    let err = adapter
        .sync(Verb::Read, Target::Collection(&mut notes), SyncOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::UnexpectedPayload { operation: "find", .. }));
}

#[tokio::test]
async fn save_create_and_update_are_identical() {
    let mut seen = Vec::new();

    for verb in [Verb::Create, Verb::Update] {
        let (engine, adapter) = recording(json!({ "id": "42" }));
        let mut note = Note::new("42", json!({ "title": "x" }));
        let outcome = adapter
            .sync(verb, Target::Model(&mut note), SyncOptions::new())
            .await
            .unwrap();
        seen.push((engine.calls(), outcome, note));
    }

    let (engine, adapter) = recording(json!({ "id": "42" }));
    let mut note = Note::new("42", json!({ "title": "x" }));
    let mut source = Document::new("p1", "notes").with("id", "42");
    let options =
        model_sync::RequestOptions::build(&Target::Model(&mut source), SyncOptions::new())
            .unwrap();
    let outcome = adapter.save(&mut note, options).await.unwrap();
    seen.push((engine.calls(), outcome, note));

    assert_eq!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);
}

#[tokio::test]
async fn delete_passes_payload_and_returns_reply_verbatim() {
    let (engine, adapter) = recording(json!({ "deleted": 1 }));
    let mut note = Note::new("42", json!({ "title": "x" }));

    let outcome = adapter
        .sync(Verb::Delete, Target::Model(&mut note), SyncOptions::new())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Removed(json!({ "deleted": 1 })));
    assert_eq!(
        engine.calls(),
        vec![(
            "removeItem",
            json!([{
                "data": { "title": "x" },
                "profileId": "p1",
                "storeName": "notes",
                "idAttribute": "id",
                "id": "42"
            }])
        )]
    );
    assert!(note.applied.is_empty());
}

#[tokio::test]
async fn serialization_failure_stops_writes_before_the_engine() {
    let (engine, adapter) = recording(json!({ "id": "42" }));
    let mut note = UnwritableNote {
        inner: Note::new("42", json!({ "title": "x" })),
    };

    for verb in [Verb::Create, Verb::Update, Verb::Delete] {
        let err = adapter
            .sync(verb, Target::Model(&mut note), SyncOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnexpectedPayload { operation: "serialize", .. }
        ));
    }

    assert!(engine.calls().is_empty());
    assert!(note.inner.applied.is_empty());
}

#[tokio::test]
async fn engine_failures_pass_through_unchanged() {
    let engine = Arc::new(RecordingEngine::failing("disk"));
    let adapter = SyncAdapter::new(engine.clone());
    let mut note = Note::new("42", json!({ "title": "x" }));

    for verb in Verb::ALL {
        let err = adapter
            .sync(verb, Target::Model(&mut note), SyncOptions::new())
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "storage unavailable: disk");
        assert_eq!(
            err.engine_error().and_then(|e| e.downcast_ref::<StorageDown>()),
            Some(&StorageDown("disk".into()))
        );
    }

    assert_eq!(engine.calls().len(), 4);
    assert!(note.applied.is_empty());
}

#[tokio::test]
async fn only_conditions_reach_the_engine() {
    let (engine, adapter) = recording(json!([]));
    let mut notes = Notes::default();

    let options = SyncOptions::from_value(&json!({
        "conditions": { "tag": "work" },
        "storeName": "other",
        "idAttribute": "key",
        "data": { "leak": true },
        "parse": true,
    }));
    adapter
        .sync(Verb::Read, Target::Collection(&mut notes), options)
        .await
        .unwrap();

    assert_eq!(
        engine.calls(),
        vec![(
            "find",
            json!([{ "conditions": { "tag": "work" }, "profileId": "p1", "storeName": "notes" }])
        )]
    );
}

#[tokio::test]
async fn unsupported_verb_never_reaches_the_engine() {
    let (engine, adapter) = recording(json!({}));
    let mut note = Note::new("42", json!({}));

    for name in ["patch", "destroy", "Read"] {
        let err = adapter
            .sync_named(name, Target::Model(&mut note), SyncOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedVerb(_)));
    }

    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn each_call_builds_its_own_options() {
    let (engine, adapter) = recording(json!({ "ok": true }));
    let mut first = Note::new("1", json!({ "title": "a" }));
    let mut second = Note::new("2", json!({ "title": "b" }));

    let (a, b) = tokio::join!(
        adapter.sync(Verb::Update, Target::Model(&mut first), SyncOptions::new()),
        adapter.sync(Verb::Update, Target::Model(&mut second), SyncOptions::new()),
    );
    a.unwrap();
    b.unwrap();

    let mut ids: Vec<_> = engine
        .calls()
        .into_iter()
        .map(|(_, args)| (args[0]["id"].clone(), args[0]["data"]["title"].clone()))
        .collect();
    ids.sort_by_key(|(id, _)| id.to_string());
    assert_eq!(ids, vec![(json!("1"), json!("a")), (json!("2"), json!("b"))]);
}

#[tokio::test]
async fn concurrent_writes_share_one_engine() {
    let engine = InMemoryEngine::new();
    let adapter = Arc::new(SyncAdapter::new(engine.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let adapter = adapter.clone();
            tokio::spawn(async move {
                let mut note = Document::new("p1", "notes").with("title", format!("note-{}", i));
                let outcome = adapter
                    .sync(Verb::Create, Target::Model(&mut note), SyncOptions::new())
                    .await;
                outcome.map(|_| note)
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut notes = DocumentCollection::new("p1", "notes");
    adapter
        .sync(Verb::Read, Target::Collection(&mut notes), SyncOptions::new())
        .await
        .unwrap();
    assert_eq!(notes.len(), 8);
    assert_eq!(engine.records("p1", "notes").unwrap().len(), 8);
}
