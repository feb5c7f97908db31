//! End-to-end scenarios over the in-memory auth backend and document store.

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::assist::{AssistOutput, AssistRequest};
use crate::auth::{AuthState, MemoryAuth};
use crate::gate::PinOutcome;
use crate::models::{Accomplishment, Collection, DailyNote, Identity, Schedule, UserSettings};
use crate::store::{Fields, MemoryStore, UserPaths};
use crate::{
    DashboardState, Driver, Error, Event, SessionManager, Synchronizer, View, WriteRequest,
};

const APP: &str = "scenario-app";
const EMAIL: &str = "mags@example.com";
const PASSWORD: &str = "secret123";

struct Harness {
    auth: MemoryAuth,
    store: MemoryStore,
    driver: Driver<MemoryAuth, MemoryStore>,
    state: DashboardState,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(fields) => fields,
        _ => unreachable!(),
    }
}

fn schedule(description: &str) -> Schedule {
    Schedule {
        description: description.to_string(),
        date: "2026-10-17".to_string(),
        time: None,
    }
}

impl Harness {
    async fn new() -> Self {
        let auth = MemoryAuth::new();
        let store = MemoryStore::new();
        let session = SessionManager::new(auth.clone());
        let sync = Synchronizer::new(Arc::new(store.clone()), APP, today());
        let mut driver = Driver::new(session, sync);
        let mut state = DashboardState::new(today());
        driver.prime(&mut state).await;
        Self {
            auth,
            store,
            driver,
            state,
        }
    }

    async fn sign_in_new(&mut self, email: &str) -> Identity {
        let identity = self.auth.register(email, PASSWORD).unwrap();
        self.driver.session().sign_in(email, PASSWORD).await.unwrap();
        self.driver.pump(&mut self.state);
        identity
    }

    async fn write(&mut self, request: WriteRequest) {
        self.driver.writer().unwrap().execute(request).await.unwrap();
    }

    fn paths(&self, identity: &Identity) -> UserPaths {
        UserPaths::new(APP, &identity.id).unwrap()
    }
}

#[tokio::test]
async fn starts_signed_out_with_no_listeners() {
    let harness = Harness::new().await;
    assert_eq!(harness.state.auth, AuthState::SignedOut);
    assert_eq!(harness.store.listener_count(), 0);
}

#[tokio::test]
async fn three_schedules_mirror_as_three_and_delete_leaves_two() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;

    for description in ["Standup", "Lunch", "Gym"] {
        harness
            .write(WriteRequest::create(schedule(description)).unwrap())
            .await;
    }
    harness.driver.pump(&mut harness.state);
    assert_eq!(harness.state.mirrors.schedules.len(), 3);

    let id = harness.state.mirrors.schedules[0].id.clone();
    harness
        .write(WriteRequest::delete(Collection::Schedules, id.clone()))
        .await;
    harness.driver.pump(&mut harness.state);
    assert_eq!(harness.state.mirrors.schedules.len(), 2);
    assert!(harness
        .state
        .mirrors
        .schedules
        .iter()
        .all(|record| record.id != id));
}

#[tokio::test]
async fn writes_are_invisible_until_the_snapshot_is_applied() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;

    harness
        .write(WriteRequest::create(schedule("Standup")).unwrap())
        .await;
    assert!(harness.state.mirrors.schedules.is_empty());

    let event = harness.driver.next_event().await;
    assert!(matches!(&event, Event::Data(crate::Change::Schedules(records)) if records.len() == 1));
    harness.driver.apply(event, &mut harness.state);
    assert_eq!(harness.state.mirrors.schedules.len(), 1);
}

#[tokio::test]
async fn sign_out_closes_every_listener_and_clears_mirrors() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;
    assert_eq!(harness.store.listener_count(), 5);
    harness
        .write(WriteRequest::create(schedule("Standup")).unwrap())
        .await;
    harness.driver.pump(&mut harness.state);

    harness.driver.session().sign_out().await.unwrap();
    let event = harness.driver.next_event().await;
    assert_eq!(event, Event::Auth(AuthState::SignedOut));
    harness.driver.apply(event, &mut harness.state);

    assert_eq!(harness.store.listener_count(), 0);
    assert!(harness.state.mirrors.schedules.is_empty());
    assert!(harness.driver.writer().is_err());
}

#[tokio::test]
async fn next_identity_never_sees_previous_records() {
    let mut harness = Harness::new().await;
    let first = harness.sign_in_new(EMAIL).await;
    harness
        .write(WriteRequest::create(schedule("First user's plan")).unwrap())
        .await;

    // Still undelivered when the identity switches.
    let identity = harness.auth.register("other@example.com", PASSWORD).unwrap();
    harness
        .driver
        .session()
        .sign_in("other@example.com", PASSWORD)
        .await
        .unwrap();

    let event = harness.driver.next_event().await;
    assert_eq!(event, Event::Auth(AuthState::SignedIn(identity.clone())));
    harness.driver.apply(event, &mut harness.state);
    harness.driver.pump(&mut harness.state);

    assert!(harness.state.mirrors.schedules.is_empty());
    assert_eq!(harness.store.listener_count(), 5);

    let own = harness.paths(&identity).collection(Collection::Schedules).unwrap();
    let theirs = harness.paths(&first).collection(Collection::Schedules).unwrap();
    assert_ne!(own, theirs);
}

#[tokio::test]
async fn locked_note_unlocks_only_with_matching_pin() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;

    harness
        .write(WriteRequest::save_settings(UserSettings {
            note_pin: Some("1234".to_string()),
            ..UserSettings::default()
        }))
        .await;
    harness
        .write(WriteRequest::save_note(DailyNote {
            content: "surprise party".to_string(),
            is_locked: true,
        }))
        .await;
    harness.driver.pump(&mut harness.state);
    assert_eq!(harness.state.visible_note(), None);

    harness.state.gate.set_pin_input("9999");
    assert_eq!(harness.state.submit_pin(), PinOutcome::Rejected);
    assert_eq!(harness.state.visible_note(), None);

    harness.state.gate.set_pin_input("1234");
    assert_eq!(harness.state.submit_pin(), PinOutcome::Unlocked);
    assert_eq!(harness.state.visible_note(), Some("surprise party"));

    // Edits to a still-locked note keep it readable.
    harness
        .write(WriteRequest::save_note(DailyNote {
            content: "surprise party at 8".to_string(),
            is_locked: true,
        }))
        .await;
    harness.driver.pump(&mut harness.state);
    assert_eq!(harness.state.visible_note(), Some("surprise party at 8"));

    // Unlock, then lock again: the PIN is required once more.
    for is_locked in [false, true] {
        harness
            .write(WriteRequest::save_note(DailyNote {
                content: "surprise party at 8".to_string(),
                is_locked,
            }))
            .await;
        harness.driver.pump(&mut harness.state);
    }
    assert_eq!(harness.state.visible_note(), None);
}

#[tokio::test]
async fn note_without_pin_is_always_visible() {
    let mut harness = Harness::new().await;
    let identity = harness.sign_in_new(EMAIL).await;

    let note_path = harness.paths(&identity).note(today()).unwrap();
    harness.store.put(
        &note_path,
        fields(json!({"content": "open book", "isLocked": true})),
    );
    harness.driver.pump(&mut harness.state);

    assert!(harness.state.mirrors.note.is_locked);
    assert_eq!(harness.state.visible_note(), Some("open book"));
}

#[tokio::test]
async fn absent_note_is_empty_and_unlocked() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;
    assert_eq!(harness.state.mirrors.note, DailyNote::default());
    assert_eq!(harness.state.visible_note(), Some(""));
}

#[tokio::test]
async fn switching_views_never_reaches_the_backend() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;
    harness
        .write(WriteRequest::create(schedule("Standup")).unwrap())
        .await;
    harness.driver.pump(&mut harness.state);

    let operations = harness.store.operation_count();
    let mirrors = harness.state.mirrors.clone();
    for view in View::ALL {
        harness.state.set_view(view);
        assert_eq!(harness.state.view, view);
    }
    harness.driver.pump(&mut harness.state);

    assert_eq!(harness.store.operation_count(), operations);
    assert_eq!(harness.state.mirrors, mirrors);
}

#[tokio::test]
async fn remembered_identity_is_restored_on_prime() {
    let auth = MemoryAuth::new();
    let identity = auth.register(EMAIL, PASSWORD).unwrap();
    auth.remember(identity.clone());

    let store = MemoryStore::new();
    let mut driver = Driver::new(
        SessionManager::new(auth),
        Synchronizer::new(Arc::new(store.clone()), APP, today()),
    );
    let mut state = DashboardState::new(today());
    driver.prime(&mut state).await;

    assert_eq!(state.auth, AuthState::SignedIn(identity));
    assert_eq!(store.listener_count(), 5);
}

#[tokio::test]
async fn mistyped_documents_still_mirror_one_to_one() {
    let mut harness = Harness::new().await;
    let identity = harness.sign_in_new(EMAIL).await;
    let schedules = harness
        .paths(&identity)
        .collection(Collection::Schedules)
        .unwrap();

    harness.store.put(
        &schedules.doc("well-formed").unwrap(),
        fields(json!({"description": "Standup", "date": "2026-10-17", "time": "09:30"})),
    );
    harness.store.put(
        &schedules.doc("numeric-description").unwrap(),
        fields(json!({"description": 42, "date": "2026-10-17"})),
    );
    harness.store.put(
        &schedules.doc("numeric-time").unwrap(),
        fields(json!({"description": "Lunch", "date": "2026-10-17", "time": 930})),
    );
    harness.driver.pump(&mut harness.state);

    let mut mirrored: Vec<_> = harness
        .state
        .mirrors
        .schedules
        .iter()
        .map(|record| {
            (
                record.id.as_str(),
                record.data.description.as_str(),
                record.data.time.as_deref(),
            )
        })
        .collect();
    mirrored.sort_unstable();
    assert_eq!(
        mirrored,
        vec![
            ("numeric-description", "42", None),
            ("numeric-time", "Lunch", None),
            ("well-formed", "Standup", Some("09:30")),
        ]
    );
}

#[tokio::test]
async fn assist_result_of_previous_identity_is_discarded() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;
    let stale = harness.state.assist.begin(AssistRequest::PlanDay).unwrap();

    harness.driver.session().sign_out().await.unwrap();
    harness.driver.pump(&mut harness.state);
    harness.sign_in_new("other@example.com").await;
    let current = harness
        .state
        .assist
        .begin(AssistRequest::CelebrateWins)
        .unwrap();

    harness
        .state
        .assist
        .finish(stale, Ok("Plan for the first user".to_string()));
    assert!(harness.state.assist.loading);
    assert_eq!(harness.state.assist.output, None);

    harness
        .state
        .assist
        .finish(current, Ok("Cheers to you".to_string()));
    assert_eq!(
        harness.state.assist.output,
        Some(AssistOutput::Text("Cheers to you".to_string()))
    );
}

#[tokio::test]
async fn write_issued_by_previous_identity_is_refused() {
    let mut harness = Harness::new().await;
    let first = harness.sign_in_new(EMAIL).await;
    harness.driver.session().sign_out().await.unwrap();
    harness.driver.pump(&mut harness.state);
    let second = harness.sign_in_new("other@example.com").await;

    assert!(matches!(
        harness.driver.writer_for(&first.id),
        Err(Error::IdentityChanged(_))
    ));
    let writer = harness.driver.writer_for(&second.id).unwrap();
    writer
        .execute(WriteRequest::create(schedule("Mine")).unwrap())
        .await
        .unwrap();
    harness.driver.pump(&mut harness.state);
    assert_eq!(harness.state.mirrors.schedules.len(), 1);
    assert_eq!(harness.store.listener_count(), 5);
}

#[tokio::test]
async fn edited_entries_replace_the_originals() {
    let mut harness = Harness::new().await;
    harness.sign_in_new(EMAIL).await;
    harness
        .write(WriteRequest::create(schedule("Standup")).unwrap())
        .await;
    harness
        .write(
            WriteRequest::create(Accomplishment {
                text: "Shipped it".to_string(),
                date: None,
            })
            .unwrap(),
        )
        .await;
    harness.driver.pump(&mut harness.state);
    let schedule_id = harness.state.mirrors.schedules[0].id.clone();
    let win_id = harness.state.mirrors.accomplishments[0].id.clone();

    let edited = Schedule {
        description: "Standup (moved)".to_string(),
        date: "2026-10-18".to_string(),
        time: Some("10:15".to_string()),
    };
    harness
        .write(WriteRequest::replace(schedule_id.clone(), edited.clone()).unwrap())
        .await;
    harness
        .write(
            WriteRequest::replace(
                win_id.clone(),
                Accomplishment {
                    text: "Shipped it on time".to_string(),
                    date: Some("2026-10-17".to_string()),
                },
            )
            .unwrap(),
        )
        .await;
    harness.driver.pump(&mut harness.state);

    assert_eq!(harness.state.mirrors.schedules.len(), 1);
    assert_eq!(harness.state.mirrors.schedules[0].id, schedule_id);
    assert_eq!(harness.state.mirrors.schedules[0].data, edited);
    assert_eq!(harness.state.mirrors.accomplishments.len(), 1);
    assert_eq!(harness.state.mirrors.accomplishments[0].id, win_id);
    assert_eq!(
        harness.state.mirrors.accomplishments[0].data.text,
        "Shipped it on time"
    );
}
