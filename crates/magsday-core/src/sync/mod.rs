//! Live mirrors of one identity's data.
//!
//! The [`Synchronizer`] owns the five backend subscriptions of the signed-in
//! identity. Snapshots are surfaced as [`Change`] values and applied by the
//! caller; nothing here mutates mirrors on its own.

mod write;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::auth::AuthState;
use crate::error::Result;
use crate::models::{
    Accomplishment, Collection, DailyNote, Entity, Identity, Payment, Record, Schedule,
    UserSettings,
};
use crate::store::{
    CollectionSnapshot, DocumentSnapshot, DocumentStore, Subscription, UserPaths,
};

pub use write::{WriteRequest, Writer};

/// A full replacement for one mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Schedules(Vec<Record<Schedule>>),
    Payments(Vec<Record<Payment>>),
    Accomplishments(Vec<Record<Accomplishment>>),
    Note(DailyNote),
    Settings(UserSettings),
}

/// Subscriptions opened for one identity. Dropping the scope closes them all.
struct Scope {
    identity: Identity,
    paths: UserPaths,
    schedules: Subscription<CollectionSnapshot>,
    payments: Subscription<CollectionSnapshot>,
    accomplishments: Subscription<CollectionSnapshot>,
    note: Subscription<DocumentSnapshot>,
    settings: Subscription<DocumentSnapshot>,
}

impl Scope {
    fn open<S: DocumentStore>(
        store: &S,
        app_id: &str,
        identity: &Identity,
        today: NaiveDate,
    ) -> Result<Self> {
        let paths = UserPaths::new(app_id, &identity.id)?;
        Ok(Self {
            schedules: store.listen_collection(&paths.collection(Collection::Schedules)?)?,
            payments: store.listen_collection(&paths.collection(Collection::Payments)?)?,
            accomplishments: store
                .listen_collection(&paths.collection(Collection::Accomplishments)?)?,
            note: store.listen_document(&paths.note(today)?)?,
            settings: store.listen_document(&paths.settings()?)?,
            identity: identity.clone(),
            paths,
        })
    }

    fn drain(&mut self, changes: &mut Vec<Change>) {
        while let Some(snapshot) = self.schedules.try_next() {
            changes.push(Change::Schedules(decode_records(&snapshot)));
        }
        while let Some(snapshot) = self.payments.try_next() {
            changes.push(Change::Payments(decode_records(&snapshot)));
        }
        while let Some(snapshot) = self.accomplishments.try_next() {
            changes.push(Change::Accomplishments(decode_records(&snapshot)));
        }
        while let Some(snapshot) = self.note.try_next() {
            changes.push(Change::Note(DailyNote::from_snapshot(&snapshot)));
        }
        while let Some(snapshot) = self.settings.try_next() {
            changes.push(Change::Settings(UserSettings::from_snapshot(&snapshot)));
        }
    }

    async fn next_change(&mut self) -> Change {
        let Self {
            schedules,
            payments,
            accomplishments,
            note,
            settings,
            ..
        } = self;

        tokio::select! {
            Some(snapshot) = schedules.next() => Change::Schedules(decode_records(&snapshot)),
            Some(snapshot) = payments.next() => Change::Payments(decode_records(&snapshot)),
            Some(snapshot) = accomplishments.next() => {
                Change::Accomplishments(decode_records(&snapshot))
            }
            Some(snapshot) = note.next() => Change::Note(DailyNote::from_snapshot(&snapshot)),
            Some(snapshot) = settings.next() => {
                Change::Settings(UserSettings::from_snapshot(&snapshot))
            }
            else => std::future::pending().await,
        }
    }
}

fn decode_records<T: Entity>(snapshot: &CollectionSnapshot) -> Vec<Record<T>> {
    snapshot
        .documents
        .iter()
        .map(Record::from_document)
        .collect()
}

/// Keeps exactly one identity's subscriptions open at a time.
pub struct Synchronizer<S> {
    store: Arc<S>,
    app_id: String,
    today: NaiveDate,
    scope: Option<Scope>,
}

impl<S: DocumentStore> Synchronizer<S> {
    /// `today` selects the daily note and stays fixed for the synchronizer's lifetime.
    pub fn new(store: Arc<S>, app_id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            store,
            app_id: app_id.into(),
            today,
            scope: None,
        }
    }

    pub fn with_local_today(store: Arc<S>, app_id: impl Into<String>) -> Self {
        Self::new(store, app_id, chrono::Local::now().date_naive())
    }

    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.scope.as_ref().map(|scope| &scope.identity)
    }

    /// Open subscriptions for `identity`, closing any previous identity's first.
    pub fn attach(&mut self, identity: &Identity) -> Result<()> {
        if self.identity() == Some(identity) {
            return Ok(());
        }
        self.detach();

        tracing::debug!("Opening subscriptions for {}", identity.id);
        self.scope = Some(Scope::open(
            self.store.as_ref(),
            &self.app_id,
            identity,
            self.today,
        )?);
        Ok(())
    }

    /// Close every subscription and discard snapshots not yet delivered.
    pub fn detach(&mut self) -> bool {
        match self.scope.take() {
            Some(scope) => {
                tracing::debug!("Closing subscriptions for {}", scope.identity.id);
                true
            }
            None => false,
        }
    }

    /// Attach or detach to match an identity transition. Returns whether the
    /// subscription set changed.
    pub fn follow(&mut self, state: &AuthState) -> Result<bool> {
        match state.identity() {
            Some(identity) if self.identity() == Some(identity) => Ok(false),
            Some(identity) => {
                self.attach(identity)?;
                Ok(true)
            }
            None => Ok(self.detach()),
        }
    }

    /// Snapshots that have already arrived, in per-subscription order.
    pub fn drain(&mut self) -> Vec<Change> {
        let mut changes = Vec::new();
        if let Some(scope) = self.scope.as_mut() {
            scope.drain(&mut changes);
        }
        changes
    }

    /// Wait for the next snapshot from any subscription. Pends forever while detached.
    pub async fn next_change(&mut self) -> Change {
        match self.scope.as_mut() {
            Some(scope) => scope.next_change().await,
            None => std::future::pending().await,
        }
    }

    /// Write handle bound to the current identity's paths.
    pub fn writer(&self) -> Result<Writer<S>> {
        let scope = self.scope.as_ref().ok_or(crate::Error::NotSignedIn)?;
        Ok(Writer::new(
            Arc::clone(&self.store),
            scope.paths.clone(),
            self.today,
        ))
    }

    /// Write handle for `uid`, refused once a different identity is attached.
    pub fn writer_for(&self, uid: &str) -> Result<Writer<S>> {
        match self.identity() {
            Some(identity) if identity.id == uid => self.writer(),
            Some(_) => Err(crate::Error::IdentityChanged(uid.to_string())),
            None => Err(crate::Error::NotSignedIn),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::store::{Fields, MemoryStore};
    use crate::Error;

    const APP: &str = "test-app";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    fn synchronizer() -> (MemoryStore, Synchronizer<MemoryStore>) {
        let store = MemoryStore::new();
        let sync = Synchronizer::new(Arc::new(store.clone()), APP, today());
        (store, sync)
    }

    #[test]
    fn attach_opens_five_listeners_and_initial_snapshots() {
        let (store, mut sync) = synchronizer();
        sync.attach(&Identity::new("u1", None)).unwrap();
        assert_eq!(store.listener_count(), 5);

        let changes = sync.drain();
        assert_eq!(
            changes,
            vec![
                Change::Schedules(Vec::new()),
                Change::Payments(Vec::new()),
                Change::Accomplishments(Vec::new()),
                Change::Note(DailyNote::default()),
                Change::Settings(UserSettings::default()),
            ]
        );
        assert!(sync.drain().is_empty());
    }

    #[test]
    fn follow_tracks_identity_transitions() {
        let (store, mut sync) = synchronizer();
        let first = Identity::new("u1", None);

        assert!(sync.follow(&AuthState::SignedIn(first.clone())).unwrap());
        assert!(!sync.follow(&AuthState::SignedIn(first)).unwrap());
        assert_eq!(store.listener_count(), 5);

        assert!(sync.follow(&AuthState::SignedIn(Identity::new("u2", None))).unwrap());
        assert_eq!(store.listener_count(), 5);
        assert_eq!(sync.identity().map(|identity| identity.id.as_str()), Some("u2"));

        assert!(sync.follow(&AuthState::SignedOut).unwrap());
        assert_eq!(store.listener_count(), 0);
        assert!(!sync.follow(&AuthState::Pending).unwrap());
    }

    #[test]
    fn detach_discards_undelivered_snapshots() {
        let (store, mut sync) = synchronizer();
        let first = Identity::new("u1", None);
        sync.attach(&first).unwrap();

        let paths = UserPaths::new(APP, "u1").unwrap();
        let schedules = paths.collection(Collection::Schedules).unwrap();
        store.put(
            &schedules.doc("s1").unwrap(),
            fields(json!({"description": "Old identity", "date": "2026-10-17"})),
        );

        sync.attach(&Identity::new("u2", None)).unwrap();
        let changes = sync.drain();
        assert!(changes
            .iter()
            .all(|change| !matches!(change, Change::Schedules(records) if !records.is_empty())));
    }

    #[tokio::test]
    async fn next_change_waits_for_the_store() {
        let (_store, mut sync) = synchronizer();
        sync.attach(&Identity::new("u1", None)).unwrap();
        sync.drain();

        let writer = sync.writer().unwrap();
        writer
            .execute(
                WriteRequest::create(Accomplishment {
                    text: "Shipped it".to_string(),
                    date: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();

        match sync.next_change().await {
            Change::Accomplishments(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].data.text, "Shipped it");
            }
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn writer_requires_identity() {
        let (_store, sync) = synchronizer();
        assert!(matches!(sync.writer(), Err(Error::NotSignedIn)));
    }

    #[test]
    fn writer_for_rejects_a_departed_identity() {
        let (_store, mut sync) = synchronizer();
        sync.attach(&Identity::new("u1", None)).unwrap();
        assert!(sync.writer_for("u1").is_ok());

        sync.attach(&Identity::new("u2", None)).unwrap();
        assert!(matches!(
            sync.writer_for("u1"),
            Err(Error::IdentityChanged(uid)) if uid == "u1"
        ));

        sync.detach();
        assert!(matches!(sync.writer_for("u2"), Err(Error::NotSignedIn)));
    }

    #[test]
    fn every_document_reaches_the_mirror() {
        let (store, mut sync) = synchronizer();
        let paths = UserPaths::new(APP, "u1").unwrap();
        let payments = paths.collection(Collection::Payments).unwrap();
        store.put(
            &payments.doc("good").unwrap(),
            fields(json!({"description": "Rent", "amount": "1200", "paid": false})),
        );
        store.put(&payments.doc("odd").unwrap(), fields(json!({"description": ["x"]})));

        sync.attach(&Identity::new("u1", None)).unwrap();
        let mut payments = sync
            .drain()
            .into_iter()
            .find_map(|change| match change {
                Change::Payments(records) => Some(records),
                _ => None,
            })
            .unwrap();
        payments.sort_by(|left, right| left.id.cmp(&right.id));
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].id, "good");
        assert!((payments[0].data.amount - 1200.0).abs() < f64::EPSILON);
        assert_eq!(payments[1].id, "odd");
        assert_eq!(payments[1].data.description, r#"["x"]"#);
    }
}
