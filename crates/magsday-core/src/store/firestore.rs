//! Firestore REST v1 document store.
//!
//! The REST surface has no push channel, so each listener is a tokio task that
//! polls its target and forwards a snapshot whenever it differs from the last
//! one delivered. Successful writes wake every listener for an early poll.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::{mpsc, watch, Notify};

use super::codec::{decode_fields, encode_fields};
use super::{
    CollectionPath, CollectionSnapshot, Document, DocumentPath, DocumentSnapshot, DocumentStore,
    Fields, ListenerRegistration, StoreError, StoreResult, Subscription,
};
use crate::util::describe_api_error;

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

/// Current ID token of the signed-in user, `None` while signed out.
pub type TokenSource = watch::Receiver<Option<String>>;

#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    documents_url: String,
    client: Client,
    tokens: TokenSource,
    poll_interval: Duration,
    writes: Arc<Notify>,
}

impl FirestoreStore {
    pub fn new(project_id: &str, tokens: TokenSource, poll_interval: Duration) -> StoreResult<Self> {
        let project_id = project_id.trim();
        if project_id.is_empty() || project_id.contains('/') {
            return Err(StoreError::InvalidPath(format!(
                "invalid Firestore project id '{project_id}'"
            )));
        }

        Ok(Self {
            inner: Arc::new(FirestoreInner {
                documents_url: format!(
                    "{FIRESTORE_API_URL}/projects/{project_id}/databases/(default)/documents"
                ),
                client: Client::builder().build()?,
                tokens,
                poll_interval,
                writes: Arc::new(Notify::new()),
            }),
        })
    }

    fn url(&self, path: &impl Display) -> String {
        format!("{}/{}", self.inner.documents_url, path)
    }

    fn token(&self) -> StoreResult<String> {
        self.inner
            .tokens
            .borrow()
            .clone()
            .ok_or(StoreError::Unauthenticated)
    }

    async fn fetch_collection(&self, path: &CollectionPath) -> StoreResult<CollectionSnapshot> {
        let token = self.token()?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .inner
                .client
                .get(self.url(path))
                .bearer_auth(&token)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let page: ListDocumentsResponse = ensure_success(request.send().await?)
                .await?
                .json()
                .await?;
            documents.extend(page.documents.into_iter().map(WireDocument::into_document));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(CollectionSnapshot { documents })
    }

    async fn fetch_document(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot::Absent);
        }

        let document: WireDocument = ensure_success(response).await?.json().await?;
        Ok(DocumentSnapshot::Exists(decode_fields(&document.fields)))
    }

    fn spawn_listener<T, F, Fut>(&self, target: String, fetch: F) -> StoreResult<Subscription<T>>
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(Self) -> Fut + Send + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let store = self.clone();
        let task = runtime.spawn(poll_until_closed(
            target,
            move || fetch(store.clone()),
            sender,
            Arc::clone(&self.inner.writes),
            self.inner.poll_interval,
        ));

        Ok(Subscription::new(
            receiver,
            ListenerRegistration::new(move || task.abort()),
        ))
    }
}

/// Poll `fetch` and forward every snapshot that differs from the last one
/// delivered. Sleeps `interval` between polls unless `wake` fires first, and
/// returns once the receiving side is gone.
async fn poll_until_closed<T, F, Fut>(
    target: String,
    fetch: F,
    sender: mpsc::UnboundedSender<T>,
    wake: Arc<Notify>,
    interval: Duration,
) where
    T: Clone + PartialEq,
    F: Fn() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut last_delivered: Option<T> = None;
    loop {
        let woken = wake.notified();
        match fetch().await {
            Ok(snapshot) if last_delivered.as_ref() != Some(&snapshot) => {
                if sender.send(snapshot.clone()).is_err() {
                    break;
                }
                last_delivered = Some(snapshot);
            }
            Ok(_) => {}
            Err(StoreError::Unauthenticated) => {
                tracing::debug!("Listener for {} waiting for a signed-in user", target);
            }
            Err(error) => {
                tracing::warn!("Listener for {} failed to poll: {}", target, error);
            }
        }
        if sender.is_closed() {
            break;
        }
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = woken => {}
        }
    }
    tracing::debug!("Listener for {} stopped", target);
}

impl DocumentStore for FirestoreStore {
    fn listen_collection(
        &self,
        path: &CollectionPath,
    ) -> StoreResult<Subscription<CollectionSnapshot>> {
        let path = path.clone();
        self.spawn_listener(path.to_string(), move |store| {
            let path = path.clone();
            async move { store.fetch_collection(&path).await }
        })
    }

    fn listen_document(&self, path: &DocumentPath) -> StoreResult<Subscription<DocumentSnapshot>> {
        let path = path.clone();
        self.spawn_listener(path.to_string(), move |store| {
            let path = path.clone();
            async move { store.fetch_document(&path).await }
        })
    }

    async fn add_document(&self, path: &CollectionPath, fields: Fields) -> StoreResult<String> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .bearer_auth(self.token()?)
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        let document: WireDocument = ensure_success(response).await?.json().await?;
        self.inner.writes.notify_waiters();
        Ok(document.into_document().id)
    }

    async fn set_document(&self, path: &DocumentPath, fields: Fields) -> StoreResult<()> {
        let response = self
            .inner
            .client
            .patch(self.url(path))
            .bearer_auth(self.token()?)
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        ensure_success(response).await?;
        self.inner.writes.notify_waiters();
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        let response = self
            .inner
            .client
            .delete(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        if response.status() != StatusCode::NOT_FOUND {
            ensure_success(response).await?;
        }
        self.inner.writes.notify_waiters();
        Ok(())
    }
}

async fn ensure_success(response: Response) -> StoreResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api(describe_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    /// Full resource name ending in `/{collection}/{id}`
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl WireDocument {
    fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Document {
            id,
            fields: decode_fields(&self.fields),
        }
    }
}
