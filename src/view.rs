//! A list view: one store plus every async operation started on its behalf.
//!
//! Background work is spawned into the view's own `JoinSet`. Closing or
//! dropping the view aborts whatever is still in flight, so a late response
//! can never land in a torn-down view.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::gateway::{self, Mutation, ReconcileReport};
use crate::http_client::ApiClient;
use crate::loader::{self, LoadPolicy, Loaded, Source};
use crate::models::AnalyticsSummary;
use crate::resource::{Deletable, Resource, Updatable};
use crate::store::ResourceStore;

/// Point-in-time copy of what the view renders.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub rows: Vec<R>,
    pub total: usize,
    pub banner: Option<String>,
    pub loading: bool,
    pub unsynced: Vec<i64>,
}

async fn refresh_store<R: Resource>(
    client: &ApiClient,
    store: &Mutex<ResourceStore<R>>,
    policy: LoadPolicy,
) -> Source {
    store.lock().await.set_loading(true);
    let loaded = loader::load::<R>(client, policy).await;
    let source = loaded.source;
    store.lock().await.apply_loaded(loaded);
    source
}

pub struct ResourceView<R: Resource> {
    client: ApiClient,
    policy: LoadPolicy,
    store: Arc<Mutex<ResourceStore<R>>>,
    tasks: JoinSet<()>,
}

impl<R: Resource> ResourceView<R> {
    pub fn new(client: ApiClient, policy: LoadPolicy) -> Self {
        Self::with_store(client, policy, ResourceStore::new())
    }

    pub fn with_store(client: ApiClient, policy: LoadPolicy, store: ResourceStore<R>) -> Self {
        Self {
            client,
            policy,
            store: Arc::new(Mutex::new(store)),
            tasks: JoinSet::new(),
        }
    }

    pub fn store(&self) -> &Arc<Mutex<ResourceStore<R>>> {
        &self.store
    }

    pub async fn refresh(&self) -> Source {
        refresh_store::<R>(&self.client, &self.store, self.policy).await
    }

    pub async fn create(&self, draft: R::Draft) -> Mutation<R> {
        gateway::create::<R>(&self.client, &self.store, draft).await
    }

    pub async fn reconcile(&self) -> ReconcileReport {
        gateway::reconcile::<R>(&self.client, &self.store).await
    }

    pub async fn snapshot(&self) -> Snapshot<R> {
        let store = self.store.lock().await;
        Snapshot {
            rows: store.derived().to_vec(),
            total: store.records().len(),
            banner: store.banner().map(str::to_string),
            loading: store.is_loading(),
            unsynced: store
                .records()
                .iter()
                .map(Resource::id)
                .filter(|id| store.is_unsynced(*id))
                .collect(),
        }
    }

    pub fn spawn_refresh(&mut self) {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let policy = self.policy;
        self.tasks.spawn(async move {
            refresh_store::<R>(&client, &store, policy).await;
        });
    }

    pub fn spawn_create(&mut self, draft: R::Draft) {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        self.tasks.spawn(async move {
            gateway::create::<R>(&client, &store, draft).await;
        });
    }

    /// Number of background operations still running.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every background operation to finish.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("{} view task panicked: {}", R::LABEL, e);
                }
            }
        }
    }

    /// Aborts everything still in flight.
    pub fn close(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(
                "Closing {} view with {} task(s) in flight",
                R::LABEL,
                self.tasks.len()
            );
        }
        self.tasks.abort_all();
    }
}

impl<R: Updatable> ResourceView<R> {
    pub async fn update(&self, id: i64, draft: R::Draft) -> Mutation<R> {
        gateway::update::<R>(&self.client, &self.store, id, draft).await
    }

    pub fn spawn_update(&mut self, id: i64, draft: R::Draft) {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        self.tasks.spawn(async move {
            gateway::update::<R>(&client, &store, id, draft).await;
        });
    }
}

impl<R: Deletable> ResourceView<R> {
    pub async fn delete(&self, id: i64) -> Mutation<i64> {
        gateway::delete::<R>(&self.client, &self.store, id).await
    }

    pub fn spawn_delete(&mut self, id: i64) {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        self.tasks.spawn(async move {
            gateway::delete::<R>(&client, &store, id).await;
        });
    }
}

impl<R: Resource> Drop for ResourceView<R> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Dashboard header cards, fed by `GET /analytics`.
pub struct DashboardView {
    client: ApiClient,
    policy: LoadPolicy,
    summary: Option<Loaded<AnalyticsSummary>>,
}

impl DashboardView {
    pub fn new(client: ApiClient, policy: LoadPolicy) -> Self {
        Self {
            client,
            policy,
            summary: None,
        }
    }

    pub async fn refresh(&mut self) -> &Loaded<AnalyticsSummary> {
        let loaded = loader::load_summary(&self.client, self.policy).await;
        self.summary.insert(loaded)
    }

    pub fn summary(&self) -> Option<&Loaded<AnalyticsSummary>> {
        self.summary.as_ref()
    }
}
