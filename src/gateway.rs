//! Mutation gateway: create/update/delete against the API, applied locally when the API fails.
//!
//! A failed call never surfaces as an error. The change is applied to the
//! store anyway, the record is marked unsynced, the banner is set, and the op
//! is queued for [`reconcile`].

use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::http_client::ApiClient;
use crate::resource::{Deletable, Resource, Updatable};
use crate::store::{PendingOp, ResourceStore};

/// What a mutation did, from the user's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// The server confirmed the change.
    Synced(T),
    /// Applied locally only.
    Unsynced { value: T, warning: String },
    /// Nothing to do, e.g. the id is not in the list.
    Skipped(String),
}

impl<T> Mutation<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Mutation::Synced(value) | Mutation::Unsynced { value, .. } => Some(value),
            Mutation::Skipped(_) => None,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, Mutation::Synced(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub synced: usize,
    pub remaining: usize,
}

impl<R: Resource> ResourceStore<R> {
    fn has_pending_create(&self, id: i64) -> bool {
        self.pending
            .iter()
            .any(|op| matches!(op, PendingOp::Create { local_id, .. } if *local_id == id))
    }

    fn degrade(&mut self, id: i64, op: PendingOp<R>, warning: String) {
        tracing::warn!("{}", warning);
        self.unsynced.insert(id);
        self.pending.push_back(op);
        self.banner = Some(warning);
    }

    pub(crate) fn commit_create(&mut self, draft: R::Draft, result: AppResult<R>) -> Mutation<R> {
        match result {
            Ok(record) => {
                tracing::info!("Created {} #{}", R::LABEL, record.id());
                self.upsert(record.clone());
                Mutation::Synced(record)
            }
            Err(e) => {
                let id = self.next_id();
                let record = R::from_draft(id, &draft, self.now());
                self.upsert(record.clone());
                let warning = format!(
                    "Could not save the new {} to the server ({}). \
                     It was added locally and is not yet synced.",
                    R::LABEL,
                    e
                );
                self.degrade(id, PendingOp::Create { local_id: id, draft }, warning.clone());
                Mutation::Unsynced {
                    value: record,
                    warning,
                }
            }
        }
    }

    pub(crate) fn commit_delete(&mut self, id: i64, result: AppResult<()>) -> Mutation<i64> {
        self.remove(id);
        self.pending
            .retain(|op| !matches!(op, PendingOp::Update { id: queued, .. } if *queued == id));
        match result {
            Ok(()) => {
                tracing::info!("Deleted {} #{}", R::LABEL, id);
                Mutation::Synced(id)
            }
            Err(e) => {
                let warning = format!(
                    "Could not delete {} #{} on the server ({}). \
                     It was removed locally and the delete is queued.",
                    R::LABEL,
                    id,
                    e
                );
                self.degrade(id, PendingOp::Delete { id }, warning.clone());
                Mutation::Unsynced { value: id, warning }
            }
        }
    }

    /// Unmarks `id` unless an op queued since the replay started still targets it.
    fn clear_mark(&mut self, id: i64) {
        if !self.pending.iter().any(|op| op.id() == id) {
            self.unsynced.remove(&id);
        }
    }

    /// Drops a record that only ever existed locally, along with its queued ops.
    fn discard_local(&mut self, id: i64) {
        self.remove(id);
        self.pending.retain(|op| op.id() != id);
    }
}

impl<R: Updatable> ResourceStore<R> {
    fn patch_locally(&mut self, id: i64, draft: &R::Draft) -> Option<R> {
        let now = self.now();
        let record = self.get_mut(id)?;
        record.apply_draft(draft, now);
        let patched = record.clone();
        self.recompute();
        Some(patched)
    }

    pub(crate) fn commit_update(
        &mut self,
        id: i64,
        draft: R::Draft,
        result: AppResult<R>,
    ) -> Mutation<R> {
        match result {
            Ok(record) => {
                tracing::info!("Updated {} #{}", R::LABEL, id);
                self.replace(id, record.clone());
                Mutation::Synced(record)
            }
            Err(e) => match self.patch_locally(id, &draft) {
                Some(patched) => {
                    let warning = format!(
                        "Could not update {} #{} on the server ({}). \
                         The change was applied locally and is not yet synced.",
                        R::LABEL,
                        id,
                        e
                    );
                    self.degrade(id, PendingOp::Update { id, draft }, warning.clone());
                    Mutation::Unsynced {
                        value: patched,
                        warning,
                    }
                }
                None => Mutation::Skipped(format!("{} #{} is no longer in the list", R::LABEL, id)),
            },
        }
    }

    /// Edits to a record the server has never seen are folded into its queued create.
    fn fold_into_pending_create(&mut self, id: i64, draft: R::Draft) -> Mutation<R> {
        let patched = self.patch_locally(id, &draft);
        for op in self.pending.iter_mut() {
            if let PendingOp::Create { local_id, draft: queued } = op {
                if *local_id == id {
                    *queued = draft.clone();
                }
            }
        }
        match patched {
            Some(value) => Mutation::Unsynced {
                value,
                warning: format!(
                    "{} #{} has not reached the server yet; the edit was saved locally.",
                    R::LABEL,
                    id
                ),
            },
            None => Mutation::Skipped(format!("{} #{} is no longer in the list", R::LABEL, id)),
        }
    }
}

fn missing<T, R: Resource>(store: &mut ResourceStore<R>, id: i64) -> Mutation<T> {
    let warning = format!("{} #{} was not found", R::LABEL, id);
    tracing::warn!("{}", warning);
    store.banner = Some(warning.clone());
    Mutation::Skipped(warning)
}

pub async fn create<R: Resource>(
    client: &ApiClient,
    store: &Mutex<ResourceStore<R>>,
    draft: R::Draft,
) -> Mutation<R> {
    store.lock().await.begin_save();
    let result = client.create::<R>(&draft).await;
    let mut store = store.lock().await;
    store.end_save();
    store.commit_create(draft, result)
}

pub async fn update<R: Updatable>(
    client: &ApiClient,
    store: &Mutex<ResourceStore<R>>,
    id: i64,
    draft: R::Draft,
) -> Mutation<R> {
    {
        let mut store = store.lock().await;
        if store.get(id).is_none() {
            return missing(&mut *store, id);
        }
        if store.has_pending_create(id) {
            return store.fold_into_pending_create(id, draft);
        }
        store.begin_save();
    }
    let result = client.update::<R>(id, &draft).await;
    let mut store = store.lock().await;
    store.end_save();
    store.commit_update(id, draft, result)
}

pub async fn delete<R: Deletable>(
    client: &ApiClient,
    store: &Mutex<ResourceStore<R>>,
    id: i64,
) -> Mutation<i64> {
    {
        let mut store = store.lock().await;
        if store.get(id).is_none() {
            return missing(&mut *store, id);
        }
        if store.has_pending_create(id) {
            store.discard_local(id);
            return Mutation::Synced(id);
        }
        store.begin_save();
    }
    let result = client.delete::<R>(id).await;
    let mut store = store.lock().await;
    store.end_save();
    store.commit_delete(id, result)
}

/// Replays queued ops once, in order. Ops that fail again stay queued.
///
/// The store is locked only to take the queue and to commit each outcome, so
/// the view stays usable while requests are in flight.
pub async fn reconcile<R: Resource>(
    client: &ApiClient,
    store: &Mutex<ResourceStore<R>>,
) -> ReconcileReport {
    let ops: Vec<PendingOp<R>> = {
        let mut store = store.lock().await;
        store.begin_save();
        store.pending.drain(..).collect()
    };
    let mut failed = Vec::new();
    let mut report = ReconcileReport::default();

    for op in ops {
        match replay(client, &op).await {
            Ok(confirmed) => {
                let mut store = store.lock().await;
                match (&op, confirmed) {
                    (PendingOp::Create { local_id, .. }, Some(record)) => {
                        tracing::info!("Synced {} #{} as #{}", R::LABEL, local_id, record.id());
                        store.promote(*local_id, record);
                    }
                    (PendingOp::Update { id, .. }, Some(record)) => {
                        store.replace(*id, record);
                        store.clear_mark(*id);
                    }
                    (op, _) => store.clear_mark(op.id()),
                }
                report.synced += 1;
            }
            Err(e) => {
                tracing::warn!("{} #{} is still unsynced: {}", R::LABEL, op.id(), e);
                failed.push(op);
            }
        }
    }

    let mut store = store.lock().await;
    store.end_save();
    for op in failed.into_iter().rev() {
        store.pending.push_front(op);
    }
    report.remaining = store.pending.len();
    store.banner = if report.remaining > 0 {
        Some(format!(
            "{} {} change(s) could not be synced with the server.",
            report.remaining,
            R::LABEL
        ))
    } else {
        None
    };
    report
}

/// Sends one queued op. A 404 on a delete means the record is already gone.
async fn replay<R: Resource>(client: &ApiClient, op: &PendingOp<R>) -> AppResult<Option<R>> {
    match op {
        PendingOp::Create { draft, .. } => client.create::<R>(draft).await.map(Some),
        PendingOp::Update { id, draft } => client.put::<R>(*id, draft).await.map(Some),
        PendingOp::Delete { id } => match client.remove::<R>(*id).await {
            Err(AppError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            other => other.map(|()| None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timestamp::fixed;
    use crate::models::{Item, NewItem, NewSupplier, Supplier};
    use crate::samples;
    use crate::test_support::{spawn_stub, StubRoute};
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    fn july() -> DateTime<Utc> {
        fixed(2024, 7, 1, 9)
    }

    fn supplier_store() -> Mutex<ResourceStore<Supplier>> {
        let mut store = ResourceStore::with_clock(july);
        store.replace_all(samples::suppliers());
        Mutex::new(store)
    }

    fn item_store() -> Mutex<ResourceStore<Item>> {
        let mut store = ResourceStore::with_clock(july);
        store.replace_all(samples::items());
        Mutex::new(store)
    }

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            contact_person: "Ada Park".to_string(),
            email: "ada@northwind.test".to_string(),
            phone: "(555) 010-2020".to_string(),
            address: "1 Harbour Road".to_string(),
        }
    }

    fn restock(item: &Item, quantity: i64) -> NewItem {
        NewItem {
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            price: item.price,
            quantity,
            supplier_id: item.supplier_id,
        }
    }

    #[tokio::test]
    async fn test_failed_create_appends_locally_with_next_id() {
        let stub = spawn_stub(vec![StubRoute::post("/api/suppliers", 500, "{}")]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        let mutation = create(&client, &store, new_supplier("Northwind")).await;

        let store = store.lock().await;
        assert_eq!(store.records().len(), 4);
        let created = mutation.value().unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(created.created_at, july());
        assert!(!mutation.is_synced());
        assert!(store.banner().unwrap().contains("500"));
        assert!(store.is_unsynced(4));
        assert_eq!(store.pending().count(), 1);
        assert!(!store.is_saving());
    }

    #[tokio::test]
    async fn test_successful_create_keeps_server_id() {
        let mut from_server = Supplier::from_draft(42, &new_supplier("Northwind"), july());
        from_server.name = "Northwind Traders".to_string();
        let body = serde_json::to_string(&from_server).unwrap();
        let stub = spawn_stub(vec![StubRoute::post("/api/suppliers", 201, &body)]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        let mutation = create(&client, &store, new_supplier("Northwind")).await;
        assert_eq!(mutation, Mutation::Synced(from_server));

        let store = store.lock().await;
        assert!(store.get(42).is_some());
        assert!(store.banner().is_none());
        assert_eq!(store.pending().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_update_patches_locally() {
        let stub = spawn_stub(vec![]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = item_store();
        let draft = restock(&samples::items()[3], 40);

        let mutation = update(&client, &store, 4, draft).await;
        let patched = mutation.value().unwrap();
        assert_eq!(patched.quantity, 40);
        assert_eq!(patched.updated_at, july());
        assert!(patched.updated_at >= patched.created_at);

        let store = store.lock().await;
        assert_eq!(store.get(4).unwrap().quantity, 40);
        assert!(store.is_unsynced(4));
        assert_eq!(stub.requests().await[0].method, "PUT");
        assert_eq!(stub.requests().await[0].path, "/api/items/4");
    }

    #[tokio::test]
    async fn test_successful_update_replaces_by_id() {
        let mut server_copy = samples::items()[0].clone();
        server_copy.quantity = 99;
        let body = serde_json::to_string(&server_copy).unwrap();
        let stub = spawn_stub(vec![StubRoute::put("/api/items/1", 200, &body)]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = item_store();

        let mutation = update(&client, &store, 1, restock(&server_copy, 99)).await;
        assert!(mutation.is_synced());
        let store = store.lock().await;
        assert_eq!(store.get(1).unwrap().quantity, 99);
        assert_eq!(store.records().len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_id_makes_no_request() {
        let stub = spawn_stub(vec![]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = item_store();

        let updated = update(&client, &store, 77, restock(&samples::items()[0], 1)).await;
        let deleted = delete(&client, &store, 77).await;
        assert!(matches!(updated, Mutation::Skipped(_)));
        assert!(matches!(deleted, Mutation::Skipped(_)));
        assert!(stub.requests().await.is_empty());
        assert_eq!(store.lock().await.records().len(), 6);
    }

    #[tokio::test]
    async fn test_delete_removes_even_when_server_fails() {
        let stub = spawn_stub(vec![
            StubRoute::delete("/api/items/2", 204),
            StubRoute::delete("/api/items/3", 502),
        ])
        .await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = item_store();

        assert_eq!(delete(&client, &store, 2).await, Mutation::Synced(2));
        let failed = delete(&client, &store, 3).await;
        assert!(!failed.is_synced());

        let store = store.lock().await;
        assert!(store.get(2).is_none());
        assert!(store.get(3).is_none());
        assert_eq!(store.derived().len(), 4);
        assert_eq!(store.pending().count(), 1);
    }

    #[tokio::test]
    async fn test_local_only_record_never_reaches_server() {
        let stub = spawn_stub(vec![StubRoute::post("/api/suppliers", 503, "{}")]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        create(&client, &store, new_supplier("Ghost Co")).await;
        update(&client, &store, 4, new_supplier("Ghost Company")).await;
        {
            let guard = store.lock().await;
            assert_eq!(guard.get(4).unwrap().name, "Ghost Company");
            assert_eq!(guard.pending().count(), 1);
        }
        assert_eq!(delete(&client, &store, 4).await, Mutation::Synced(4));

        let guard = store.lock().await;
        assert_eq!(guard.pending().count(), 0);
        assert!(!guard.is_unsynced(4));
        assert_eq!(stub.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_swaps_local_id_for_server_id() {
        let from_server = Supplier::from_draft(42, &new_supplier("Northwind"), july());
        let body = serde_json::to_string(&from_server).unwrap();
        let stub = spawn_stub(vec![
            StubRoute::post("/api/suppliers", 500, "{}").times(1),
            StubRoute::post("/api/suppliers", 201, &body),
            StubRoute::delete("/api/suppliers/2", 500).times(1),
            StubRoute::delete("/api/suppliers/2", 404),
        ])
        .await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        create(&client, &store, new_supplier("Northwind")).await;
        delete(&client, &store, 2).await;
        assert_eq!(store.lock().await.pending().count(), 2);

        let report = reconcile(&client, &store).await;
        assert_eq!(report, ReconcileReport { synced: 2, remaining: 0 });

        let guard = store.lock().await;
        assert!(guard.get(4).is_none());
        assert_eq!(guard.get(42).unwrap().name, "Northwind");
        assert!(!guard.is_unsynced(4));
        assert!(guard.banner().is_none());
        let sent: serde_json::Value =
            serde_json::from_str(&stub.requests().await[2].body).unwrap();
        assert_eq!(sent["name"], "Northwind");
    }

    #[tokio::test]
    async fn test_reconcile_keeps_ops_that_fail_again() {
        let stub = spawn_stub(vec![StubRoute::post("/api/suppliers", 500, "{}")]).await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        create(&client, &store, new_supplier("Northwind")).await;
        let report = reconcile(&client, &store).await;
        assert_eq!(report, ReconcileReport { synced: 0, remaining: 1 });

        let guard = store.lock().await;
        assert!(guard.is_unsynced(4));
        assert!(guard.banner().unwrap().contains("could not be synced"));
    }

    #[tokio::test]
    async fn test_reload_onto_local_id_still_deletes_server_record() {
        let from_server = Supplier::from_draft(42, &new_supplier("Northwind"), july());
        let body = serde_json::to_string(&from_server).unwrap();
        let stub = spawn_stub(vec![
            StubRoute::post("/api/suppliers", 500, "{}").times(1),
            StubRoute::delete("/api/suppliers/4", 204),
            StubRoute::post("/api/suppliers", 201, &body),
        ])
        .await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        create(&client, &store, new_supplier("Northwind")).await;
        let mut reloaded = samples::suppliers();
        reloaded.push(Supplier::from_draft(4, &new_supplier("Real Server Co"), july()));
        store.lock().await.replace_all(reloaded);

        {
            let guard = store.lock().await;
            assert_eq!(guard.get(4).unwrap().name, "Real Server Co");
            assert!(!guard.is_unsynced(4));
            assert_eq!(guard.get(5).unwrap().name, "Northwind");
            assert!(guard.is_unsynced(5));
        }

        assert_eq!(delete(&client, &store, 4).await, Mutation::Synced(4));
        let requests = stub.requests().await;
        assert_eq!(requests[1].method, "DELETE");
        assert_eq!(requests[1].path, "/api/suppliers/4");

        let report = reconcile(&client, &store).await;
        assert_eq!(report, ReconcileReport { synced: 1, remaining: 0 });
        let guard = store.lock().await;
        assert!(guard.get(4).is_none());
        assert!(guard.get(5).is_none());
        assert_eq!(guard.get(42).unwrap().name, "Northwind");
        assert!(!guard.is_unsynced(5));
    }

    #[tokio::test]
    async fn test_reconcile_inserts_server_record_when_local_one_is_gone() {
        let from_server = Supplier::from_draft(42, &new_supplier("Northwind"), july());
        let body = serde_json::to_string(&from_server).unwrap();
        let stub = spawn_stub(vec![
            StubRoute::post("/api/suppliers", 500, "{}").times(1),
            StubRoute::post("/api/suppliers", 201, &body),
        ])
        .await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();

        create(&client, &store, new_supplier("Northwind")).await;
        store.lock().await.remove(4);

        reconcile(&client, &store).await;
        let guard = store.lock().await;
        assert_eq!(guard.get(42).unwrap().name, "Northwind");
        assert_eq!(guard.records().len(), 4);
    }

    #[tokio::test]
    async fn test_store_stays_usable_while_reconcile_waits() {
        let from_server = Supplier::from_draft(42, &new_supplier("Northwind"), july());
        let body = serde_json::to_string(&from_server).unwrap();
        let stub = spawn_stub(vec![
            StubRoute::post("/api/suppliers", 500, "{}").times(1),
            StubRoute::post("/api/suppliers", 201, &body).delayed(Duration::from_secs(2)),
        ])
        .await;
        let client = ApiClient::new(stub.api_url()).unwrap();
        let store = supplier_store();
        create(&client, &store, new_supplier("Northwind")).await;

        let (report, responsive) = tokio::join!(reconcile(&client, &store), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let guard = tokio::time::timeout(Duration::from_millis(500), store.lock()).await;
            match guard {
                Ok(mut store) => {
                    store.set_search("tech");
                    store.is_saving() && store.derived().len() == 1
                }
                Err(_) => false,
            }
        });

        assert!(responsive);
        assert_eq!(report.synced, 1);
        let guard = store.lock().await;
        assert!(!guard.is_saving());
        assert!(guard.get(42).is_some());
    }
}
