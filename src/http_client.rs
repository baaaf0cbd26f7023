use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::resource::{Deletable, Resource, Updatable};

/// JSON client for the inventory REST API.
///
/// Clones share the base URL, so changing it through settings affects every
/// view, but only for requests issued after the change.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<RwLock<Url>>,
}

impl ApiClient {
    pub fn new(base_url: Url) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: Arc::new(RwLock::new(base_url)),
        })
    }

    pub async fn base_url(&self) -> Url {
        self.base_url.read().await.clone()
    }

    pub async fn set_base_url(&self, url: Url) {
        tracing::info!("API base URL changed to {}", url);
        *self.base_url.write().await = url;
    }

    async fn url_for(&self, path: &str) -> String {
        let base = self.base_url.read().await;
        format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = self.url_for(path).await;
        tracing::debug!("{} {}", method, url);
        let builder = self.client.request(method, &url);
        (url, builder)
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn execute(url: &str, builder: RequestBuilder) -> AppResult<Vec<u8>> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> AppResult<T> {
        serde_json::from_slice(body).map_err(|source| AppError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let (url, builder) = self.request(Method::GET, path).await;
        let body = Self::execute(&url, builder).await?;
        Self::decode(&url, &body)
    }

    /// Sends `body` as JSON (`Content-Type: application/json`) and decodes the reply.
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.request(method, path).await;
        let body = Self::execute(&url, builder.json(body)).await?;
        Self::decode(&url, &body)
    }

    pub async fn list<R: Resource>(&self) -> AppResult<Vec<R>> {
        self.get_json(R::ENDPOINT).await
    }

    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> AppResult<R> {
        self.send_json(Method::POST, R::ENDPOINT, draft).await
    }

    pub async fn update<R: Updatable>(&self, id: i64, draft: &R::Draft) -> AppResult<R> {
        self.put::<R>(id, draft).await
    }

    /// Any 2xx counts as deleted; the body is ignored.
    pub async fn delete<R: Deletable>(&self, id: i64) -> AppResult<()> {
        self.remove::<R>(id).await
    }

    /// Unchecked PUT for replaying ops that were queued through `update`.
    pub(crate) async fn put<R: Resource>(&self, id: i64, draft: &R::Draft) -> AppResult<R> {
        let path = format!("{}/{}", R::ENDPOINT, id);
        self.send_json(Method::PUT, &path, draft).await
    }

    pub(crate) async fn remove<R: Resource>(&self, id: i64) -> AppResult<()> {
        let path = format!("{}/{}", R::ENDPOINT, id);
        let (url, builder) = self.request(Method::DELETE, &path).await;
        Self::execute(&url, builder).await?;
        Ok(())
    }
}
