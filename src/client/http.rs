use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::api::MessageResponse;
use crate::error::ClientError;
use crate::model::{Book, BookInput};

pub type Result<T> = std::result::Result<T, ClientError>;

/// The REST surface of the Catalog Service as seen by a client.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>>;
    async fn create(&self, input: &BookInput) -> Result<Book>;
    /// `None` when the id matched no book.
    async fn update(&self, id: i64, input: &BookInput) -> Result<Option<Book>>;
    async fn delete(&self, id: i64) -> Result<MessageResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Self {
        HttpCatalog {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list(&self) -> Result<Vec<Book>> {
        let resp = self
            .client
            .get(self.url("/books"))
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn create(&self, input: &BookInput) -> Result<Book> {
        let resp = self.client.post(self.url("/books")).json(input).send().await?;
        Self::decode(resp).await
    }

    async fn update(&self, id: i64, input: &BookInput) -> Result<Option<Book>> {
        let resp = self
            .client
            .put(self.url(&format!("/books/{}", id)))
            .json(input)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn delete(&self, id: i64) -> Result<MessageResponse> {
        let resp = self
            .client
            .delete(self.url(&format!("/books/{}", id)))
            .send()
            .await?;
        Self::decode(resp).await
    }
}
