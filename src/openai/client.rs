use super::error::{OpenAIError, Result};
use super::types::*;
use super::AssistantsApi;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Page size used when listing thread messages; the API maximum.
const MESSAGE_PAGE_LIMIT: &str = "100";

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Network {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.authorized(self.client.get(self.url(path)).query(query));
        Self::send(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.authorized(
            self.client
                .post(self.url(path))
                .header("Content-Type", "application/json")
                .json(body),
        );
        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OpenAIError::from_status(status.as_u16(), &error_text));
        }

        response.json::<T>().await.map_err(|e| OpenAIError::Decode {
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl AssistantsApi for OpenAIClient {
    #[instrument(skip(self))]
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.get(&format!("/assistants/{}", assistant_id), &[]).await
    }

    #[instrument(skip(self))]
    async fn create_thread(&self) -> Result<Thread> {
        self.post("/threads", &serde_json::json!({})).await
    }

    #[instrument(skip(self, content), fields(content_length = content.len()))]
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<Message> {
        let body = CreateMessageRequest {
            role: MessageRole::User,
            content: content.to_string(),
        };
        self.post(&format!("/threads/{}/messages", thread_id), &body)
            .await
    }

    #[instrument(skip(self))]
    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        model: Option<&str>,
    ) -> Result<Run> {
        let body = CreateRunRequest {
            assistant_id: assistant_id.to_string(),
            model: model.map(String::from),
        };
        self.post(&format!("/threads/{}/runs", thread_id), &body)
            .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("/threads/{}/runs/{}", thread_id, run_id), &[])
            .await
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, thread_id: &str, run_id: &str) -> Result<Vec<Message>> {
        let page: ListResponse<Message> = self
            .get(
                &format!("/threads/{}/messages", thread_id),
                &[
                    ("order", "desc"),
                    ("limit", MESSAGE_PAGE_LIMIT),
                    ("run_id", run_id),
                ],
            )
            .await?;
        debug!(count = page.data.len(), has_more = page.has_more, "Listed thread messages");
        Ok(page.data)
    }
}
