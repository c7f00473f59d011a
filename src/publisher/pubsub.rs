//! Google Cloud Pub/Sub publisher over the REST API.
//!
//! # Responsibilities
//! - Build the `topics.publish` request for the configured project
//! - Attach an OAuth token from the service account credentials
//! - Talk to the emulator instead when `PUBSUB_EMULATOR_HOST` is set
//! - Translate broker errors into [`PublishError`]

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::PubSubConfig;
use crate::error::BridgeError;
use crate::publisher::{MessageId, PublishError, Publisher};

const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";

#[derive(Serialize)]
struct PublishRequest<'a> {
    messages: [OutgoingMessage<'a>; 1],
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Publisher bound to a single Google Cloud project.
#[derive(Clone)]
pub struct PubSubPublisher {
    client: reqwest::Client,
    endpoint: Url,
    project_id: String,
    /// `None` when talking to the emulator.
    auth: Option<Arc<dyn TokenProvider>>,
}

impl PubSubPublisher {
    /// Create a publisher from configuration.
    ///
    /// Reads the credentials file unless an emulator host is configured.
    pub fn from_config(config: &PubSubConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.publish_timeout())
            .build()
            .map_err(|e| BridgeError::client("pubsub client", e))?;

        let (endpoint, auth) = match &config.emulator_host {
            Some(host) => {
                tracing::info!(emulator_host = %host, "Using Pub/Sub emulator");
                (format!("http://{}", host), None)
            }
            None => {
                let account = CustomServiceAccount::from_file(&config.credentials)
                    .map_err(|e| BridgeError::client("pubsub client", e))?;
                let auth: Arc<dyn TokenProvider> = Arc::new(account);
                (config.endpoint.clone(), Some(auth))
            }
        };

        let endpoint = Url::parse(&endpoint).map_err(|e| {
            BridgeError::client("pubsub client", format!("invalid endpoint '{}': {}", endpoint, e))
        })?;

        tracing::info!(
            project_id = %config.project_id,
            endpoint = %endpoint,
            "Pub/Sub publisher initialized"
        );

        Ok(Self::new(client, endpoint, config.project_id.clone(), auth))
    }

    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        project_id: String,
        auth: Option<Arc<dyn TokenProvider>>,
    ) -> Self {
        Self {
            client,
            endpoint,
            project_id,
            auth,
        }
    }

    /// URL of the `publish` method for `topic`.
    pub fn publish_url(&self, topic: &str) -> String {
        format!(
            "{}/v1/projects/{}/topics/{}:publish",
            self.endpoint.as_str().trim_end_matches('/'),
            self.project_id,
            topic
        )
    }
}

#[async_trait]
impl Publisher for PubSubPublisher {
    async fn publish(&self, topic: &str, data: &[u8]) -> Result<MessageId, PublishError> {
        let encoded = STANDARD.encode(data);
        let body = PublishRequest {
            messages: [OutgoingMessage { data: &encoded }],
        };

        let mut request = self.client.post(self.publish_url(topic)).json(&body);
        if let Some(auth) = &self.auth {
            let token = auth.token(&[PUBSUB_SCOPE]).await?;
            request = request.bearer_auth(token.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PublishResponse =
            serde_json::from_str(&text).map_err(|e| PublishError::Decode(e.to_string()))?;

        // One message per call, so the first ID is the only one.
        parsed
            .message_ids
            .into_iter()
            .next()
            .filter(|id| !id.is_empty())
            .map(MessageId)
            .ok_or(PublishError::EmptyResponse)
    }
}
