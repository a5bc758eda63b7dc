use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{MailError, MailResult};
use crate::mailer::{Mailer, OutboundEmail, SendReceipt};

/// Mailer backed by the Resend HTTP API (`POST {base}/emails`).
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ResendMailer {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.resend.com";

    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> MailResult<SendReceipt> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SendReceipt>()
                .await
                .map_err(|e| MailError::Transport(e.to_string()));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);
        tracing::error!(status = status.as_u16(), %message, "resend rejected message");
        Err(MailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn fake_resend(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != "Bearer re_test" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "API key is invalid" })),
            );
        }
        let recipients = body["to"].as_array().map(|a| a.len()).unwrap_or(0);
        (StatusCode::OK, Json(json!({ "id": format!("email-{recipients}") })))
    }

    async fn serve() -> String {
        let app = Router::new().route("/emails", post(fake_resend));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "OERC Newsletter <info@oerc.ca>".into(),
            to: vec!["a@x.ca".into(), "b@x.ca".into()],
            subject: "Spring update".into(),
            html: "<p>News</p>".into(),
        }
    }

    #[tokio::test]
    async fn delivers_one_message_for_all_recipients() {
        let base = serve().await;
        let mailer = ResendMailer::new("re_test", base);
        let receipt = mailer.send(&email()).await.unwrap();
        assert_eq!(receipt.id.as_deref(), Some("email-2"));
    }

    #[tokio::test]
    async fn surfaces_rejection_message() {
        let base = serve().await;
        let mailer = ResendMailer::new("wrong", base);
        let err = mailer.send(&email()).await.unwrap_err();
        assert_eq!(
            err,
            MailError::Rejected { status: 401, message: "API key is invalid".into() }
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let mailer = ResendMailer::new("re_test", "http://127.0.0.1:1");
        assert!(matches!(mailer.send(&email()).await, Err(MailError::Transport(_))));
    }
}
