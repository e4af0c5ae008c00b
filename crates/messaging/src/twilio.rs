// In crates/messaging/src/twilio.rs

use crate::types::MessageResource;
use crate::{Error, Notifier, Result};
use app_config::types::NotifierSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// The client for sending SMS through the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    /// The persistent HTTP client.
    http_client: Client,
    /// The account SID, also the basic-auth user.
    account_sid: String,
    auth_token: String,
    /// The messaging service that picks the sender number.
    messaging_service_sid: String,
    /// The base URL for the Twilio REST API.
    base_url: String,
}

impl TwilioClient {
    /// Constructs a new client from the notifier settings.
    pub fn new(settings: &NotifierSettings) -> Result<Self> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Misconfigured(format!("notifier.{name} is not set")))
        };

        Ok(Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(settings.timeout_secs))
                .build()?,
            account_sid: required(&settings.account_sid, "account_sid")?,
            auth_token: required(&settings.auth_token, "auth_token")?,
            messaging_service_sid: required(&settings.messaging_service_sid, "messaging_service_sid")?,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates one outbound message.
    ///
    /// This corresponds to the `POST /2010-04-01/Accounts/{sid}/Messages.json` endpoint.
    pub async fn create_message(&self, to: &str, body: &str) -> Result<MessageResource> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("MessagingServiceSid", self.messaging_service_sid.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;
        let value: Value = serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;

        // Twilio returns an error object with a numeric `code` on failure.
        if !status.is_success() {
            let code = value.get("code").and_then(Value::as_i64).unwrap_or(i64::from(status.as_u16()));
            let msg = value.get("message").and_then(Value::as_str).unwrap_or("Unknown error").to_string();
            return Err(Error::ApiError { code, msg });
        }

        let message: MessageResource = serde_json::from_value(value).map_err(Error::DeserializationFailed)?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for TwilioClient {
    fn name(&self) -> &'static str {
        "TwilioClient"
    }

    async fn send(&self, to: &str, body: &str) -> Result<()> {
        let message = self.create_message(to, body).await?;
        tracing::debug!(sid = %message.sid, status = ?message.status, to, "SMS accepted by Twilio.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_config::types::NotifierBackend;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> NotifierSettings {
        NotifierSettings {
            backend: NotifierBackend::Twilio,
            account_sid: Some("AC123".into()),
            auth_token: Some("secret".into()),
            messaging_service_sid: Some("MG456".into()),
            api_base_url: base_url,
            recipients: vec!["+15550001111".into()],
            timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn posts_form_to_messages_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("MessagingServiceSid=MG456"))
            .and(body_string_contains("To=%2B15550001111"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"sid": "SM1", "status": "accepted"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = TwilioClient::new(&settings(server.uri())).unwrap();
        let message = client.create_message("+15550001111", "Paused.").await.unwrap();
        assert_eq!(message.sid, "SM1");
    }

    #[tokio::test]
    async fn api_errors_carry_twilio_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let client = TwilioClient::new(&settings(server.uri())).unwrap();
        let err = client.send("bogus", "hi").await.unwrap_err();
        assert!(matches!(err, Error::ApiError { code: 21211, .. }));
    }

    #[test]
    fn missing_credentials_are_reported() {
        let mut s = settings("https://api.twilio.com".into());
        s.auth_token = None;
        let err = TwilioClient::new(&s).unwrap_err();
        assert!(err.to_string().contains("auth_token"));
    }
}
