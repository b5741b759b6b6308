//! This module provides a client to connect to a hosted auth + document backend
//!
//! The auth endpoints follow the common `accounts:signUp` / `accounts:signInWithPassword` REST shape (project API key in the query string); the document store exposes one JSON document per user, read and overwritten as a whole with a bearer token. The live subscription is a background polling loop: the hosted push channel is provider-specific, polling on `updatedAt` is not.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::document::PlannerDocument;
use crate::error::{AuthError, StorageError};
use crate::resource::ProjectResource;
use crate::session::{SessionState, UserId};
use crate::traits::{AuthSource, DocumentSource, DocumentSubscription, SubscriptionId};

/// What the auth endpoints return on success
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

/// The signed-in identity and its bearer token
#[derive(Clone)]
struct AuthTokens {
    user: UserId,
    id_token: String,
}

/// A planner source that fetches its data from a hosted backend
pub struct Client {
    http: reqwest::Client,
    project: ProjectResource,

    session: Mutex<Option<AuthTokens>>,
    session_tx: watch::Sender<SessionState>,
    watchers: Mutex<HashMap<SubscriptionId, JoinHandle<()>>>,
}

impl Client {
    /// Create a client. This does not start a connection.
    pub fn new(project: ProjectResource) -> Self {
        let (session_tx, _) = watch::channel(SessionState::SignedOut);
        Self {
            http: reqwest::Client::new(),
            project,
            session: Mutex::new(None),
            session_tx,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    fn user_agent() -> String {
        crate::config::PRODUCT_NAME.lock().unwrap().clone()
    }

    /// The identity of the current session, if any.
    /// The provider owns the session itself; this is only the reference to it.
    pub fn current_user(&self) -> Option<UserId> {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|tokens| tokens.user.clone())
    }

    /// The bearer token of the current session
    fn current_token(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map(|tokens| tokens.id_token.clone())
    }

    async fn auth_request(&self, operation: &str, email: &str, password: &str) -> Result<UserId, AuthError> {
        let url = self
            .project
            .auth_endpoint(operation)
            .map_err(|err| AuthError::Provider(format!("Invalid auth endpoint: {}", err)))?;
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(url)
            .header(USER_AGENT, Self::user_agent())
            .json(&body)
            .send()
            .await
            .map_err(|err| AuthError::Provider(format!("The auth service could not be reached: {}", err)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AuthError::Provider(format!("Unreadable auth response: {}", err)))?;

        if status.is_success() == false {
            return Err(parse_auth_error(&text));
        }

        let tokens: TokenResponse = serde_json::from_str(&text)
            .map_err(|err| AuthError::Provider(format!("Unexpected auth response: {}", err)))?;
        let user = UserId::from(tokens.local_id);

        *self.session.lock().unwrap() = Some(AuthTokens {
            user: user.clone(),
            id_token: tokens.id_token,
        });
        let _ = self.session_tx.send(SessionState::SignedIn(user.clone()));

        Ok(user)
    }
}

#[async_trait]
impl AuthSource for Client {
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.auth_request("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.auth_request("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) {
        *self.session.lock().unwrap() = None;
        let _ = self.session_tx.send(SessionState::SignedOut);
    }

    fn session_states(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }
}

#[async_trait]
impl DocumentSource for Client {
    async fn read_document(&self, user: &UserId) -> Result<Option<PlannerDocument>, StorageError> {
        let token = self
            .current_token()
            .ok_or_else(|| StorageError::Read("Not signed in".to_string()))?;
        let url = self
            .project
            .document_url(user)
            .map_err(|err| StorageError::Read(format!("Invalid document URL: {}", err)))?;

        fetch_document(&self.http, url, &token)
            .await
            .map_err(StorageError::Read)
    }

    async fn write_document(&self, user: &UserId, document: &PlannerDocument) -> Result<(), StorageError> {
        let token = self
            .current_token()
            .ok_or_else(|| StorageError::Write("Not signed in".to_string()))?;
        let url = self
            .project
            .document_url(user)
            .map_err(|err| StorageError::Write(format!("Invalid document URL: {}", err)))?;

        let response = self
            .http
            .put(url)
            .header(USER_AGENT, Self::user_agent())
            .bearer_auth(token)
            .json(document)
            .send()
            .await
            .map_err(|err| StorageError::Write(err.to_string()))?;

        if response.status().is_success() == false {
            return Err(StorageError::Write(format!(
                "Unexpected HTTP status code {:?}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn subscribe(&self, user: &UserId) -> Result<DocumentSubscription, StorageError> {
        let token = self
            .current_token()
            .ok_or_else(|| StorageError::Subscribe("Not signed in".to_string()))?;
        let url = self
            .project
            .document_url(user)
            .map_err(|err| StorageError::Subscribe(format!("Invalid document URL: {}", err)))?;

        let id = SubscriptionId::random();
        let (tx, rx) = watch::channel(None);
        let http = self.http.clone();

        // Poll until the receiver goes away or `unsubscribe` aborts us.
        // Only a fresh `updatedAt` is forwarded, so an unchanged document stays quiet.
        let poll = tokio::spawn(async move {
            let mut last_seen = None;
            loop {
                let period = *crate::config::SYNC_POLL_PERIOD.lock().unwrap();
                tokio::time::sleep(period).await;

                match fetch_document(&http, url.clone(), &token).await {
                    Err(err) => log::warn!("Polling the planner document failed: {}", err),
                    Ok(None) => {}
                    Ok(Some(document)) => {
                        if last_seen != Some(document.updated_at()) {
                            last_seen = Some(document.updated_at());
                            if tx.send(Some(document)).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        self.watchers.lock().unwrap().insert(id, poll);
        log::debug!("Subscribed to the planner of {} as {}", user, id);
        Ok(DocumentSubscription::new(id, rx))
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) {
        match self.watchers.lock().unwrap().remove(&subscription) {
            None => log::warn!("No subscription {} to release", subscription),
            Some(poll) => poll.abort(),
        }
    }
}

/// GET one planner document. A 404 means the user has never saved one.
async fn fetch_document(
    http: &reqwest::Client,
    url: Url,
    token: &str,
) -> Result<Option<PlannerDocument>, String> {
    let response = http
        .get(url)
        .header(USER_AGENT, Client::user_agent())
        .bearer_auth(token)
        .send()
        .await
        .map_err(|err| err.to_string())?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if response.status().is_success() == false {
        return Err(format!("Unexpected HTTP status code {:?}", response.status()));
    }

    let document = response
        .json::<PlannerDocument>()
        .await
        .map_err(|err| format!("Unreadable document: {}", err))?;
    Ok(Some(document))
}

/// Map a provider error body to the [`AuthError`] taxonomy.
/// Codes we do not know keep their verbatim message, since they end up displayed as-is.
fn parse_auth_error(body: &str) -> AuthError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value["error"]["message"]
                .as_str()
                .map(|message| message.to_string())
        });

    match message {
        None => AuthError::Provider(format!("Unexpected auth response: {}", body)),
        Some(code) => {
            if code.starts_with("EMAIL_EXISTS") {
                AuthError::EmailTaken
            } else if code.starts_with("WEAK_PASSWORD") {
                AuthError::WeakPassword
            } else if code.starts_with("INVALID_PASSWORD")
                || code.starts_with("EMAIL_NOT_FOUND")
                || code.starts_with("INVALID_LOGIN_CREDENTIALS")
            {
                AuthError::InvalidCredentials
            } else {
                AuthError::Provider(code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_codes_map_to_the_taxonomy() {
        let body = |code: &str| format!(r#"{{"error":{{"code":400,"message":"{}"}}}}"#, code);

        assert_eq!(parse_auth_error(&body("EMAIL_EXISTS")), AuthError::EmailTaken);
        assert_eq!(
            parse_auth_error(&body("WEAK_PASSWORD : Password should be at least 6 characters")),
            AuthError::WeakPassword
        );
        assert_eq!(parse_auth_error(&body("INVALID_PASSWORD")), AuthError::InvalidCredentials);
        assert_eq!(parse_auth_error(&body("EMAIL_NOT_FOUND")), AuthError::InvalidCredentials);
        assert_eq!(
            parse_auth_error(&body("INVALID_LOGIN_CREDENTIALS")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn unknown_codes_surface_verbatim() {
        let error = parse_auth_error(r#"{"error":{"message":"TOO_MANY_ATTEMPTS_TRY_LATER"}}"#);
        assert_eq!(error, AuthError::Provider("TOO_MANY_ATTEMPTS_TRY_LATER".to_string()));
        assert_eq!(error.to_string(), "TOO_MANY_ATTEMPTS_TRY_LATER");
    }

    #[test]
    fn garbage_bodies_still_produce_a_message() {
        match parse_auth_error("not json at all") {
            AuthError::Provider(message) => assert!(message.contains("not json at all")),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
