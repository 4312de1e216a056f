//! Spreadsheet import handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{extract_auth, AuthInfo};
use crate::services::error_log::ErrorLogService;
use crate::services::import::Importer;
use crate::services::persistence::{Actor, PersistenceContext, PgRecordStore};
use crate::types::{BatchResult, EntityKind, ErrorResponse, ImportFileRequest, Request, SuccessResponse};

const DEFAULT_ERROR_LIMIT: usize = 50;

/// Shared state of the import handlers
#[derive(Clone)]
pub struct ImportState {
    pub pool: PgPool,
    pub importer: Importer,
    pub errors: Arc<ErrorLogService>,
    pub jwt_secret: Arc<str>,
}

/// Query for recently logged import errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Check that the caller is signed in and allowed to run imports
fn authorize<T>(request: &Request<T>, jwt_secret: &str) -> Result<AuthInfo, ErrorResponse> {
    let auth = extract_auth(request, jwt_secret)
        .map_err(|e| ErrorResponse::new(request.id, "UNAUTHORIZED", e.to_string()))?;
    if !auth.can_import() {
        return Err(ErrorResponse::new(
            request.id,
            "FORBIDDEN",
            "Importing HR data requires the hr:import permission",
        ));
    }
    Ok(auth)
}

async fn publish<T: Serialize>(client: &Client, reply: async_nats::Subject, body: &T) -> Result<()> {
    if let Err(e) = client.publish(reply, serde_json::to_vec(body)?.into()).await {
        error!("Failed to publish reply: {}", e);
    }
    Ok(())
}

/// Run one import batch for an authorized caller
async fn run_import(state: &ImportState, kind: EntityKind, auth: &AuthInfo, file_url: &str) -> BatchResult {
    let store = match PgRecordStore::begin(&state.pool).await {
        Ok(store) => store,
        Err(e) => return state.importer.abort(kind, &e.to_string()),
    };

    // Desk imports are administrative: the caller's per-entity create
    // permissions are not checked row by row.
    let ctx = PersistenceContext::new(store, Actor::from_auth(auth)).ignore_permissions();

    match kind {
        EntityKind::GosiWorkerData => state.importer.import_gosi_worker_data(file_url, ctx).await,
        EntityKind::WorkerData => state.importer.import_worker_data(file_url, ctx).await,
    }
}

/// Handle hr.import.gosi / hr.import.worker messages
pub async fn handle_import(
    client: Client,
    mut subscriber: Subscriber,
    state: ImportState,
    kind: EntityKind,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received {} import message", kind.label());

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ImportFileRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse import request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                publish(&client, reply, &error).await?;
                continue;
            }
        };

        let auth = match authorize(&request, &state.jwt_secret) {
            Ok(auth) => auth,
            Err(error) => {
                warn!("Rejected {} import: {}", kind.label(), error.error.message);
                publish(&client, reply, &error).await?;
                continue;
            }
        };

        let file_url = request.payload.file_url.trim();
        if file_url.is_empty() {
            let error = ErrorResponse::new(request.id, "INVALID_REQUEST", "fileUrl is required");
            publish(&client, reply, &error).await?;
            continue;
        }

        info!("User {} importing {} from {}", auth.user_id, kind.label(), file_url);
        let result = run_import(&state, kind, &auth, file_url).await;

        let response = SuccessResponse::new(request.id, result);
        publish(&client, reply, &response).await?;
    }

    Ok(())
}

/// Handle hr.import.errors.list messages
pub async fn handle_list_errors(client: Client, mut subscriber: Subscriber, state: ImportState) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ErrorLogQuery> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse error log request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                publish(&client, reply, &error).await?;
                continue;
            }
        };

        if let Err(error) = authorize(&request, &state.jwt_secret) {
            publish(&client, reply, &error).await?;
            continue;
        }

        let limit = request.payload.limit.unwrap_or(DEFAULT_ERROR_LIMIT);
        let entries = state.errors.get_recent(request.payload.category.as_deref(), limit);
        let response = SuccessResponse::new(request.id, entries);
        publish(&client, reply, &response).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{token_for, TEST_SECRET};

    fn request(token: Option<String>) -> Request<()> {
        Request::new(token, ())
    }

    #[test]
    fn test_authorize_requires_token() {
        let err = authorize(&request(None), TEST_SECRET).unwrap_err();
        assert_eq!(err.error.code, "UNAUTHORIZED");
    }

    #[test]
    fn test_authorize_rejects_users_without_import_permission() {
        let token = token_for(Uuid::new_v4(), "user", &["hr:worker_data:create"], TEST_SECRET);
        let err = authorize(&request(Some(token)), TEST_SECRET).unwrap_err();
        assert_eq!(err.error.code, "FORBIDDEN");
    }

    #[test]
    fn test_authorize_accepts_importers_and_admins() {
        let token = token_for(Uuid::new_v4(), "user", &["hr:import"], TEST_SECRET);
        assert!(authorize(&request(Some(token)), TEST_SECRET).is_ok());

        let token = token_for(Uuid::new_v4(), "admin", &[], TEST_SECRET);
        assert!(authorize(&request(Some(token)), TEST_SECRET).is_ok());
    }

    #[test]
    fn test_error_log_query_defaults() {
        let query: ErrorLogQuery = serde_json::from_str("{}").unwrap();
        assert!(query.category.is_none());
        assert!(query.limit.is_none());

        let request: Request<ImportFileRequest> = serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "timestamp": "2024-12-14T08:00:00Z",
            "payload": { "fileUrl": "/files/gosi.xlsx" }
        }))
        .unwrap();
        assert_eq!(request.payload.file_url, "/files/gosi.xlsx");
        assert!(request.token.is_none());
    }
}
