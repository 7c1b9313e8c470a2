//! HTTP API request handlers

use crate::api::validation::{parse_address, SimulateParams, ValidationError};
use crate::app::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use types::utils::generate_correlation_id;
use types::{FailureCode, SimulatorError};

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

/// Simulate a contract call
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimulateParams>, JsonRejection>,
) -> ApiResult {
    let request_id = generate_correlation_id();

    let Json(params) = payload.map_err(|rejection| {
        tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Rejected malformed simulation request");
        error_body(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            rejection.body_text(),
            json!({}),
        )
    })?;

    let request = params
        .into_request(state.default_chain_id())
        .map_err(|e| validation_error(&request_id, e))?;

    tracing::info!(
        request_id = %request_id,
        to = %request.to,
        chain_id = %request.chain_id,
        from = ?request.from,
        "Processing simulation request"
    );

    let chain_id = request.chain_id.clone();
    let outcome = with_deadline(&state, &chain_id, state.simulator.simulate(&request))
        .await
        .map_err(|e| simulator_error(&request_id, e))?;

    tracing::info!(
        request_id = %request_id,
        would_succeed = outcome.would_succeed(),
        gas_estimate = outcome.gas_estimate(),
        block_number = outcome.block_number(),
        "Simulation completed"
    );

    let body = serde_json::to_value(&outcome).map_err(|e| {
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            format!("Failed to serialize outcome: {}", e),
            json!({}),
        )
    })?;

    Ok((StatusCode::OK, Json(body)))
}

/// Describe the service and its supported chains
pub async fn describe(State(state): State<Arc<AppState>>) -> ApiResult {
    let description = state.simulator.describe();
    let body = serde_json::to_value(&description).map_err(|e| {
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            format!("Failed to serialize description: {}", e),
            json!({}),
        )
    })?;

    Ok((StatusCode::OK, Json(body)))
}

/// Current block height of a chain
pub async fn block_number(
    State(state): State<Arc<AppState>>,
    Path(chain_id): Path<String>,
) -> ApiResult {
    let request_id = generate_correlation_id();

    let block_number = with_deadline(&state, &chain_id, state.simulator.block_number(&chain_id))
        .await
        .map_err(|e| simulator_error(&request_id, e))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "chainId": chain_id,
            "blockNumber": block_number,
        })),
    ))
}

/// Native balance of an address, in wei
pub async fn balance(
    State(state): State<Arc<AppState>>,
    Path((chain_id, address)): Path<(String, String)>,
) -> ApiResult {
    let request_id = generate_correlation_id();

    let account = parse_address("address", &address).map_err(|e| validation_error(&request_id, e))?;

    let balance = with_deadline(&state, &chain_id, state.simulator.balance(account, &chain_id))
        .await
        .map_err(|e| simulator_error(&request_id, e))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "chainId": chain_id,
            "address": account.to_checksum(None),
            "balance": balance.to_string(),
        })),
    ))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult {
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "components": {
                "chains": state.simulator.registry().len(),
                "openConnections": state.simulator.connections().open_connections().await,
            }
        })),
    ))
}

/// Run `operation` under the configured simulation deadline
async fn with_deadline<T>(
    state: &AppState,
    chain_id: &str,
    operation: impl Future<Output = types::Result<T>>,
) -> types::Result<T> {
    let deadline = state.simulation_timeout();
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(SimulatorError::failure(
            FailureCode::Timeout,
            chain_id,
            format!("Operation timed out after {}s", deadline.as_secs()),
        )),
    }
}

/// HTTP status for a simulator error
pub fn status_for(err: &SimulatorError) -> StatusCode {
    match err {
        SimulatorError::ChainNotSupported { .. } => StatusCode::BAD_REQUEST,
        SimulatorError::SimulationFailure {
            code: FailureCode::Timeout,
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        SimulatorError::SimulationFailure { .. } => StatusCode::BAD_GATEWAY,
        SimulatorError::Config(_) | SimulatorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn simulator_error(request_id: &str, err: SimulatorError) -> (StatusCode, Json<Value>) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(request_id = %request_id, code = err.code(), error = %err, "Request failed");
    } else {
        tracing::warn!(request_id = %request_id, code = err.code(), error = %err, "Request rejected");
    }

    error_body(
        status,
        err.code(),
        err.to_string(),
        json!({ "chainId": err.chain_id() }),
    )
}

fn validation_error(request_id: &str, err: ValidationError) -> (StatusCode, Json<Value>) {
    tracing::warn!(request_id = %request_id, field = err.field, error = %err, "Request validation failed");
    error_body(
        StatusCode::BAD_REQUEST,
        "INVALID_REQUEST",
        err.to_string(),
        json!({ "field": err.field }),
    )
}

fn error_body(
    status: StatusCode,
    code: &str,
    reason: impl Into<String>,
    data: Value,
) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "status": "error",
            "wouldSucceed": false,
            "reason": reason.into(),
            "code": code,
            "data": data,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unsupported = SimulatorError::ChainNotSupported {
            chain_id: "999".to_string(),
        };
        assert_eq!(status_for(&unsupported), StatusCode::BAD_REQUEST);

        let timeout = SimulatorError::failure(FailureCode::Timeout, "1", "slow");
        assert_eq!(status_for(&timeout), StatusCode::GATEWAY_TIMEOUT);

        let unreachable = SimulatorError::failure(FailureCode::SimulationError, "1", "refused");
        assert_eq!(status_for(&unreachable), StatusCode::BAD_GATEWAY);

        let internal = SimulatorError::Internal("boom".to_string());
        assert_eq!(status_for(&internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let err = SimulatorError::failure(FailureCode::BlockNumberError, "137", "refused");
        let (status, Json(body)) = simulator_error("req-1", err);

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["status"], "error");
        assert_eq!(body["wouldSucceed"], false);
        assert_eq!(body["code"], "BLOCK_NUMBER_ERROR");
        assert_eq!(body["data"]["chainId"], "137");
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let mut config = config::Config::default();
        config.simulation.timeout_seconds = 1;
        let state = AppState::new(config);

        let slow = async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok::<u64, SimulatorError>(1)
        };
        let err = with_deadline(&state, "1", slow).await.unwrap_err();
        assert_eq!(err.code(), "TIMEOUT");
        assert_eq!(status_for(&err), StatusCode::GATEWAY_TIMEOUT);
    }
}
