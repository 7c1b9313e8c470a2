//! JSON-RPC node client backed by an alloy HTTP provider

use crate::node_error::NodeError;
use crate::traits::{CallRequest, ConnectionHandle, NodeClient, NodeConnector};
use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::transports::http::{Client, Http};
use alloy::transports::{RpcError as TransportRpcError, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use types::utils::redact_url;
use types::{ChainProfile, FailureCode, Result, SimulatorError};

/// Node client speaking JSON-RPC over HTTP
#[derive(Debug, Clone)]
pub struct AlloyNodeClient {
    provider: RootProvider<Http<Client>>,
    endpoint: String,
}

impl AlloyNodeClient {
    /// Build a client for the profile's endpoint. No request is sent.
    pub fn new(profile: &ChainProfile) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(profile.rpc_url.parse().map_err(|_| {
            SimulatorError::failure(
                FailureCode::ConnectionError,
                &profile.chain_id,
                format!("Invalid RPC URL: {}", redact_url(&profile.rpc_url)),
            )
        })?);

        Ok(Self {
            provider,
            endpoint: profile.rpc_url.clone(),
        })
    }

    fn transaction(call: &CallRequest) -> TransactionRequest {
        TransactionRequest::default()
            .to(call.to)
            .from(call.from)
            .value(call.value)
            .input(TransactionInput::from(call.data.clone()))
    }
}

#[async_trait]
impl NodeClient for AlloyNodeClient {
    async fn block_number(&self) -> std::result::Result<u64, NodeError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> std::result::Result<u64, NodeError> {
        let tx = Self::transaction(call);
        let gas = self.provider.estimate_gas(&tx).await?;
        Ok(u64::try_from(gas).unwrap_or(u64::MAX))
    }

    async fn call(
        &self,
        call: &CallRequest,
        block: BlockNumberOrTag,
    ) -> std::result::Result<Bytes, NodeError> {
        let tx = Self::transaction(call);
        Ok(self.provider.call(&tx).block(BlockId::from(block)).await?)
    }

    async fn balance(&self, address: Address) -> std::result::Result<U256, NodeError> {
        Ok(self.provider.get_balance(address).await?)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Opens [`AlloyNodeClient`] connections
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl NodeConnector for HttpConnector {
    fn connect(&self, profile: &ChainProfile) -> Result<ConnectionHandle> {
        Ok(Arc::new(AlloyNodeClient::new(profile)?))
    }
}

impl From<TransportError> for NodeError {
    fn from(err: TransportError) -> Self {
        match &err {
            TransportRpcError::ErrorResp(payload) => {
                let error = NodeError::new(payload.message.to_string()).with_code(payload.code);
                match payload.data.as_deref() {
                    Some(raw) => attach_error_data(error, raw.get()),
                    None => error,
                }
            }
            TransportRpcError::DeserError { text, .. } => {
                parse_error_text(text).unwrap_or_else(|| NodeError::new(err.to_string()))
            }
            _ => NodeError::new(err.to_string()),
        }
    }
}

/// Place the raw `error.data` JSON where the diagnosis step looks for it
fn attach_error_data(error: NodeError, raw: &str) -> NodeError {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(data)) if data.starts_with("0x") => error.with_data(data),
        Ok(Value::String(text)) => error.with_reason(text),
        Ok(value @ Value::Object(_)) => error.with_nested(error_from_value(&value)),
        _ => error,
    }
}

fn error_from_value(value: &Value) -> NodeError {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut error = NodeError::new(message);

    if let Some(code) = value.get("code").and_then(Value::as_i64) {
        error = error.with_code(code);
    }
    if let Some(data) = value.get("data").and_then(Value::as_str) {
        error = error.with_data(data);
    }
    if let Some(reason) = value.get("reason").and_then(Value::as_str) {
        error = error.with_reason(reason);
    }
    error
}

fn parse_error_text(text: &str) -> Option<NodeError> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let body = parsed.get("error").unwrap_or(&parsed);
    body.get("message")?;
    Some(error_from_value(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use types::NativeCurrency;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Answers JSON-RPC requests with a fixed result or error per method
    struct RpcResponder {
        results: Vec<(&'static str, Value)>,
        errors: Vec<(&'static str, Value)>,
    }

    impl Respond for RpcResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let id = body["id"].clone();
            let rpc_method = body["method"].as_str().unwrap_or_default();

            if let Some((_, error)) = self.errors.iter().find(|(m, _)| *m == rpc_method) {
                return ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": id, "error": error}));
            }
            let result = self
                .results
                .iter()
                .find(|(m, _)| *m == rpc_method)
                .map(|(_, r)| r.clone())
                .unwrap_or(Value::Null);
            ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
        }
    }

    fn profile(url: &str) -> ChainProfile {
        ChainProfile {
            chain_id: "31337".to_string(),
            name: "Anvil".to_string(),
            rpc_url: url.to_string(),
            native_currency: NativeCurrency::new("Ether", "ETH", 18),
        }
    }

    async fn mock_node(responder: RpcResponder) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(responder)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_reads_block_gas_and_balance() {
        let server = mock_node(RpcResponder {
            results: vec![
                ("eth_blockNumber", json!("0x10")),
                ("eth_estimateGas", json!("0x5208")),
                ("eth_getBalance", json!("0xde0b6b3a7640000")),
                ("eth_call", json!("0x01")),
            ],
            errors: vec![],
        })
        .await;
        let client = AlloyNodeClient::new(&profile(&server.uri())).unwrap();
        let call = CallRequest {
            to: Address::repeat_byte(0x11),
            data: Bytes::new(),
            from: Address::ZERO,
            value: U256::ZERO,
        };

        assert_eq!(client.block_number().await.unwrap(), 16);
        assert_eq!(client.estimate_gas(&call).await.unwrap(), 21_000);
        assert_eq!(
            client.balance(Address::repeat_byte(0x22)).await.unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            client.call(&call, BlockNumberOrTag::Number(12)).await.unwrap(),
            Bytes::from(vec![0x01])
        );
    }

    #[tokio::test]
    async fn test_error_response_carries_code_and_data() {
        let server = mock_node(RpcResponder {
            results: vec![],
            errors: vec![(
                "eth_call",
                json!({"code": 3, "message": "execution reverted: nope", "data": "0x08c379a0"}),
            )],
        })
        .await;
        let client = AlloyNodeClient::new(&profile(&server.uri())).unwrap();
        let call = CallRequest {
            to: Address::repeat_byte(0x11),
            data: Bytes::new(),
            from: Address::ZERO,
            value: U256::ZERO,
        };

        let err = client.call(&call, BlockNumberOrTag::Latest).await.unwrap_err();
        assert_eq!(err.code, Some(3));
        assert_eq!(err.message, "execution reverted: nope");
        assert_eq!(err.data.as_deref(), Some("0x08c379a0"));
    }

    #[test]
    fn test_invalid_url_is_connection_error() {
        let err = AlloyNodeClient::new(&profile("not a url")).unwrap_err();
        assert_eq!(err.code(), "CONNECTION_ERROR");
        assert_eq!(err.chain_id(), Some("31337"));
    }

    #[test]
    fn test_error_data_placement() {
        let base = || NodeError::new("execution reverted").with_code(3);

        let error = attach_error_data(base(), r#""0x4e487b71""#);
        assert_eq!(error.direct_payload(), Some("0x4e487b71"));

        let error = attach_error_data(base(), r#""reverted: paused""#);
        assert_eq!(error.reason.as_deref(), Some("reverted: paused"));

        let error = attach_error_data(base(), r#"{"message": "inner", "data": "0x12345678ab"}"#);
        assert_eq!(error.nested_payload(), Some("0x12345678ab"));
    }

    #[test]
    fn test_parse_error_text() {
        let error = parse_error_text(r#"{"error": {"code": -32000, "message": "nonce too low"}}"#).unwrap();
        assert_eq!(error.code, Some(-32000));
        assert_eq!(error.message, "nonce too low");

        assert!(parse_error_text("<html>bad gateway</html>").is_none());
    }
}
