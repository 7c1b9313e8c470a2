//! Per-chain connection cache
//!
//! One live [`ConnectionHandle`] per chain identifier. The first
//! `acquire` for a chain opens the connection; concurrent first callers
//! wait on the same slot and all receive the winner's handle. Chains never
//! block each other beyond the brief map lookup.

use crate::registry::ChainRegistry;
use crate::traits::{ConnectionHandle, NodeConnector};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};
use types::Result;
use types::utils::redact_url;

type Slot = Arc<OnceCell<ConnectionHandle>>;

/// Memoises node connections by chain identifier
#[derive(Debug)]
pub struct ConnectionCache {
    registry: Arc<ChainRegistry>,
    connector: Arc<dyn NodeConnector>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ConnectionCache {
    pub fn new(registry: Arc<ChainRegistry>, connector: Arc<dyn NodeConnector>) -> Self {
        Self {
            registry,
            connector,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Connection for `chain_id`, opened on first use
    pub async fn acquire(&self, chain_id: &str) -> Result<ConnectionHandle> {
        let profile = self.registry.resolve(chain_id)?;

        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(chain_id.to_string()).or_default().clone()
        };

        let handle = slot
            .get_or_try_init(|| async {
                info!(
                    chain_id = %profile.chain_id,
                    endpoint = %redact_url(&profile.rpc_url),
                    "Opening node connection"
                );
                self.connector.connect(profile)
            })
            .await?;

        debug!(chain_id, endpoint = %redact_url(handle.endpoint()), "Using cached node connection");
        Ok(handle.clone())
    }

    /// Number of chains with an open connection
    pub async fn open_connections(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_error::NodeError;
    use crate::traits::{CallRequest, NodeClient};
    use alloy::eips::BlockNumberOrTag;
    use alloy::primitives::{Address, Bytes, U256};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::{ChainProfile, FailureCode, NativeCurrency, SimulatorError};

    #[derive(Debug)]
    struct IdleNode {
        endpoint: String,
    }

    #[async_trait]
    impl NodeClient for IdleNode {
        async fn block_number(&self) -> std::result::Result<u64, NodeError> {
            Ok(1)
        }

        async fn estimate_gas(&self, _call: &CallRequest) -> std::result::Result<u64, NodeError> {
            Ok(21_000)
        }

        async fn call(
            &self,
            _call: &CallRequest,
            _block: BlockNumberOrTag,
        ) -> std::result::Result<Bytes, NodeError> {
            Ok(Bytes::new())
        }

        async fn balance(&self, _address: Address) -> std::result::Result<U256, NodeError> {
            Ok(U256::ZERO)
        }

        fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    #[derive(Debug, Default)]
    struct CountingConnector {
        opened: AtomicUsize,
        fail: bool,
    }

    impl NodeConnector for CountingConnector {
        fn connect(&self, profile: &ChainProfile) -> Result<ConnectionHandle> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SimulatorError::failure(
                    FailureCode::ConnectionError,
                    &profile.chain_id,
                    "refused",
                ));
            }
            Ok(Arc::new(IdleNode {
                endpoint: profile.rpc_url.clone(),
            }))
        }
    }

    fn registry() -> Arc<ChainRegistry> {
        let profiles = ["1", "137"]
            .iter()
            .map(|id| ChainProfile {
                chain_id: id.to_string(),
                name: format!("Chain {}", id),
                rpc_url: format!("http://localhost:8545/{}", id),
                native_currency: NativeCurrency::new("Ether", "ETH", 18),
            })
            .collect();
        Arc::new(ChainRegistry::new(profiles))
    }

    #[tokio::test]
    async fn test_same_chain_returns_same_handle() {
        let connector = Arc::new(CountingConnector::default());
        let cache = ConnectionCache::new(registry(), connector.clone());

        let first = cache.acquire("1").await.unwrap();
        let second = cache.acquire("1").await.unwrap();
        let other = cache.acquire("137").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(connector.opened.load(Ordering::SeqCst), 2);
        assert_eq!(cache.open_connections().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_opens_once() {
        let connector = Arc::new(CountingConnector::default());
        let cache = Arc::new(ConnectionCache::new(registry(), connector.clone()));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.acquire("1").await })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap().unwrap());
        }

        assert_eq!(connector.opened.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[tokio::test]
    async fn test_unknown_chain_is_not_cached() {
        let connector = Arc::new(CountingConnector::default());
        let cache = ConnectionCache::new(registry(), connector.clone());

        let err = cache.acquire("999").await.unwrap_err();
        assert_eq!(err.code(), "CHAIN_NOT_SUPPORTED");
        assert_eq!(connector.opened.load(Ordering::SeqCst), 0);
        assert_eq!(cache.open_connections().await, 0);
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried_on_next_acquire() {
        let connector = Arc::new(CountingConnector {
            opened: AtomicUsize::new(0),
            fail: true,
        });
        let cache = ConnectionCache::new(registry(), connector.clone());

        tokio_test::assert_err!(cache.acquire("1").await);
        tokio_test::assert_err!(cache.acquire("1").await);
        assert_eq!(connector.opened.load(Ordering::SeqCst), 2);
        assert_eq!(cache.open_connections().await, 0);
    }
}
