//! The Dispatcher: decode, validate and route transactions.
//!
//! A transaction goes through the same steps on check and on deliver:
//!
//! 1. Size limit on the raw bytes
//! 2. Canonical decode of the envelope
//! 3. Resolve the message (unknown kinds are rejected here)
//! 4. Field validation, when enabled
//! 5. Route by message path to a registered [`Handler`]
//!
//! Only the last step differs: check calls [`Handler::check`], deliver calls
//! [`Handler::deliver`].

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use ledger_tx_core::{decode_tx, Message, Msg, Tx};

use crate::error::{DispatchError, Result};

/// Configuration for the Dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Largest raw transaction accepted, in bytes.
    pub max_tx_bytes: usize,
    /// Whether to run field validation before routing.
    pub validate_messages: bool,
    /// Upper bound on a single handler call. `None` waits forever.
    pub handler_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_tx_bytes: 64 * 1024,
            validate_messages: true,
            handler_timeout: None,
        }
    }
}

/// Output of a delivered transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverResult {
    /// Opaque result data returned to the client.
    pub data: Bytes,
    /// Human-readable log line.
    pub log: String,
}

/// Executes one kind of message. Implemented by the execution engine.
///
/// The message handed in has already passed decoding and, unless disabled in
/// the config, validation.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Cheap admission check. Accepts everything by default.
    async fn check(&self, tx: &Tx, msg: &Msg) -> anyhow::Result<()> {
        let _ = (tx, msg);
        Ok(())
    }

    /// Execute the message.
    async fn deliver(&self, tx: &Tx, msg: &Msg) -> anyhow::Result<DeliverResult>;
}

/// Maps message paths to handlers.
#[derive(Clone, Default)]
pub struct Router {
    routes: BTreeMap<&'static str, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a path. Each path takes exactly one handler.
    pub fn handle(&mut self, path: &'static str, handler: Arc<dyn Handler>) -> Result<()> {
        if self.routes.contains_key(path) {
            return Err(DispatchError::DuplicateRoute(path.to_string()));
        }
        self.routes.insert(path, handler);
        Ok(())
    }

    /// Register a handler for the path of message type `M`.
    pub fn route<M: Message>(&mut self, handler: Arc<dyn Handler>) -> Result<()> {
        self.handle(M::PATH, handler)
    }

    /// Look up the handler for a path.
    pub fn handler(&self, path: &str) -> Result<&Arc<dyn Handler>> {
        self.routes
            .get(path)
            .ok_or_else(|| DispatchError::NoRoute(path.to_string()))
    }

    /// Registered paths, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("paths", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The main Dispatcher struct.
///
/// Holds only immutable state, so one instance can be shared across tasks
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(router: Router, config: DispatcherConfig) -> Self {
        Self { router, config }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Decode and validate a transaction, then ask its handler to admit it.
    ///
    /// Returns the decoded transaction on success.
    pub async fn check_tx(&self, raw: &[u8]) -> Result<Tx> {
        let result = self.check_inner(raw).await;
        match &result {
            Ok(tx) => debug!(
                size = raw.len(),
                tag = tx.sum().tag(),
                signers = tx.signatures().len(),
                "check accepted"
            ),
            Err(err) => warn!(size = raw.len(), error = %err, "check rejected"),
        }
        result
    }

    /// Decode and validate a transaction, then execute it.
    pub async fn deliver_tx(&self, raw: &[u8]) -> Result<DeliverResult> {
        let result = self.deliver_inner(raw).await;
        match &result {
            Ok(res) => debug!(size = raw.len(), log = %res.log, "deliver accepted"),
            Err(err) => warn!(size = raw.len(), error = %err, "deliver rejected"),
        }
        result
    }

    async fn check_inner(&self, raw: &[u8]) -> Result<Tx> {
        let tx = self.prepare(raw)?;
        let msg = tx.get_msg()?;
        let handler = self.router.handler(msg.path())?;
        self.call(msg.path(), handler.check(&tx, msg)).await?;
        Ok(tx)
    }

    async fn deliver_inner(&self, raw: &[u8]) -> Result<DeliverResult> {
        let tx = self.prepare(raw)?;
        let msg = tx.get_msg()?;
        let handler = self.router.handler(msg.path())?;
        self.call(msg.path(), handler.deliver(&tx, msg)).await
    }

    /// Size limit, decode, message resolution and validation.
    fn prepare(&self, raw: &[u8]) -> Result<Tx> {
        if raw.len() > self.config.max_tx_bytes {
            return Err(DispatchError::TxTooLarge {
                size: raw.len(),
                max: self.config.max_tx_bytes,
            });
        }

        let tx = decode_tx(raw)?;
        let msg = tx.get_msg()?;
        if self.config.validate_messages {
            msg.validate()?;
            if let Some(fees) = tx.fees() {
                fees.validate()?;
            }
        }
        Ok(tx)
    }

    async fn call<T, F>(&self, path: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let output = match self.config.handler_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| DispatchError::HandlerTimeout { path, timeout })?,
            None => fut.await,
        };
        output.map_err(DispatchError::Handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_tx_core::msg::{IssueTokenMsg, ReturnEscrowMsg};

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn deliver(&self, _tx: &Tx, msg: &Msg) -> anyhow::Result<DeliverResult> {
            Ok(DeliverResult {
                data: Bytes::from(msg.path()),
                log: format!("tag {}", msg.tag()),
            })
        }
    }

    fn return_escrow_bytes() -> Vec<u8> {
        Tx::new(ReturnEscrowMsg {
            escrow_id: Bytes::from_static(&[0, 0, 0, 0, 0, 0, 0, 1]),
        })
        .encode()
        .unwrap()
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut router = Router::new();
        router.route::<ReturnEscrowMsg>(Arc::new(Echo)).unwrap();
        let err = router.route::<ReturnEscrowMsg>(Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateRoute(p) if p == "escrow/return"));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_paths_sorted() {
        let mut router = Router::new();
        router.route::<ReturnEscrowMsg>(Arc::new(Echo)).unwrap();
        router.route::<IssueTokenMsg>(Arc::new(Echo)).unwrap();
        let paths: Vec<_> = router.paths().collect();
        assert_eq!(paths, vec!["escrow/return", "nft/username/issue"]);
    }

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.max_tx_bytes, 65536);
        assert!(config.validate_messages);
        assert!(config.handler_timeout.is_none());
    }

    #[tokio::test]
    async fn test_deliver_routes_by_path() {
        let mut router = Router::new();
        router.route::<ReturnEscrowMsg>(Arc::new(Echo)).unwrap();
        let dispatcher = Dispatcher::new(router, DispatcherConfig::default());

        let res = dispatcher.deliver_tx(&return_escrow_bytes()).await.unwrap();
        assert_eq!(&res.data[..], b"escrow/return");
        assert_eq!(res.log, "tag 6");
    }

    #[tokio::test]
    async fn test_default_check_accepts() {
        let mut router = Router::new();
        router.route::<ReturnEscrowMsg>(Arc::new(Echo)).unwrap();
        let dispatcher = Dispatcher::new(router, DispatcherConfig::default());

        let tx = dispatcher.check_tx(&return_escrow_bytes()).await.unwrap();
        assert!(matches!(tx.get_msg().unwrap(), Msg::ReturnEscrow(_)));
    }

    #[tokio::test]
    async fn test_no_route() {
        let dispatcher = Dispatcher::new(Router::new(), DispatcherConfig::default());
        let err = dispatcher.check_tx(&return_escrow_bytes()).await.unwrap_err();
        assert!(matches!(err, DispatchError::NoRoute(p) if p == "escrow/return"));
    }

    #[tokio::test]
    async fn test_size_limit_checked_before_decode() {
        let config = DispatcherConfig {
            max_tx_bytes: 4,
            ..DispatcherConfig::default()
        };
        let dispatcher = Dispatcher::new(Router::new(), config);
        let err = dispatcher.check_tx(&[0xff; 5]).await.unwrap_err();
        assert!(matches!(err, DispatchError::TxTooLarge { size: 5, max: 4 }));
    }
}
