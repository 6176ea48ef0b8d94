//! Shared client registry
//!
//! Hosts that instantiate many independent consumers (one per flow node,
//! panel widget, or similar) must still share one IPC connection per
//! runtime. The registry hands out a reference-counted shared client: the
//! first acquire opens it, later acquires with the same settings reuse it,
//! and the underlying client is really closed only when every acquire has
//! been released.
//!
//! The registry is an explicit value the host owns and can inject for
//! testing; there is no process-global state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::client::IpcClient;
use crate::config::ClientConfig;
use crate::error::{IpcError, IpcResult};
use crate::transport::Transport;

/// Reference-counted single-instance registry for [`IpcClient`].
#[derive(Default)]
pub struct ClientRegistry {
    slot: Mutex<Option<SharedEntry>>,
}

struct SharedEntry {
    config: ClientConfig,
    client: IpcClient,
    refs: usize,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Acquire the shared client for `config`.
    ///
    /// The first acquire opens the client on `transport`; later acquires
    /// ignore the transport argument and must pass identical settings, or
    /// they fail with [`IpcError::SharedConfigMismatch`].
    pub fn acquire(
        &self,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> IpcResult<IpcClient> {
        let mut slot = self.slot.lock();
        match slot.as_mut() {
            None => {
                let client = IpcClient::open(transport, config.clone())?;
                *slot = Some(SharedEntry {
                    config,
                    client: client.clone(),
                    refs: 1,
                });
                debug!("shared client opened");
                Ok(client)
            }
            Some(entry) => {
                if entry.config != config {
                    return Err(IpcError::SharedConfigMismatch);
                }
                entry.refs += 1;
                debug!(refs = entry.refs, "shared client reused");
                Ok(entry.client.clone())
            }
        }
    }

    /// Release one acquire.
    ///
    /// The underlying client closes when the count reaches zero. Releasing
    /// with nothing open fails with [`IpcError::SharedNotOpen`]; the count
    /// can never go negative.
    pub fn release(&self) -> IpcResult<()> {
        let mut slot = self.slot.lock();
        let entry = slot.as_mut().ok_or(IpcError::SharedNotOpen)?;
        entry.refs -= 1;

        if entry.refs == 0 {
            if let Some(entry) = slot.take() {
                entry.client.close()?;
                debug!("shared client closed");
            }
        }
        Ok(())
    }

    /// Current number of outstanding acquires.
    pub fn ref_count(&self) -> usize {
        self.slot.lock().as_ref().map_or(0, |entry| entry.refs)
    }

    /// Whether a shared client is currently open.
    pub fn is_open(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, ResultCode};

    fn config() -> ClientConfig {
        ClientConfig::new("/run/plc/req", "/run/plc/resp")
    }

    #[test]
    fn test_same_config_shares_one_client() {
        let transport = Arc::new(MockTransport::new());
        let registry = ClientRegistry::new();

        let first = registry.acquire(transport.clone(), config()).unwrap();
        let second = registry.acquire(transport.clone(), config()).unwrap();
        assert_eq!(registry.ref_count(), 2);

        // Same underlying handle: closing one closes both views.
        first.close().unwrap();
        assert!(second.is_server_running().is_err());
        assert_eq!(transport.close_calls(), 1);
    }

    #[test]
    fn test_release_closes_only_at_zero() {
        let transport = Arc::new(MockTransport::new());
        let registry = ClientRegistry::new();

        let _a = registry.acquire(transport.clone(), config()).unwrap();
        let _b = registry.acquire(transport.clone(), config()).unwrap();

        registry.release().unwrap();
        assert_eq!(registry.ref_count(), 1);
        assert_eq!(transport.close_calls(), 0);

        registry.release().unwrap();
        assert_eq!(registry.ref_count(), 0);
        assert!(!registry.is_open());
        assert_eq!(transport.close_calls(), 1);

        // One release too many is an error, not a negative count.
        assert!(matches!(registry.release(), Err(IpcError::SharedNotOpen)));
    }

    #[test]
    fn test_different_config_while_open_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let registry = ClientRegistry::new();

        let _a = registry.acquire(transport.clone(), config()).unwrap();
        let other = ClientConfig::new("/run/other/req", "/run/other/resp");
        assert!(matches!(
            registry.acquire(transport.clone(), other.clone()),
            Err(IpcError::SharedConfigMismatch)
        ));

        // After full release the registry accepts new settings.
        registry.release().unwrap();
        let _b = registry.acquire(transport, other).unwrap();
        assert_eq!(registry.ref_count(), 1);
    }

    #[test]
    fn test_failed_open_leaves_registry_empty() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_open(ResultCode::SocketConnect);
        let registry = ClientRegistry::new();

        assert!(registry.acquire(transport.clone(), config()).is_err());
        assert!(!registry.is_open());

        // The next acquire may try again.
        let _client = registry.acquire(transport, config()).unwrap();
        assert_eq!(registry.ref_count(), 1);
    }
}
