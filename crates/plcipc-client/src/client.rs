//! IPC client handle
//!
//! The client owns the transport binding and the subscription scheduler.
//! The scheduler only runs while at least one server-event or variable
//! subscription exists; it is torn down as soon as both sets empty out and
//! restarted lazily when a subscription appears again.
//!
//! Spawning the scheduler uses the ambient tokio runtime, so subscription
//! calls must happen inside one. Plain get/set/register calls have no such
//! requirement.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plcipc_conv::VarKind;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{IpcError, IpcResult};
use crate::retry::retry_while_pending;
use crate::scheduler::{self, ServerEvent};
use crate::transport::{ResultCode, Transport};
use crate::variable::{VarInner, Variable};

/// Callback invoked when the runtime's program starts or stops.
pub(crate) type EventCallback = Arc<dyn Fn(ServerEvent) + Send + Sync>;

/// Handle to one server-event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventSubscription(u64);

/// Client for the runtime's variable IPC channel.
///
/// Cloning shares the same underlying connection and scheduler.
#[derive(Clone)]
pub struct IpcClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for IpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcClient").finish_non_exhaustive()
    }
}

pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) poll_interval: Duration,
    type_query_timeout: Duration,
    closed: AtomicBool,
    pub(crate) subs: Mutex<SubscriptionState>,
}

#[derive(Default)]
pub(crate) struct SubscriptionState {
    pub(crate) event_subs: HashMap<u64, EventCallback>,
    pub(crate) event_removals: HashSet<u64>,
    pub(crate) var_subs: Vec<Arc<VarInner>>,
    pub(crate) var_removals: Vec<Arc<VarInner>>,
    pub(crate) scheduler: Option<JoinHandle<()>>,
    pub(crate) server_was_running: Option<bool>,
    next_event_id: u64,
}

impl IpcClient {
    /// Open the transport and start its background request processing.
    ///
    /// The subscription scheduler is not started here; it comes up with the
    /// first subscription.
    pub fn open(transport: Arc<dyn Transport>, config: ClientConfig) -> IpcResult<Self> {
        let wrap = |code: ResultCode| IpcError::Transport {
            code,
            message: transport.error_to_string(code),
        };

        transport
            .open(&config.request_path, &config.response_path)
            .map_err(wrap)?;
        transport
            .start_processing(config.poll_interval())
            .map_err(wrap)?;

        info!(
            request_path = %config.request_path,
            response_path = %config.response_path,
            poll_interval_ms = config.poll_interval_ms,
            "IPC client opened"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                poll_interval: config.poll_interval(),
                type_query_timeout: config.type_query_timeout(),
                closed: AtomicBool::new(false),
                subs: Mutex::new(SubscriptionState::default()),
            }),
        })
    }

    /// Query whether the runtime's program is currently executing.
    pub fn is_server_running(&self) -> IpcResult<bool> {
        self.inner.ensure_open()?;
        self.inner.server_running()
    }

    /// Register a variable with this client.
    ///
    /// Subscribes the name at the transport and binds the variable; on a
    /// subscribe failure the variable stays unbound.
    pub fn register(&self, variable: &Variable) -> IpcResult<()> {
        self.inner.ensure_open()?;
        variable.bind(&self.inner)?;
        debug!(name = variable.name(), "variable registered");
        Ok(())
    }

    /// Subscribe to transitions of the runtime's program state.
    pub fn subscribe_events(
        &self,
        callback: impl Fn(ServerEvent) + Send + Sync + 'static,
    ) -> IpcResult<EventSubscription> {
        self.inner.ensure_open()?;

        let mut subs = self.inner.subs.lock();
        let id = subs.next_event_id;
        subs.next_event_id += 1;
        subs.event_subs.insert(id, Arc::new(callback));
        self.inner.evaluate_scheduler(&mut subs);

        debug!(id, "server event subscription added");
        Ok(EventSubscription(id))
    }

    /// Remove a server-event subscription.
    ///
    /// Removal is deferred to the next scheduler tick; the callback may
    /// still fire during a tick that is already running.
    pub fn unsubscribe_events(&self, subscription: EventSubscription) {
        let mut subs = self.inner.subs.lock();
        subs.event_removals.insert(subscription.0);
        self.inner.evaluate_scheduler(&mut subs);
    }

    /// Resolve the runtime-side type of a variable name, polling until the
    /// reported wire code maps to a known kind or `timeout` passes.
    ///
    /// The name is subscribed at the transport first; the type answer may
    /// need several request/response cycles to arrive.
    pub fn resolve_kind_sync(&self, name: &str, timeout: Duration) -> IpcResult<VarKind> {
        self.inner.ensure_open()?;
        self.inner.subscribe_name(name)?;
        retry_while_pending(timeout, || {
            Ok(VarKind::from_wire_code(self.inner.var_type(name)?))
        })
    }

    /// [`resolve_kind_sync`](Self::resolve_kind_sync) with the configured
    /// default timeout.
    pub fn resolve_kind(&self, name: &str) -> IpcResult<VarKind> {
        self.resolve_kind_sync(name, self.inner.type_query_timeout)
    }

    /// Whether the subscription scheduler is currently running.
    pub fn scheduler_running(&self) -> bool {
        self.inner.subs.lock().scheduler.is_some()
    }

    /// Close the client: stop the scheduler, drop all subscriptions,
    /// release the transport.
    ///
    /// Closing twice is a no-op; any other operation on a closed client
    /// fails with [`IpcError::ClientClosed`].
    pub fn close(&self) -> IpcResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        {
            let mut subs = self.inner.subs.lock();
            if let Some(handle) = subs.scheduler.take() {
                handle.abort();
            }
            subs.event_subs.clear();
            subs.event_removals.clear();
            subs.var_subs.clear();
            subs.var_removals.clear();
        }

        self.inner
            .transport
            .close()
            .map_err(|c| self.inner.wrap_code(c))?;
        info!("IPC client closed");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }
}

impl ClientInner {
    pub(crate) fn ensure_open(&self) -> IpcResult<()> {
        if self.is_closed() {
            return Err(IpcError::ClientClosed);
        }
        Ok(())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn wrap_code(&self, code: ResultCode) -> IpcError {
        IpcError::Transport {
            code,
            message: self.transport.error_to_string(code),
        }
    }

    pub(crate) fn subscribe_name(&self, name: &str) -> IpcResult<()> {
        self.transport.subscribe(name).map_err(|c| self.wrap_code(c))
    }

    pub(crate) fn var_type(&self, name: &str) -> IpcResult<u8> {
        self.transport.var_type(name).map_err(|c| self.wrap_code(c))
    }

    pub(crate) fn var_get(&self, name: &str, capacity: usize) -> IpcResult<Vec<u8>> {
        self.transport
            .var_get(name, capacity)
            .map_err(|c| self.wrap_code(c))
    }

    pub(crate) fn var_set(&self, name: &str, data: &[u8]) -> IpcResult<()> {
        self.transport
            .var_set(name, data)
            .map_err(|c| self.wrap_code(c))
    }

    pub(crate) fn server_running(&self) -> IpcResult<bool> {
        self.transport
            .server_running()
            .map_err(|c| self.wrap_code(c))
    }

    /// Put a variable under scheduler control. Idempotent per variable.
    pub(crate) fn watch_variable(self: &Arc<Self>, var: Arc<VarInner>) {
        let mut subs = self.subs.lock();
        if !subs.var_subs.iter().any(|v| Arc::ptr_eq(v, &var)) {
            debug!(name = var.name(), "variable added to scheduler");
            subs.var_subs.push(var);
        }
        self.evaluate_scheduler(&mut subs);
    }

    /// Start or stop the scheduler task according to the active
    /// subscription sets.
    pub(crate) fn evaluate_scheduler(self: &Arc<Self>, subs: &mut SubscriptionState) {
        if subs.event_subs.is_empty() && subs.var_subs.is_empty() {
            if let Some(handle) = subs.scheduler.take() {
                handle.abort();
                debug!("subscription scheduler cancelled");
            }
        } else if subs.scheduler.is_none() {
            subs.scheduler = Some(scheduler::spawn(self.clone()));
        }
    }
}
