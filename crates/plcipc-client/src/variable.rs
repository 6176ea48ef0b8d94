//! Typed process variables
//!
//! A [`Variable`] is a cheap-to-clone handle bound to one named variable of
//! the runtime. It is created unbound; [`IpcClient::register`] binds it to a
//! client, after which get/set and subscriptions become available. One
//! variable type covers all supported kinds, dispatching on the static
//! [`TypeDescriptor`](plcipc_conv::TypeDescriptor) instead of a class
//! hierarchy.
//!
//! [`IpcClient::register`]: crate::client::IpcClient::register

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use plcipc_conv::{decode, encode, VarKind, VarValue};
use tracing::debug;

use crate::client::ClientInner;
use crate::error::{IpcError, IpcResult};
use crate::retry::retry_while_pending;

/// One-shot callback invoked when the remote type check resolves.
pub(crate) type TypeMatchCallback = Box<dyn FnOnce(&Variable, bool, Option<&IpcError>) + Send>;

struct Subscriber {
    on_value: Box<dyn Fn(&Variable, &VarValue) + Send + Sync>,
    on_error: Box<dyn Fn(&Variable, &IpcError) + Send + Sync>,
}

/// Handle to one persistent value/error subscription on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarSubscription(u64);

/// A typed handle to a named process variable.
#[derive(Clone)]
pub struct Variable {
    pub(crate) inner: Arc<VarInner>,
}

pub(crate) struct VarInner {
    name: String,
    kind: VarKind,
    state: Mutex<VarState>,
}

#[derive(Default)]
struct VarState {
    client: Option<Weak<ClientInner>>,
    last_value: Option<VarValue>,
    last_error: Option<IpcError>,
    type_match: Vec<TypeMatchCallback>,
    subscribers: HashMap<u64, Arc<Subscriber>>,
    pending_removals: HashSet<u64>,
    next_id: u64,
}

impl Variable {
    /// Create an unbound variable handle.
    pub fn new(name: impl Into<String>, kind: VarKind) -> Self {
        Self {
            inner: Arc::new(VarInner {
                name: name.into(),
                kind,
                state: Mutex::new(VarState::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> VarKind {
        self.inner.kind
    }

    /// Read the variable's current value.
    ///
    /// May fail with a pending error while the read request is still
    /// travelling; [`get_sync`](Self::get_sync) wraps the retry. The remote
    /// type is checked before any value byte is interpreted.
    pub fn get(&self) -> IpcResult<VarValue> {
        let client = self.client()?;
        client.ensure_open()?;
        self.get_with(&client)
    }

    /// Write a new value.
    ///
    /// The value is validated locally (kind, numeric range, string size)
    /// before any transport traffic, then the remote type is checked, then
    /// the encoded bytes are written. The write takes effect on the server
    /// over the next request/response cycle.
    pub fn set(&self, value: impl Into<VarValue>) -> IpcResult<()> {
        let value = value.into();
        let client = self.client()?;
        client.ensure_open()?;

        let desc = self.inner.kind.descriptor();
        let bytes = encode(desc, &value)?;

        self.check_type_with(&client)?;
        client.var_set(&self.inner.name, &bytes)
    }

    /// Read the value, retrying through pending results until `timeout`.
    pub fn get_sync(&self, timeout: Duration) -> IpcResult<VarValue> {
        retry_while_pending(timeout, || self.get().map(Some))
    }

    /// Subscribe to value changes and errors of this variable.
    ///
    /// Callbacks fire from the client's scheduler tick, only when the value
    /// (by equality) or the error (by kind and message) differs from the
    /// previous tick. The returned handle is used to unsubscribe.
    pub fn subscribe(
        &self,
        on_value: impl Fn(&Variable, &VarValue) + Send + Sync + 'static,
        on_error: impl Fn(&Variable, &IpcError) + Send + Sync + 'static,
    ) -> IpcResult<VarSubscription> {
        let client = self.client()?;
        client.ensure_open()?;

        let id = {
            let mut state = self.inner.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.subscribers.insert(
                id,
                Arc::new(Subscriber {
                    on_value: Box::new(on_value),
                    on_error: Box::new(on_error),
                }),
            );
            id
        };

        client.watch_variable(self.inner.clone());
        debug!(name = self.name(), id, "variable subscription added");
        Ok(VarSubscription(id))
    }

    /// Remove a subscription.
    ///
    /// Removal is deferred: the subscription may still fire during the tick
    /// that is running when this is called, and is excluded from the next
    /// tick on.
    pub fn unsubscribe(&self, subscription: VarSubscription) {
        self.inner
            .state
            .lock()
            .pending_removals
            .insert(subscription.0);
    }

    /// Register a one-shot callback for the outcome of the remote type
    /// check.
    ///
    /// The callback fires from the scheduler on the first tick where the
    /// type query resolves, with `true` and no error on a match, or `false`
    /// and the failure otherwise.
    pub fn subscribe_type_match(
        &self,
        callback: impl FnOnce(&Variable, bool, Option<&IpcError>) + Send + 'static,
    ) -> IpcResult<()> {
        let client = self.client()?;
        client.ensure_open()?;

        self.inner.state.lock().type_match.push(Box::new(callback));
        client.watch_variable(self.inner.clone());
        Ok(())
    }

    fn client(&self) -> IpcResult<Arc<ClientInner>> {
        let weak = self.inner.state.lock().client.clone();
        let weak = weak.ok_or_else(|| IpcError::NotRegistered {
            name: self.inner.name.clone(),
        })?;
        weak.upgrade().ok_or(IpcError::ClientClosed)
    }

    /// Bind this variable to a client. Called from `IpcClient::register`
    /// after the transport subscribe succeeded; on subscribe failure the
    /// variable stays unbound.
    pub(crate) fn bind(&self, client: &Arc<ClientInner>) -> IpcResult<()> {
        {
            let state = self.inner.state.lock();
            if let Some(weak) = &state.client {
                if let Some(existing) = weak.upgrade() {
                    if !Arc::ptr_eq(&existing, client) && !existing.is_closed() {
                        return Err(IpcError::AlreadyRegistered {
                            name: self.inner.name.clone(),
                        });
                    }
                }
            }
        }

        client.subscribe_name(&self.inner.name)?;
        self.inner.state.lock().client = Some(Arc::downgrade(client));
        Ok(())
    }

    pub(crate) fn get_with(&self, client: &ClientInner) -> IpcResult<VarValue> {
        self.check_type_with(client)?;
        let desc = self.inner.kind.descriptor();
        let data = client.var_get(&self.inner.name, desc.byte_width)?;
        Ok(decode(desc, &data)?)
    }

    pub(crate) fn check_type_with(&self, client: &ClientInner) -> IpcResult<()> {
        let code = client.var_type(&self.inner.name)?;
        if code != self.inner.kind.wire_code() {
            return Err(IpcError::TypeMismatch {
                name: self.inner.name.clone(),
                expected: self.inner.kind,
                actual_code: code,
            });
        }
        Ok(())
    }
}

impl VarInner {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// One scheduler pass over this variable. Returns `false` when nothing
    /// is watching it any more and the client should drop it from the
    /// scheduler.
    pub(crate) fn process_tick(self: &Arc<Self>, client: &Arc<ClientInner>) -> bool {
        let handle = Variable {
            inner: self.clone(),
        };

        // One-shot type checks resolve on the first tick where the type
        // query stops reporting pending.
        if !self.state.lock().type_match.is_empty() {
            let outcome = match handle.check_type_with(client) {
                Ok(()) => Some(None),
                Err(e) if e.is_pending() => None,
                Err(e) => Some(Some(e)),
            };
            if let Some(error) = outcome {
                let waiters: Vec<TypeMatchCallback> = {
                    let mut state = self.state.lock();
                    state.type_match.drain(..).collect()
                };
                debug!(name = self.name(), ok = error.is_none(), "type check resolved");
                for waiter in waiters {
                    waiter(&handle, error.is_none(), error.as_ref());
                }
            }
        }

        // Removals requested since the previous tick apply now, before
        // dispatch.
        {
            let mut state = self.state.lock();
            let removals: Vec<u64> = state.pending_removals.drain().collect();
            for id in removals {
                state.subscribers.remove(&id);
            }
        }

        let (waiting_for_type, subscribers) = {
            let state = self.state.lock();
            (
                !state.type_match.is_empty(),
                state.subscribers.values().cloned().collect::<Vec<_>>(),
            )
        };

        // Nothing left to watch: have the client drop this variable. The
        // handle stays valid and can be re-subscribed later.
        if !waiting_for_type && subscribers.is_empty() {
            debug!(name = self.name(), "variable has no watchers, dropping");
            return false;
        }
        if subscribers.is_empty() {
            return true;
        }

        // A pending read carries no new information this tick; neither
        // branch below fires.
        let mut value = None;
        let mut error = None;
        match handle.get_with(client) {
            Ok(v) => value = Some(v),
            Err(e) if e.is_pending() => {}
            Err(e) => error = Some(e),
        }

        if let Some(v) = &value {
            let changed = self.state.lock().last_value.as_ref() != Some(v);
            if changed {
                for sub in &subscribers {
                    (sub.on_value)(&handle, v);
                }
            }
        }

        if let Some(e) = &error {
            let changed = self.state.lock().last_error.as_ref() != Some(e);
            if changed {
                for sub in &subscribers {
                    (sub.on_error)(&handle, e);
                }
            }
        }

        // Snapshots update only after dispatch; the comparisons above ran
        // against the previous tick.
        let mut state = self.state.lock();
        state.last_value = value;
        state.last_error = error;
        true
    }
}
