//! Mock transport for testing
//!
//! A scriptable in-memory stand-in for the real IPC channel: variables are
//! plain byte buffers, failures can be queued per operation, and every write
//! is recorded. Writes loop back into the stored value so a set-then-get
//! sequence behaves like a live server.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use parking_lot::RwLock;
use plcipc_conv::VarKind;

use super::{ResultCode, Transport, TransportResult};

/// Mock transport for testing.
#[derive(Default)]
pub struct MockTransport {
    state: RwLock<MockState>,
}

struct MockState {
    server_running: bool,
    opened: bool,
    processing: bool,
    close_calls: usize,
    open_failure: Option<ResultCode>,
    start_failure: Option<ResultCode>,
    subscribe_failures: VecDeque<ResultCode>,
    server_failures: VecDeque<ResultCode>,
    subscribed: HashSet<String>,
    vars: HashMap<String, MockVar>,
    writes: Vec<(String, Vec<u8>)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            server_running: true,
            opened: false,
            processing: false,
            close_calls: 0,
            open_failure: None,
            start_failure: None,
            subscribe_failures: VecDeque::new(),
            server_failures: VecDeque::new(),
            subscribed: HashSet::new(),
            vars: HashMap::new(),
            writes: Vec::new(),
        }
    }
}

#[derive(Default)]
struct MockVar {
    type_code: u8,
    value: Vec<u8>,
    get_failures: VecDeque<ResultCode>,
    get_failure_sticky: Option<ResultCode>,
    type_failures: VecDeque<ResultCode>,
    set_failures: VecDeque<ResultCode>,
    get_calls: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a variable with the wire type of `kind` and an initial raw
    /// value.
    pub fn add_variable(&self, name: &str, kind: VarKind, raw: Vec<u8>) {
        self.state.write().vars.insert(
            name.to_string(),
            MockVar {
                type_code: kind.wire_code(),
                value: raw,
                ..Default::default()
            },
        );
    }

    /// Define a variable reporting an arbitrary wire type code.
    pub fn add_variable_with_code(&self, name: &str, type_code: u8, raw: Vec<u8>) {
        self.state.write().vars.insert(
            name.to_string(),
            MockVar {
                type_code,
                value: raw,
                ..Default::default()
            },
        );
    }

    /// Replace a variable's stored raw value.
    pub fn set_raw_value(&self, name: &str, raw: Vec<u8>) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.value = raw;
        }
    }

    /// Replace the wire type code a variable reports.
    pub fn set_type_code(&self, name: &str, type_code: u8) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.type_code = type_code;
        }
    }

    /// Toggle the reported server run state.
    pub fn set_server_running(&self, running: bool) {
        self.state.write().server_running = running;
    }

    /// Queue `count` failures for the next value reads of a variable.
    pub fn fail_next_gets(&self, name: &str, code: ResultCode, count: usize) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.get_failures.extend(std::iter::repeat(code).take(count));
        }
    }

    /// Fail every value read of a variable until cleared with
    /// [`clear_get_failures`](Self::clear_get_failures).
    pub fn fail_all_gets(&self, name: &str, code: ResultCode) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.get_failure_sticky = Some(code);
        }
    }

    /// Clear queued and sticky read failures of a variable.
    pub fn clear_get_failures(&self, name: &str) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.get_failures.clear();
            var.get_failure_sticky = None;
        }
    }

    /// Queue `count` failures for the next type queries of a variable.
    pub fn fail_next_type_queries(&self, name: &str, code: ResultCode, count: usize) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.type_failures.extend(std::iter::repeat(code).take(count));
        }
    }

    /// Queue `count` failures for the next writes to a variable.
    pub fn fail_next_sets(&self, name: &str, code: ResultCode, count: usize) {
        if let Some(var) = self.state.write().vars.get_mut(name) {
            var.set_failures.extend(std::iter::repeat(code).take(count));
        }
    }

    /// Queue `count` failures for the next server run-state queries.
    pub fn fail_next_server_queries(&self, code: ResultCode, count: usize) {
        self.state
            .write()
            .server_failures
            .extend(std::iter::repeat(code).take(count));
    }

    /// Fail the next subscribe call.
    pub fn fail_next_subscribe(&self, code: ResultCode) {
        self.state.write().subscribe_failures.push_back(code);
    }

    /// Fail the next open call.
    pub fn fail_open(&self, code: ResultCode) {
        self.state.write().open_failure = Some(code);
    }

    /// Fail the next start-processing call.
    pub fn fail_start_processing(&self, code: ResultCode) {
        self.state.write().start_failure = Some(code);
    }

    /// Stored raw value of a variable.
    pub fn raw_value(&self, name: &str) -> Option<Vec<u8>> {
        self.state.read().vars.get(name).map(|v| v.value.clone())
    }

    /// All raw payloads written to a variable, in order.
    pub fn writes(&self, name: &str) -> Vec<Vec<u8>> {
        self.state
            .read()
            .writes
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
            .collect()
    }

    /// Number of value reads performed on a variable.
    pub fn get_calls(&self, name: &str) -> usize {
        self.state.read().vars.get(name).map_or(0, |v| v.get_calls)
    }

    /// Whether a name has been subscribed.
    pub fn is_subscribed(&self, name: &str) -> bool {
        self.state.read().subscribed.contains(name)
    }

    /// Number of close calls seen so far.
    pub fn close_calls(&self) -> usize {
        self.state.read().close_calls
    }
}

impl Transport for MockTransport {
    fn open(&self, _request_path: &str, _response_path: &str) -> TransportResult<()> {
        let mut state = self.state.write();
        if let Some(code) = state.open_failure.take() {
            return Err(code);
        }
        state.opened = true;
        Ok(())
    }

    fn start_processing(&self, _poll_interval: Duration) -> TransportResult<()> {
        let mut state = self.state.write();
        if let Some(code) = state.start_failure.take() {
            return Err(code);
        }
        state.processing = true;
        Ok(())
    }

    fn subscribe(&self, name: &str) -> TransportResult<()> {
        let mut state = self.state.write();
        if let Some(code) = state.subscribe_failures.pop_front() {
            return Err(code);
        }
        state.subscribed.insert(name.to_string());
        Ok(())
    }

    fn var_type(&self, name: &str) -> TransportResult<u8> {
        let mut state = self.state.write();
        if !state.subscribed.contains(name) {
            return Err(ResultCode::ClientNotSubscribed);
        }
        let var = state.vars.get_mut(name).ok_or(ResultCode::ClientNotExist)?;
        if let Some(code) = var.type_failures.pop_front() {
            return Err(code);
        }
        Ok(var.type_code)
    }

    fn var_get(&self, name: &str, capacity: usize) -> TransportResult<Vec<u8>> {
        let mut state = self.state.write();
        if !state.subscribed.contains(name) {
            return Err(ResultCode::ClientNotSubscribed);
        }
        let var = state.vars.get_mut(name).ok_or(ResultCode::ClientNotExist)?;
        if let Some(code) = var.get_failures.pop_front() {
            return Err(code);
        }
        if let Some(code) = var.get_failure_sticky {
            return Err(code);
        }
        var.get_calls += 1;
        if var.value.len() > capacity {
            return Err(ResultCode::ClientBufferTooSmall);
        }
        Ok(var.value.clone())
    }

    fn var_set(&self, name: &str, data: &[u8]) -> TransportResult<()> {
        let mut state = self.state.write();
        if !state.subscribed.contains(name) {
            return Err(ResultCode::ClientNotSubscribed);
        }
        let var = state.vars.get_mut(name).ok_or(ResultCode::ClientNotExist)?;
        if let Some(code) = var.set_failures.pop_front() {
            return Err(code);
        }
        var.value = data.to_vec();
        state.writes.push((name.to_string(), data.to_vec()));
        Ok(())
    }

    fn server_running(&self) -> TransportResult<bool> {
        let mut state = self.state.write();
        if let Some(code) = state.server_failures.pop_front() {
            return Err(code);
        }
        Ok(state.server_running)
    }

    fn close(&self) -> TransportResult<()> {
        let mut state = self.state.write();
        state.close_calls += 1;
        state.opened = false;
        state.processing = false;
        Ok(())
    }
}
