//! The single path from the engine to the remote system.
//!
//! Reads always execute. Writes execute only in [`RunMode::Apply`]; in
//! [`RunMode::Simulate`] they are logged and answered with a placeholder so the
//! decision logic above can run unchanged.

use std::cell::Cell;

use hostsync_rpc::{ApiClient, Mutation, Query, Transport};
use tracing::info;

use crate::error::Result;
use crate::types::RunMode;

/// Stand-in value for a simulated mutation.
pub trait Placeholder {
    fn placeholder() -> Self;
}

/// Created ids are simulated as `"0"`.
impl Placeholder for String {
    fn placeholder() -> Self {
        "0".to_string()
    }
}

impl Placeholder for () {
    fn placeholder() -> Self {}
}

/// Mode-aware wrapper around an [`ApiClient`].
pub struct SimulationGate<'a, T> {
    client: &'a ApiClient<T>,
    mode: RunMode,
    intercepted: Cell<usize>,
}

impl<'a, T: Transport> SimulationGate<'a, T> {
    pub const fn new(client: &'a ApiClient<T>, mode: RunMode) -> Self {
        Self {
            client,
            mode,
            intercepted: Cell::new(0),
        }
    }

    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Number of mutations swallowed so far.
    pub fn intercepted(&self) -> usize {
        self.intercepted.get()
    }

    /// Execute a read-only method.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the call fails.
    pub fn read<M: Query>(&self, request: &M) -> Result<M::Response> {
        Ok(self.client.call(request)?)
    }

    /// Execute a mutation, or simulate it.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the call fails. Never fails in simulation.
    pub fn write<M>(&self, request: &M) -> Result<M::Output>
    where
        M: Mutation,
        M::Output: Placeholder,
    {
        match self.mode {
            RunMode::Apply => Ok(self.client.execute(request)?),
            RunMode::Simulate => {
                let params = serde_json::to_string(request)
                    .unwrap_or_else(|e| format!("<unserializable: {e}>"));
                info!(method = M::METHOD, params = %params, "[SIMULATION] would call");
                self.intercepted.set(self.intercepted.get().saturating_add(1));
                Ok(M::Output::placeholder())
            }
        }
    }
}
