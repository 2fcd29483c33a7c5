//! Primary agent interface synchronization.

use hostsync_rpc::{HostInterfaceCreate, HostInterfaceUpdate, NewInterface, RemoteInterface, Transport};
use tracing::debug;

use crate::error::Result;
use crate::gate::SimulationGate;

/// What was done to the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceChange {
    Readdressed { interface_id: String },
    Created { interface_id: String },
}

pub struct InterfaceSynchronizer<'g, 'a, T> {
    gate: &'g SimulationGate<'a, T>,
    agent_port: &'g str,
}

impl<'g, 'a, T: Transport> InterfaceSynchronizer<'g, 'a, T> {
    pub const fn new(gate: &'g SimulationGate<'a, T>, agent_port: &'g str) -> Self {
        Self { gate, agent_port }
    }

    /// Point the host's primary agent interface at `address`.
    ///
    /// An existing interface is always rewritten to IP mode with an empty DNS
    /// name; otherwise a new one is created on the agent port.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the update or creation fails.
    pub fn sync(
        &self,
        host_id: &str,
        current: Option<&RemoteInterface>,
        address: &str,
    ) -> Result<InterfaceChange> {
        if let Some(interface) = current {
            debug!(host_id, interface_id = %interface.interface_id, address, "Updating agent interface");
            self.gate
                .write(&HostInterfaceUpdate::readdress(&interface.interface_id, address))?;
            return Ok(InterfaceChange::Readdressed {
                interface_id: interface.interface_id.clone(),
            });
        }

        debug!(host_id, address, port = self.agent_port, "Creating agent interface");
        let interface_id = self.gate.write(&HostInterfaceCreate::new(
            host_id,
            NewInterface::primary_agent(address, self.agent_port),
        ))?;
        Ok(InterfaceChange::Created { interface_id })
    }
}
