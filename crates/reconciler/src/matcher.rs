//! Locate an existing host for a desired record.
//!
//! Identity is checked in priority order: technical name, display name, then
//! primary address. The first hit wins.

use hostsync_rpc::{HostGet, HostInterfaceGet, RemoteHost, Transport};
use tracing::debug;

use crate::error::Result;
use crate::gate::SimulationGate;
use crate::text::sanitize_technical_name;
use crate::types::{DesiredRecord, MatchStrategy};

/// A host found for a record, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatch {
    pub host: RemoteHost,
    pub strategy: MatchStrategy,
}

pub struct HostMatcher<'g, 'a, T> {
    gate: &'g SimulationGate<'a, T>,
    max_name_len: usize,
}

impl<'g, 'a, T: Transport> HostMatcher<'g, 'a, T> {
    pub const fn new(gate: &'g SimulationGate<'a, T>, max_name_len: usize) -> Self {
        Self { gate, max_name_len }
    }

    /// Find the host `record` refers to, if any.
    ///
    /// # Errors
    ///
    /// Returns `Api` when a lookup fails.
    pub fn find(&self, record: &DesiredRecord) -> Result<Option<HostMatch>> {
        if let Some(host) = self.by_name(record)? {
            debug!(row = record.row_number, host_id = %host.host_id, "Matched host by name");
            return Ok(Some(HostMatch {
                host,
                strategy: MatchStrategy::Name,
            }));
        }

        if let Some(host) = self.by_address(&record.address)? {
            debug!(row = record.row_number, host_id = %host.host_id, "Matched host by address");
            return Ok(Some(HostMatch {
                host,
                strategy: MatchStrategy::Address,
            }));
        }

        Ok(None)
    }

    fn by_name(&self, record: &DesiredRecord) -> Result<Option<RemoteHost>> {
        let display = record.display_name.as_str();
        let sanitized = sanitize_technical_name(display, self.max_name_len);

        let candidates = self.gate.read(&HostGet::by_technical_names([
            display.to_string(),
            sanitized.clone(),
        ]))?;

        let preferred = candidates
            .iter()
            .position(|h| h.host == sanitized)
            .or_else(|| candidates.iter().position(|h| h.host == display));
        if let Some(host) = preferred.and_then(|index| candidates.into_iter().nth(index)) {
            return Ok(Some(host));
        }

        let by_display = self.gate.read(&HostGet::by_display_name(display))?;
        Ok(by_display.into_iter().next())
    }

    fn by_address(&self, address: &str) -> Result<Option<RemoteHost>> {
        let interfaces = self.gate.read(&HostInterfaceGet::by_ip(address))?;
        let Some(interface) = interfaces.into_iter().next() else {
            return Ok(None);
        };

        let hosts = self.gate.read(&HostGet::by_id(interface.host_id))?;
        Ok(hosts.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use hostsync_rpc::{ApiClient, InMemoryZabbix, NewInterface, RpcMethod};

    use super::*;
    use crate::types::RunMode;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn record(display: &str, address: &str) -> DesiredRecord {
        DesiredRecord {
            row_number: 2,
            display_name: display.to_string(),
            group_names: vec!["Web".to_string()],
            address: address.to_string(),
            template_names: vec!["Linux".to_string()],
        }
    }

    #[test]
    fn test_prefers_sanitized_technical_name() -> TestResult {
        let remote = InMemoryZabbix::new();
        remote.seed_host("Srv Web", "legacy");
        let wanted = remote.seed_host("Srv_Web", "Srv Web");
        let client = ApiClient::new(&remote);
        let gate = SimulationGate::new(&client, RunMode::Simulate);

        let found = HostMatcher::new(&gate, 128)
            .find(&record("Srv Web", "10.0.0.1"))?
            .ok_or("no match")?;

        assert_eq!(found.host.host_id, wanted);
        assert_eq!(found.strategy, MatchStrategy::Name);
        Ok(())
    }

    #[test]
    fn test_falls_back_to_display_name() -> TestResult {
        let remote = InMemoryZabbix::new();
        let wanted = remote.seed_host("srv-001", "Srv Web");
        let client = ApiClient::new(&remote);
        let gate = SimulationGate::new(&client, RunMode::Simulate);

        let found = HostMatcher::new(&gate, 128)
            .find(&record("Srv Web", "10.0.0.1"))?
            .ok_or("no match")?;

        assert_eq!(found.host.host_id, wanted);
        assert_eq!(found.strategy, MatchStrategy::Name);
        Ok(())
    }

    #[test]
    fn test_matches_by_address() -> TestResult {
        let remote = InMemoryZabbix::new();
        let wanted = remote.seed_host("old-name", "Old Name");
        remote.seed_interface(&wanted, NewInterface::primary_agent("10.0.0.7", "10050"));
        let client = ApiClient::new(&remote);
        let gate = SimulationGate::new(&client, RunMode::Simulate);

        let found = HostMatcher::new(&gate, 128)
            .find(&record("New Name", "10.0.0.7"))?
            .ok_or("no match")?;

        assert_eq!(found.host.host_id, wanted);
        assert_eq!(found.strategy, MatchStrategy::Address);
        Ok(())
    }

    #[test]
    fn test_name_beats_address() -> TestResult {
        let remote = InMemoryZabbix::new();
        let by_ip = remote.seed_host("other", "Other");
        remote.seed_interface(&by_ip, NewInterface::primary_agent("10.0.0.7", "10050"));
        let by_name = remote.seed_host("Srv_Web", "Srv Web");
        let client = ApiClient::new(&remote);
        let gate = SimulationGate::new(&client, RunMode::Simulate);

        let found = HostMatcher::new(&gate, 128)
            .find(&record("Srv Web", "10.0.0.7"))?
            .ok_or("no match")?;

        assert_eq!(found.host.host_id, by_name);
        assert_eq!(found.strategy, MatchStrategy::Name);
        Ok(())
    }

    #[test]
    fn test_no_match() -> TestResult {
        let remote = InMemoryZabbix::new();
        let client = ApiClient::new(&remote);
        let gate = SimulationGate::new(&client, RunMode::Simulate);

        assert!(HostMatcher::new(&gate, 128).find(&record("x", "10.9.9.9"))?.is_none());
        assert_eq!(remote.calls_to(HostGet::METHOD).len(), 2);
        Ok(())
    }
}
