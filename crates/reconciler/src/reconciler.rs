//! Per-record host reconciliation.

use hostsync_rpc::{
    ApiClient, GroupRef, HostCreate, HostUpdate, NewInterface, TemplateRef, Transport,
};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::diff::TemplateDiff;
use crate::error::Result;
use crate::gate::SimulationGate;
use crate::interface::InterfaceSynchronizer;
use crate::matcher::{HostMatch, HostMatcher};
use crate::outcome::OutcomeClassifier;
use crate::resolver::{GroupResolver, HostGroups, TemplateResolver};
use crate::text::{DEFAULT_MAX_NAME_LEN, sanitize_technical_name};
use crate::types::{DesiredRecord, Outcome, Reconciliation, RunMode};

/// Default template group for auto-created templates.
pub const DEFAULT_TEMPLATE_GROUP: &str = "Templates/Auto";
/// Default Zabbix agent port.
pub const DEFAULT_AGENT_PORT: &str = "10050";

/// Configuration for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Simulate or apply.
    pub mode: RunMode,
    /// Template group new templates are created in.
    pub default_template_group: String,
    /// Port for newly created agent interfaces.
    pub agent_port: String,
    /// Rename the display name of matched hosts.
    pub update_visible_name: bool,
    /// Rename the technical name of matched hosts.
    pub update_technical_name: bool,
    /// Upper bound on derived technical names.
    pub max_name_len: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Simulate,
            default_template_group: DEFAULT_TEMPLATE_GROUP.to_string(),
            agent_port: DEFAULT_AGENT_PORT.to_string(),
            update_visible_name: true,
            update_technical_name: false,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl ReconcilerConfig {
    /// Set the run mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Converges one host at a time to its desired record.
pub struct HostReconciler<'a, T> {
    gate: SimulationGate<'a, T>,
    config: ReconcilerConfig,
}

impl<'a, T: Transport> HostReconciler<'a, T> {
    pub const fn new(client: &'a ApiClient<T>, config: ReconcilerConfig) -> Self {
        Self {
            gate: SimulationGate::new(client, config.mode),
            config,
        }
    }

    /// Get the configuration.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Get the gate all remote calls go through.
    pub const fn gate(&self) -> &SimulationGate<'a, T> {
        &self.gate
    }

    /// Reconcile one record and classify the result. Never fails; failures
    /// become `Error` outcomes.
    pub fn reconcile(&self, record: &DesiredRecord) -> Outcome {
        let result = self.try_reconcile(record);
        if let Err(err) = &result {
            warn!(row = record.row_number, name = %record.display_name, error = %err, "Record failed");
        }
        let outcome = OutcomeClassifier::classify(record.row_number, self.gate.mode(), &result);
        info!(
            row = outcome.row_number,
            outcome = %outcome.kind,
            message = %outcome.message,
            "Record processed"
        );
        outcome
    }

    /// Reconcile one record.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for incomplete records (before any remote call)
    /// and `Api` for the first failing remote call. Earlier mutations are
    /// not rolled back.
    pub fn try_reconcile(&self, record: &DesiredRecord) -> Result<Reconciliation> {
        record.validate()?;

        let group_ids = self.resolve_groups(record)?;
        let template_ids = self.resolve_templates(record)?;
        debug!(
            row = record.row_number,
            groups = ?group_ids,
            templates = ?template_ids,
            "Resolved dependencies"
        );

        match HostMatcher::new(&self.gate, self.config.max_name_len).find(record)? {
            None => self.create(record, group_ids, template_ids),
            Some(found) => self.update(record, found, group_ids, template_ids),
        }
    }

    fn resolve_groups(&self, record: &DesiredRecord) -> Result<Vec<String>> {
        let groups = GroupResolver::<T, HostGroups>::new(&self.gate);
        let ids = record
            .group_names
            .iter()
            .map(|name| groups.ensure(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(ids.into_iter().unique().collect_vec())
    }

    fn resolve_templates(&self, record: &DesiredRecord) -> Result<Vec<String>> {
        let templates = TemplateResolver::new(
            &self.gate,
            &self.config.default_template_group,
            self.config.max_name_len,
        );
        let ids = record
            .template_names
            .iter()
            .map(|name| templates.ensure(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(ids.into_iter().unique().collect_vec())
    }

    fn create(
        &self,
        record: &DesiredRecord,
        group_ids: Vec<String>,
        template_ids: Vec<String>,
    ) -> Result<Reconciliation> {
        let technical_name = sanitize_technical_name(&record.display_name, self.config.max_name_len);

        let host_id = self.gate.write(&HostCreate {
            host: technical_name.clone(),
            name: record.display_name.clone(),
            interfaces: vec![NewInterface::primary_agent(
                &record.address,
                &self.config.agent_port,
            )],
            groups: group_ids.into_iter().map(GroupRef::new).collect(),
            templates: template_ids.into_iter().map(TemplateRef::new).collect(),
        })?;

        Ok(Reconciliation::Created {
            host_id,
            technical_name,
            display_name: record.display_name.clone(),
        })
    }

    fn update(
        &self,
        record: &DesiredRecord,
        found: HostMatch,
        group_ids: Vec<String>,
        template_ids: Vec<String>,
    ) -> Result<Reconciliation> {
        let HostMatch { host, strategy } = found;

        InterfaceSynchronizer::new(&self.gate, &self.config.agent_port).sync(
            &host.host_id,
            host.primary_agent_interface(),
            &record.address,
        )?;

        let current = host.template_ids();
        let diff = TemplateDiff::compute(&current, &template_ids);
        if diff.is_noop_for(&current) {
            debug!(host_id = %host.host_id, "Templates already converged");
        }

        let name = (self.config.update_visible_name && host.name != record.display_name)
            .then(|| record.display_name.clone());
        let sanitized = sanitize_technical_name(&record.display_name, self.config.max_name_len);
        let technical = (self.config.update_technical_name && host.host != sanitized)
            .then_some(sanitized);

        self.gate.write(&HostUpdate {
            host_id: host.host_id.clone(),
            groups: group_ids.into_iter().map(GroupRef::new).collect(),
            templates: diff.assert.into_iter().map(TemplateRef::new).collect(),
            templates_clear: diff.clear.into_iter().map(TemplateRef::new).collect(),
            name,
            host: technical,
        })?;

        Ok(Reconciliation::Updated {
            host_id: host.host_id,
            matched_by: strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use hostsync_rpc::{InMemoryZabbix, RpcMethod};

    use super::*;
    use crate::error::Error;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn record(groups: &[&str], templates: &[&str]) -> DesiredRecord {
        DesiredRecord {
            row_number: 2,
            display_name: "Srv Web".to_string(),
            group_names: groups.iter().map(|g| (*g).to_string()).collect(),
            address: "10.0.0.5".to_string(),
            template_names: templates.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[test]
    fn test_invalid_record_makes_no_calls() {
        let remote = InMemoryZabbix::new();
        let client = ApiClient::new(&remote);
        let reconciler = HostReconciler::new(&client, ReconcilerConfig::default());

        let result = reconciler.try_reconcile(&record(&[], &["Linux"]));

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_duplicate_names_are_sent_once() -> TestResult {
        let remote = InMemoryZabbix::new();
        let client = ApiClient::new(&remote);
        let config = ReconcilerConfig::default().with_mode(RunMode::Apply);
        let reconciler = HostReconciler::new(&client, config);

        reconciler.try_reconcile(&record(&["Web", "Web"], &["Linux", "Linux"]))?;

        let create = remote
            .calls_to(HostCreate::METHOD)
            .into_iter()
            .next()
            .ok_or("host.create not called")?;
        assert_eq!(create.params["groups"].as_array().map(Vec::len), Some(1));
        assert_eq!(create.params["templates"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_simulated_placeholders_are_deduplicated() -> TestResult {
        let remote = InMemoryZabbix::new();
        remote.seed_host("Srv_Web", "Srv Web");
        let client = ApiClient::new(&remote);
        let reconciler = HostReconciler::new(&client, ReconcilerConfig::default());

        reconciler.try_reconcile(&record(&["New A", "New B"], &["Linux"]))?;

        // new groups, the default template group, the template, the interface
        // and the host update are all intercepted
        assert_eq!(reconciler.gate().intercepted(), 6);
        assert_eq!(remote.mutation_count(), 0);
        Ok(())
    }

    #[test]
    fn test_technical_rename_is_opt_in() -> TestResult {
        let remote = InMemoryZabbix::new();
        let host_id = remote.seed_host("legacy", "Srv Web");
        let client = ApiClient::new(&remote);

        let keep = ReconcilerConfig::default().with_mode(RunMode::Apply);
        HostReconciler::new(&client, keep).try_reconcile(&record(&["Web"], &["Linux"]))?;
        assert_eq!(remote.host(&host_id).map(|h| h.host), Some("legacy".to_string()));

        let rename = ReconcilerConfig {
            update_technical_name: true,
            ..ReconcilerConfig::default().with_mode(RunMode::Apply)
        };
        HostReconciler::new(&client, rename).try_reconcile(&record(&["Web"], &["Linux"]))?;
        assert_eq!(remote.host(&host_id).map(|h| h.host), Some("Srv_Web".to_string()));
        Ok(())
    }
}
