//! Integration tests for single-record reconciliation.
//!
//! These tests verify that:
//! - A fresh record creates every dependency and then the host
//! - Repeated runs converge without duplicating anything
//! - Simulation mirrors apply mode without mutating remote state
//! - Templates converge exactly while groups only grow
//! - Remote failures, including lookups during simulation, become ERROR outcomes

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]
#![forbid(clippy::panic)]

use hostsync_reconciler::{
    DesiredRecord, HostReconciler, MatchStrategy, OutcomeKind, Reconciliation, ReconcilerConfig,
    RunMode,
};
use hostsync_rpc::{ApiClient, HostUpdate, InMemoryZabbix, NewInterface, RpcMethod};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn record(display: &str, groups: &[&str], address: &str, templates: &[&str]) -> DesiredRecord {
    DesiredRecord {
        row_number: 2,
        display_name: display.to_string(),
        group_names: groups.iter().map(|g| (*g).to_string()).collect(),
        address: address.to_string(),
        template_names: templates.iter().map(|t| (*t).to_string()).collect(),
    }
}

fn apply() -> ReconcilerConfig {
    ReconcilerConfig::default().with_mode(RunMode::Apply)
}

fn names<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut sorted: Vec<String> = values.into_iter().collect();
    sorted.sort();
    sorted
}

/// Test the full create path for a brand new host.
///
/// # GIVEN
/// An empty remote system
///
/// # WHEN
/// Srv-Web-01 with groups Web and Prod and template "Linux OS" is applied
///
/// # THEN
/// Both host groups, the default template group, the template and the host
/// exist, and the outcome is CREATED
#[test]
fn test_new_host_creates_all_dependencies() -> TestResult {
    // GIVEN: An empty remote system
    let remote = InMemoryZabbix::new();
    let client = ApiClient::new(&remote);
    let reconciler = HostReconciler::new(&client, apply());

    // WHEN: The record is reconciled
    let outcome = reconciler.reconcile(&record(
        "Srv-Web-01",
        &["Web", "Prod"],
        "10.0.0.5",
        &["Linux OS"],
    ));

    // THEN: Everything was created
    assert_eq!(outcome.kind, OutcomeKind::Created);
    assert_eq!(
        outcome.message,
        "host did not exist; created (name='Srv-Web-01', host='Srv-Web-01')"
    );

    let group_names: Vec<String> = remote.host_groups().into_iter().map(|g| g.name).collect();
    assert_eq!(group_names, vec!["Web".to_string(), "Prod".to_string()]);

    let template_groups: Vec<String> =
        remote.template_groups().into_iter().map(|g| g.name).collect();
    assert_eq!(template_groups, vec!["Templates/Auto".to_string()]);

    let templates = remote.templates();
    let template = templates.first().ok_or("template missing")?;
    assert_eq!(template.name, "Linux OS");
    assert_eq!(template.host, "Linux_OS");

    let hosts = remote.hosts();
    assert_eq!(hosts.len(), 1);
    let host = hosts.first().ok_or("host missing")?;
    assert_eq!(host.host, "Srv-Web-01");
    assert_eq!(host.name, "Srv-Web-01");
    assert_eq!(host.groups.len(), 2);
    assert_eq!(host.template_ids(), vec![template.template_id.clone()]);

    let interface = host.primary_agent_interface().ok_or("interface missing")?;
    assert_eq!(interface.ip, "10.0.0.5");
    assert_eq!(interface.port, "10050");
    assert!(interface.useip);
    Ok(())
}

/// Test that reconciling the same record twice converges.
///
/// # GIVEN
/// A host created by a first run
///
/// # WHEN
/// The same record is reconciled again
///
/// # THEN
/// The host is updated (matched by name) and nothing is duplicated
#[test]
fn test_second_run_updates_without_duplicates() -> TestResult {
    // GIVEN: A host created by a first run
    let remote = InMemoryZabbix::new();
    let client = ApiClient::new(&remote);
    let reconciler = HostReconciler::new(&client, apply());
    let desired = record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux OS"]);
    reconciler.try_reconcile(&desired)?;

    // WHEN: The same record is reconciled again
    let second = reconciler.try_reconcile(&desired)?;

    // THEN: Matched by name, nothing duplicated
    assert!(matches!(
        second,
        Reconciliation::Updated {
            matched_by: MatchStrategy::Name,
            ..
        }
    ));
    assert_eq!(remote.hosts().len(), 1);
    assert_eq!(remote.host_groups().len(), 1);
    assert_eq!(remote.template_groups().len(), 1);
    assert_eq!(remote.templates().len(), 1);
    let host = remote.hosts().into_iter().next().ok_or("host missing")?;
    assert_eq!(host.interfaces.len(), 1);
    Ok(())
}

/// Test that simulation makes the same decisions as apply mode.
///
/// # GIVEN
/// Two identical remote systems, one existing host and one new record
///
/// # WHEN
/// The records are reconciled in simulate mode on one and apply mode on the other
///
/// # THEN
/// Simulation yields WOULD_* exactly where apply yields CREATED/UPDATED, and
/// the simulated remote receives no mutating call
#[test]
fn test_simulation_mirrors_apply() -> TestResult {
    let seed = |remote: &InMemoryZabbix| {
        let host_id = remote.seed_host("Srv-Db-01", "Srv-Db-01");
        remote.seed_interface(&host_id, NewInterface::primary_agent("10.0.0.9", "10050"));
    };
    let records = [
        record("Srv-Db-01", &["DB"], "10.0.0.9", &["Linux OS"]),
        record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux OS"]),
    ];

    // GIVEN: Two identical remote systems
    let simulated = InMemoryZabbix::new();
    let applied = InMemoryZabbix::new();
    seed(&simulated);
    seed(&applied);

    // WHEN: Each is reconciled in its own mode
    let sim_client = ApiClient::new(&simulated);
    let sim = HostReconciler::new(&sim_client, ReconcilerConfig::default());
    let sim_kinds: Vec<OutcomeKind> = records.iter().map(|r| sim.reconcile(r).kind).collect();

    let apply_client = ApiClient::new(&applied);
    let real = HostReconciler::new(&apply_client, apply());
    let apply_kinds: Vec<OutcomeKind> = records.iter().map(|r| real.reconcile(r).kind).collect();

    // THEN: Decisions line up and the simulated remote is untouched
    assert_eq!(sim_kinds, vec![OutcomeKind::WouldUpdate, OutcomeKind::WouldCreate]);
    assert_eq!(apply_kinds, vec![OutcomeKind::Updated, OutcomeKind::Created]);
    assert_eq!(simulated.mutation_count(), 0);
    assert!(sim.gate().intercepted() > 0);
    assert!(applied.mutation_count() > 0);
    assert_eq!(simulated.hosts().len(), 1);
    Ok(())
}

/// Test exact template convergence.
///
/// # GIVEN
/// A host linked to templates A and B
///
/// # WHEN
/// The desired templates are B and C
///
/// # THEN
/// The update clears A, asserts B and C, and the host ends with {B, C}
#[test]
fn test_templates_converge_exactly() -> TestResult {
    // GIVEN: A host linked to A and B
    let remote = InMemoryZabbix::new();
    let a = remote.seed_template("A", "A");
    let b = remote.seed_template("B", "B");
    let c = remote.seed_template("C", "C");
    let host_id = remote.seed_host("srv", "srv");
    remote.seed_link(&host_id, &a);
    remote.seed_link(&host_id, &b);

    // WHEN: Desired templates are B and C
    let client = ApiClient::new(&remote);
    HostReconciler::new(&client, apply())
        .try_reconcile(&record("srv", &["Web"], "10.0.0.1", &["B", "C"]))?;

    // THEN: A cleared, B and C asserted
    let update = remote
        .calls_to(HostUpdate::METHOD)
        .into_iter()
        .next()
        .ok_or("host.update not sent")?;
    let sent: HostUpdate = serde_json::from_value(update.params)?;
    let cleared: Vec<String> = sent.templates_clear.into_iter().map(|t| t.template_id).collect();
    let asserted: Vec<String> = sent.templates.into_iter().map(|t| t.template_id).collect();
    assert_eq!(cleared, vec![a]);
    assert_eq!(asserted, vec![b.clone(), c.clone()]);

    let host = remote.host(&host_id).ok_or("host missing")?;
    assert_eq!(names(host.template_ids()), names([b, c]));
    Ok(())
}

/// Test that stale groups stay attached.
///
/// # GIVEN
/// A host in group Legacy
///
/// # WHEN
/// The desired groups are Web only
///
/// # THEN
/// The host is in Legacy and Web, and no group clearing was requested
#[test]
fn test_stale_groups_stay_attached() -> TestResult {
    // GIVEN: A host in group Legacy
    let remote = InMemoryZabbix::new();
    let legacy = remote.seed_host_group("Legacy");
    let host_id = remote.seed_host("srv", "srv");
    remote.seed_membership(&host_id, &legacy);

    // WHEN: Desired groups are Web only
    let client = ApiClient::new(&remote);
    HostReconciler::new(&client, apply())
        .try_reconcile(&record("srv", &["Web"], "10.0.0.1", &["Linux"]))?;

    // THEN: Both groups remain
    let host = remote.host(&host_id).ok_or("host missing")?;
    let groups = names(host.groups.into_iter().map(|g| g.name));
    assert_eq!(groups, vec!["Legacy".to_string(), "Web".to_string()]);

    let update = remote
        .calls_to(HostUpdate::METHOD)
        .into_iter()
        .next()
        .ok_or("host.update not sent")?;
    assert!(update.params.get("groups_clear").is_none());
    Ok(())
}

/// Test that name identity beats address identity.
///
/// # GIVEN
/// One host matching the record's address and another matching its name
///
/// # WHEN
/// The record is reconciled
///
/// # THEN
/// The name match is updated and the address match is left alone
#[test]
fn test_name_match_beats_address_match() -> TestResult {
    // GIVEN: An address match and a name match
    let remote = InMemoryZabbix::new();
    let by_address = remote.seed_host("old", "Old");
    remote.seed_interface(&by_address, NewInterface::primary_agent("10.0.0.5", "10050"));
    let by_name = remote.seed_host("Srv-Web-01", "Srv-Web-01");

    // WHEN: The record is reconciled
    let client = ApiClient::new(&remote);
    let result = HostReconciler::new(&client, apply())
        .try_reconcile(&record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux"]))?;

    // THEN: The name match wins
    assert_eq!(
        result,
        Reconciliation::Updated {
            host_id: by_name.clone(),
            matched_by: MatchStrategy::Name,
        }
    );
    let untouched = remote.host(&by_address).ok_or("host missing")?;
    assert!(untouched.templates.is_empty());
    let updated = remote.host(&by_name).ok_or("host missing")?;
    assert_eq!(updated.templates.len(), 1);
    Ok(())
}

/// Test that a matched host's display name follows the record.
///
/// # GIVEN
/// A host found by address with a different display name
///
/// # WHEN
/// The record is reconciled with default settings
///
/// # THEN
/// The display name is updated, the technical name is kept and the interface
/// is forced to IP mode
#[test]
fn test_address_match_renames_display_name() -> TestResult {
    // GIVEN: A host found by address
    let remote = InMemoryZabbix::new();
    let host_id = remote.seed_host("legacy-01", "Legacy 01");
    remote.seed_interface(&host_id, NewInterface::primary_agent("10.0.0.5", "10050"));

    // WHEN: The record is reconciled
    let client = ApiClient::new(&remote);
    let outcome = HostReconciler::new(&client, apply())
        .reconcile(&record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux"]));

    // THEN: Display name updated, technical name kept
    assert_eq!(outcome.kind, OutcomeKind::Updated);
    assert_eq!(
        outcome.message,
        format!("existing host (matched by address); updated (hostid={host_id})")
    );
    let host = remote.host(&host_id).ok_or("host missing")?;
    assert_eq!(host.name, "Srv-Web-01");
    assert_eq!(host.host, "legacy-01");
    Ok(())
}

/// Test that a remote failure becomes an ERROR outcome.
///
/// # GIVEN
/// A remote system that rejects host creation
///
/// # WHEN
/// A new record is reconciled
///
/// # THEN
/// The outcome is ERROR with the API error text, and dependencies created
/// before the failure remain
#[test]
fn test_remote_failure_is_reported() {
    // GIVEN: A remote system that rejects host creation
    let remote = InMemoryZabbix::new();
    remote.fail_on("host.create", "License limit reached.");

    // WHEN: A new record is reconciled
    let client = ApiClient::new(&remote);
    let outcome = HostReconciler::new(&client, apply())
        .reconcile(&record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux"]));

    // THEN: ERROR, no rollback
    assert_eq!(outcome.kind, OutcomeKind::Error);
    assert_eq!(
        outcome.message,
        "API error in host.create: Application error. | License limit reached."
    );
    assert_eq!(remote.host_groups().len(), 1);
    assert!(remote.hosts().is_empty());
}

/// Test that lookups still run live while simulating.
///
/// # GIVEN
/// A remote system whose host lookup fails
///
/// # WHEN
/// A record is reconciled in simulation mode
///
/// # THEN
/// The outcome is ERROR with the lookup failure and nothing is mutated
#[test]
fn test_simulated_lookup_failure_is_reported() {
    // GIVEN: Host lookups fail remotely
    let remote = InMemoryZabbix::new();
    remote.fail_on("host.get", "database is down");

    // WHEN: The record is simulated
    let client = ApiClient::new(&remote);
    let outcome = HostReconciler::new(&client, ReconcilerConfig::default())
        .reconcile(&record("Srv-Web-01", &["Web"], "10.0.0.5", &["Linux"]));

    // THEN: ERROR from the read, zero mutations
    assert_eq!(outcome.kind, OutcomeKind::Error);
    assert_eq!(
        outcome.message,
        "API error in host.get: Application error. | database is down"
    );
    assert_eq!(remote.mutation_count(), 0);
}
