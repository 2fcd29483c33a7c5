//! Request and response types, one pair per JSON-RPC method.

use serde::{Deserialize, Serialize};

use crate::codec::{InterfaceKind, flag};
use crate::error::{Error, Result};
use crate::method::{Mutation, Query, RpcMethod};

/// Fields requested for groups.
const GROUP_OUTPUT: [&str; 2] = ["groupid", "name"];
/// Fields requested for templates.
const TEMPLATE_OUTPUT: [&str; 3] = ["templateid", "host", "name"];
/// Fields requested for hosts.
const HOST_OUTPUT: [&str; 3] = ["hostid", "host", "name"];
/// Fields requested for interfaces.
const INTERFACE_OUTPUT: [&str; 8] = [
    "interfaceid",
    "hostid",
    "type",
    "main",
    "useip",
    "ip",
    "dns",
    "port",
];

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Exact-match filter. Values within one key are OR-ed by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
}

impl Filter {
    /// Filter on the display name.
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            name: Some(vec![value.into()]),
            ..Default::default()
        }
    }

    /// Filter on the technical name.
    pub fn host<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: Some(values.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Filter on the interface address.
    pub fn ip(value: impl Into<String>) -> Self {
        Self {
            ip: Some(vec![value.into()]),
            ..Default::default()
        }
    }
}

/// `{"groupid": ..}` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    #[serde(rename = "groupid")]
    pub group_id: String,
}

impl GroupRef {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
        }
    }
}

/// `{"templateid": ..}` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    #[serde(rename = "templateid")]
    pub template_id: String,
}

impl TemplateRef {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
        }
    }
}

// ============================================================================
// Remote entities
// ============================================================================

/// A host-group or template-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGroup {
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub name: String,
}

/// A template as returned by `template.get` or `selectParentTemplates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    #[serde(rename = "templateid")]
    pub template_id: String,
    /// Technical name.
    #[serde(default)]
    pub host: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// A host interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInterface {
    #[serde(rename = "interfaceid")]
    pub interface_id: String,
    #[serde(rename = "hostid", default)]
    pub host_id: String,
    #[serde(rename = "type")]
    pub kind: InterfaceKind,
    #[serde(with = "flag")]
    pub main: bool,
    #[serde(with = "flag", default)]
    pub useip: bool,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub dns: String,
    #[serde(default)]
    pub port: String,
}

impl RemoteInterface {
    /// Whether this is the primary agent interface.
    pub fn is_primary_agent(&self) -> bool {
        self.kind == InterfaceKind::Agent && self.main
    }
}

/// A host with interfaces, groups and linked templates expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    #[serde(rename = "hostid")]
    pub host_id: String,
    /// Technical name.
    pub host: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<RemoteInterface>,
    #[serde(default, rename = "hostgroups", alias = "groups")]
    pub groups: Vec<RemoteGroup>,
    #[serde(default, rename = "parentTemplates")]
    pub templates: Vec<RemoteTemplate>,
}

impl RemoteHost {
    /// The primary agent interface, if the host has one.
    pub fn primary_agent_interface(&self) -> Option<&RemoteInterface> {
        self.interfaces.iter().find(|i| i.is_primary_agent())
    }

    /// Ids of the linked templates, in API order.
    pub fn template_ids(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.template_id.clone())
            .collect()
    }
}

/// Interface definition used when creating hosts or interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInterface {
    #[serde(rename = "type")]
    pub kind: InterfaceKind,
    #[serde(with = "flag")]
    pub main: bool,
    #[serde(with = "flag")]
    pub useip: bool,
    pub ip: String,
    #[serde(default)]
    pub dns: String,
    pub port: String,
}

impl NewInterface {
    /// Primary agent interface addressed by IP.
    pub fn primary_agent(ip: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            kind: InterfaceKind::Agent,
            main: true,
            useip: true,
            ip: ip.into(),
            dns: String::new(),
            port: port.into(),
        }
    }
}

// ============================================================================
// Created-id responses
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGroups {
    #[serde(rename = "groupids")]
    pub group_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTemplates {
    #[serde(rename = "templateids")]
    pub template_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceIds {
    #[serde(rename = "interfaceids")]
    pub interface_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIds {
    #[serde(rename = "hostids")]
    pub host_ids: Vec<String>,
}

fn first_id(method: &str, ids: Vec<String>) -> Result<String> {
    ids.into_iter()
        .next()
        .ok_or_else(|| Error::invalid_response(method, "no id returned"))
}

// ============================================================================
// apiinfo.version
// ============================================================================

/// `apiinfo.version` (sent without authorization).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfoVersion {}

impl RpcMethod for ApiInfoVersion {
    const METHOD: &'static str = "apiinfo.version";
    type Response = String;
}

impl Query for ApiInfoVersion {}

// ============================================================================
// Host groups
// ============================================================================

/// `hostgroup.get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupGet {
    pub output: Vec<String>,
    pub filter: Filter,
}

impl HostGroupGet {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            output: fields(&GROUP_OUTPUT),
            filter: Filter::name(name),
        }
    }
}

impl RpcMethod for HostGroupGet {
    const METHOD: &'static str = "hostgroup.get";
    type Response = Vec<RemoteGroup>;
}

impl Query for HostGroupGet {}

/// `hostgroup.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupCreate {
    pub name: String,
}

impl HostGroupCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RpcMethod for HostGroupCreate {
    const METHOD: &'static str = "hostgroup.create";
    type Response = CreatedGroups;
}

impl Mutation for HostGroupCreate {
    type Output = String;

    fn output(response: CreatedGroups) -> Result<String> {
        first_id(Self::METHOD, response.group_ids)
    }
}

// ============================================================================
// Template groups
// ============================================================================

/// `templategroup.get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGroupGet {
    pub output: Vec<String>,
    pub filter: Filter,
}

impl TemplateGroupGet {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            output: fields(&GROUP_OUTPUT),
            filter: Filter::name(name),
        }
    }
}

impl RpcMethod for TemplateGroupGet {
    const METHOD: &'static str = "templategroup.get";
    type Response = Vec<RemoteGroup>;
}

impl Query for TemplateGroupGet {}

/// `templategroup.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGroupCreate {
    pub name: String,
}

impl TemplateGroupCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RpcMethod for TemplateGroupCreate {
    const METHOD: &'static str = "templategroup.create";
    type Response = CreatedGroups;
}

impl Mutation for TemplateGroupCreate {
    type Output = String;

    fn output(response: CreatedGroups) -> Result<String> {
        first_id(Self::METHOD, response.group_ids)
    }
}

// ============================================================================
// Templates
// ============================================================================

/// `template.get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGet {
    pub output: Vec<String>,
    pub filter: Filter,
}

impl TemplateGet {
    pub fn by_technical_name(host: impl Into<String>) -> Self {
        Self {
            output: fields(&TEMPLATE_OUTPUT),
            filter: Filter::host([host.into()]),
        }
    }

    pub fn by_display_name(name: impl Into<String>) -> Self {
        Self {
            output: fields(&TEMPLATE_OUTPUT),
            filter: Filter::name(name),
        }
    }
}

impl RpcMethod for TemplateGet {
    const METHOD: &'static str = "template.get";
    type Response = Vec<RemoteTemplate>;
}

impl Query for TemplateGet {}

/// `template.create` - an empty template placed in template-groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCreate {
    pub host: String,
    pub name: String,
    pub groups: Vec<GroupRef>,
}

impl RpcMethod for TemplateCreate {
    const METHOD: &'static str = "template.create";
    type Response = CreatedTemplates;
}

impl Mutation for TemplateCreate {
    type Output = String;

    fn output(response: CreatedTemplates) -> Result<String> {
        first_id(Self::METHOD, response.template_ids)
    }
}

// ============================================================================
// Hosts
// ============================================================================

/// `host.get` with interfaces, host groups and parent templates selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGet {
    pub output: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostids: Option<Vec<String>>,
    #[serde(rename = "selectInterfaces")]
    pub select_interfaces: Vec<String>,
    #[serde(rename = "selectHostGroups")]
    pub select_host_groups: Vec<String>,
    #[serde(rename = "selectParentTemplates")]
    pub select_parent_templates: Vec<String>,
}

impl HostGet {
    fn expanded(filter: Option<Filter>, hostids: Option<Vec<String>>) -> Self {
        Self {
            output: fields(&HOST_OUTPUT),
            filter,
            hostids,
            select_interfaces: fields(&INTERFACE_OUTPUT),
            select_host_groups: fields(&GROUP_OUTPUT),
            select_parent_templates: fields(&TEMPLATE_OUTPUT),
        }
    }

    /// Hosts whose technical name equals any of `names`.
    pub fn by_technical_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::expanded(Some(Filter::host(names)), None)
    }

    /// Hosts whose display name equals `name`.
    pub fn by_display_name(name: impl Into<String>) -> Self {
        Self::expanded(Some(Filter::name(name)), None)
    }

    /// The host with the given id.
    pub fn by_id(host_id: impl Into<String>) -> Self {
        Self::expanded(None, Some(vec![host_id.into()]))
    }
}

impl RpcMethod for HostGet {
    const METHOD: &'static str = "host.get";
    type Response = Vec<RemoteHost>;
}

impl Query for HostGet {}

/// `host.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCreate {
    pub host: String,
    pub name: String,
    pub interfaces: Vec<NewInterface>,
    pub groups: Vec<GroupRef>,
    pub templates: Vec<TemplateRef>,
}

impl RpcMethod for HostCreate {
    const METHOD: &'static str = "host.create";
    type Response = HostIds;
}

impl Mutation for HostCreate {
    type Output = String;

    fn output(response: HostIds) -> Result<String> {
        first_id(Self::METHOD, response.host_ids)
    }
}

/// `host.update`
///
/// `groups` and `templates` link the listed entities; `templates_clear`
/// unlinks (and clears) the listed templates in the same call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUpdate {
    #[serde(rename = "hostid")]
    pub host_id: String,
    pub groups: Vec<GroupRef>,
    pub templates: Vec<TemplateRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates_clear: Vec<TemplateRef>,
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New technical name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl RpcMethod for HostUpdate {
    const METHOD: &'static str = "host.update";
    type Response = HostIds;
}

impl Mutation for HostUpdate {
    type Output = ();

    fn output(_response: HostIds) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Host interfaces
// ============================================================================

/// `hostinterface.get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterfaceGet {
    pub output: Vec<String>,
    pub filter: Filter,
}

impl HostInterfaceGet {
    pub fn by_ip(ip: impl Into<String>) -> Self {
        Self {
            output: fields(&INTERFACE_OUTPUT),
            filter: Filter::ip(ip),
        }
    }
}

impl RpcMethod for HostInterfaceGet {
    const METHOD: &'static str = "hostinterface.get";
    type Response = Vec<RemoteInterface>;
}

impl Query for HostInterfaceGet {}

/// `hostinterface.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterfaceCreate {
    #[serde(rename = "hostid")]
    pub host_id: String,
    #[serde(rename = "type")]
    pub kind: InterfaceKind,
    #[serde(with = "flag")]
    pub main: bool,
    #[serde(with = "flag")]
    pub useip: bool,
    pub ip: String,
    #[serde(default)]
    pub dns: String,
    pub port: String,
}

impl HostInterfaceCreate {
    pub fn new(host_id: impl Into<String>, interface: NewInterface) -> Self {
        Self {
            host_id: host_id.into(),
            kind: interface.kind,
            main: interface.main,
            useip: interface.useip,
            ip: interface.ip,
            dns: interface.dns,
            port: interface.port,
        }
    }
}

impl RpcMethod for HostInterfaceCreate {
    const METHOD: &'static str = "hostinterface.create";
    type Response = InterfaceIds;
}

impl Mutation for HostInterfaceCreate {
    type Output = String;

    fn output(response: InterfaceIds) -> Result<String> {
        first_id(Self::METHOD, response.interface_ids)
    }
}

/// `hostinterface.update` - readdress an interface, forcing IP mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInterfaceUpdate {
    #[serde(rename = "interfaceid")]
    pub interface_id: String,
    pub ip: String,
    #[serde(with = "flag")]
    pub useip: bool,
    pub dns: String,
}

impl HostInterfaceUpdate {
    pub fn readdress(interface_id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            interface_id: interface_id.into(),
            ip: ip.into(),
            useip: true,
            dns: String::new(),
        }
    }
}

impl RpcMethod for HostInterfaceUpdate {
    const METHOD: &'static str = "hostinterface.update";
    type Response = InterfaceIds;
}

impl Mutation for HostInterfaceUpdate {
    type Output = ();

    fn output(_response: InterfaceIds) -> Result<()> {
        Ok(())
    }
}
