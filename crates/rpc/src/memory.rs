//! In-memory stand-in for the remote monitoring system.
//!
//! [`InMemoryZabbix`] implements [`Transport`] over a small, mutable model of
//! host groups, template groups, templates, hosts and interfaces. It decodes
//! params into the same request types the client sends, records every call and
//! can be told to fail a method. Used by the engine and CLI test suites.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Transport;
use crate::error::{Error, Result};
use crate::method::RpcMethod;
use crate::types::{
    ApiInfoVersion, CreatedGroups, CreatedTemplates, Filter, HostCreate, HostGet, HostGroupCreate,
    HostGroupGet, HostIds, HostInterfaceCreate, HostInterfaceGet, HostInterfaceUpdate,
    HostUpdate, InterfaceIds, NewInterface, RemoteGroup, RemoteHost, RemoteInterface,
    RemoteTemplate, TemplateCreate, TemplateGet, TemplateGroupCreate, TemplateGroupGet,
};

/// Version reported by `apiinfo.version`.
pub const FAKE_API_VERSION: &str = "7.4.0";

const FIRST_ID: u64 = 10_001;
const CODE_INVALID_PARAMS: i64 = -32_602;
const CODE_APPLICATION: i64 = -32_500;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

impl RecordedCall {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        self.method.ends_with(".create") || self.method.ends_with(".update")
    }
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    template: RemoteTemplate,
    group_ids: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredHost {
    host_id: String,
    host: String,
    name: String,
    group_ids: Vec<String>,
    template_ids: Vec<String>,
}

#[derive(Debug)]
struct State {
    next_id: u64,
    host_groups: Vec<RemoteGroup>,
    template_groups: Vec<RemoteGroup>,
    templates: Vec<StoredTemplate>,
    hosts: Vec<StoredHost>,
    interfaces: Vec<RemoteInterface>,
    calls: Vec<RecordedCall>,
    failures: HashMap<String, String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_id: FIRST_ID,
            host_groups: Vec::new(),
            template_groups: Vec::new(),
            templates: Vec::new(),
            hosts: Vec::new(),
            interfaces: Vec::new(),
            calls: Vec::new(),
            failures: HashMap::new(),
        }
    }
}

impl State {
    fn allocate(&mut self) -> String {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id.to_string()
    }

    fn expand(&self, stored: &StoredHost) -> RemoteHost {
        RemoteHost {
            host_id: stored.host_id.clone(),
            host: stored.host.clone(),
            name: stored.name.clone(),
            interfaces: self
                .interfaces
                .iter()
                .filter(|i| i.host_id == stored.host_id)
                .cloned()
                .collect(),
            groups: stored
                .group_ids
                .iter()
                .filter_map(|id| self.host_groups.iter().find(|g| &g.group_id == id))
                .cloned()
                .collect(),
            templates: stored
                .template_ids
                .iter()
                .filter_map(|id| {
                    self.templates
                        .iter()
                        .find(|t| &t.template.template_id == id)
                })
                .map(|t| t.template.clone())
                .collect(),
        }
    }

    fn host_mut(&mut self, method: &str, host_id: &str) -> Result<&mut StoredHost> {
        self.hosts
            .iter_mut()
            .find(|h| h.host_id == host_id)
            .ok_or_else(|| missing_object(method))
    }

    fn add_interface(&mut self, host_id: &str, interface: NewInterface) -> String {
        let interface_id = self.allocate();
        self.interfaces.push(RemoteInterface {
            interface_id: interface_id.clone(),
            host_id: host_id.to_string(),
            kind: interface.kind,
            main: interface.main,
            useip: interface.useip,
            ip: interface.ip,
            dns: interface.dns,
            port: interface.port,
        });
        interface_id
    }
}

/// In-memory remote system.
#[derive(Debug, Default)]
pub struct InMemoryZabbix {
    state: RefCell<State>,
}

impl InMemoryZabbix {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Add a host group and return its id.
    pub fn seed_host_group(&self, name: &str) -> String {
        let mut state = self.state.borrow_mut();
        let group_id = state.allocate();
        state.host_groups.push(RemoteGroup {
            group_id: group_id.clone(),
            name: name.to_string(),
        });
        group_id
    }

    /// Add a template group and return its id.
    pub fn seed_template_group(&self, name: &str) -> String {
        let mut state = self.state.borrow_mut();
        let group_id = state.allocate();
        state.template_groups.push(RemoteGroup {
            group_id: group_id.clone(),
            name: name.to_string(),
        });
        group_id
    }

    /// Add a template (technical name `host`, display name `name`).
    pub fn seed_template(&self, host: &str, name: &str) -> String {
        let mut state = self.state.borrow_mut();
        let template_id = state.allocate();
        state.templates.push(StoredTemplate {
            template: RemoteTemplate {
                template_id: template_id.clone(),
                host: host.to_string(),
                name: name.to_string(),
            },
            group_ids: Vec::new(),
        });
        template_id
    }

    /// Add a bare host with no interfaces, groups or templates.
    pub fn seed_host(&self, host: &str, name: &str) -> String {
        let mut state = self.state.borrow_mut();
        let host_id = state.allocate();
        state.hosts.push(StoredHost {
            host_id: host_id.clone(),
            host: host.to_string(),
            name: name.to_string(),
            group_ids: Vec::new(),
            template_ids: Vec::new(),
        });
        host_id
    }

    /// Attach an interface to a host and return its id.
    pub fn seed_interface(&self, host_id: &str, interface: NewInterface) -> String {
        self.state.borrow_mut().add_interface(host_id, interface)
    }

    /// Put a host into a host group.
    pub fn seed_membership(&self, host_id: &str, group_id: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(host) = state.hosts.iter_mut().find(|h| h.host_id == host_id) {
            host.group_ids.push(group_id.to_string());
        }
    }

    /// Link a template to a host.
    pub fn seed_link(&self, host_id: &str, template_id: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(host) = state.hosts.iter_mut().find(|h| h.host_id == host_id) {
            host.template_ids.push(template_id.to_string());
        }
    }

    /// Make every subsequent call to `method` fail with a remote error.
    pub fn fail_on(&self, method: &str, data: &str) {
        self.state
            .borrow_mut()
            .failures
            .insert(method.to_string(), data.to_string());
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// All hosts, expanded.
    pub fn hosts(&self) -> Vec<RemoteHost> {
        let state = self.state.borrow();
        state.hosts.iter().map(|h| state.expand(h)).collect()
    }

    /// One host by id, expanded.
    pub fn host(&self, host_id: &str) -> Option<RemoteHost> {
        let state = self.state.borrow();
        state
            .hosts
            .iter()
            .find(|h| h.host_id == host_id)
            .map(|h| state.expand(h))
    }

    pub fn host_groups(&self) -> Vec<RemoteGroup> {
        self.state.borrow().host_groups.clone()
    }

    pub fn template_groups(&self) -> Vec<RemoteGroup> {
        self.state.borrow().template_groups.clone()
    }

    pub fn templates(&self) -> Vec<RemoteTemplate> {
        self.state
            .borrow()
            .templates
            .iter()
            .map(|t| t.template.clone())
            .collect()
    }

    /// Template groups a template was placed in.
    pub fn template_group_ids(&self, template_id: &str) -> Vec<String> {
        self.state
            .borrow()
            .templates
            .iter()
            .find(|t| t.template.template_id == template_id)
            .map(|t| t.group_ids.clone())
            .unwrap_or_default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    /// Calls to `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Number of state-changing calls received.
    pub fn mutation_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
        let mut state = self.state.borrow_mut();
        match method {
            ApiInfoVersion::METHOD => reply(method, &FAKE_API_VERSION),
            HostGroupGet::METHOD => {
                let request: HostGroupGet = decode(params)?;
                reply(method, &find_groups(&state.host_groups, &request.filter))
            }
            TemplateGroupGet::METHOD => {
                let request: TemplateGroupGet = decode(params)?;
                reply(method, &find_groups(&state.template_groups, &request.filter))
            }
            HostGroupCreate::METHOD => {
                let request: HostGroupCreate = decode(params)?;
                let group_id = create_group(&mut state, method, request.name, false)?;
                reply(method, &CreatedGroups {
                    group_ids: vec![group_id],
                })
            }
            TemplateGroupCreate::METHOD => {
                let request: TemplateGroupCreate = decode(params)?;
                let group_id = create_group(&mut state, method, request.name, true)?;
                reply(method, &CreatedGroups {
                    group_ids: vec![group_id],
                })
            }
            TemplateGet::METHOD => {
                let request: TemplateGet = decode(params)?;
                let found: Vec<RemoteTemplate> = state
                    .templates
                    .iter()
                    .map(|t| &t.template)
                    .filter(|t| {
                        matches_any(request.filter.host.as_ref(), &t.host)
                            && matches_any(request.filter.name.as_ref(), &t.name)
                    })
                    .cloned()
                    .collect();
                reply(method, &found)
            }
            TemplateCreate::METHOD => {
                let request: TemplateCreate = decode(params)?;
                let template_id = create_template(&mut state, method, request)?;
                reply(method, &CreatedTemplates {
                    template_ids: vec![template_id],
                })
            }
            HostGet::METHOD => {
                let request: HostGet = decode(params)?;
                let filter = request.filter.unwrap_or_default();
                let found: Vec<RemoteHost> = state
                    .hosts
                    .iter()
                    .filter(|h| {
                        matches_any(filter.host.as_ref(), &h.host)
                            && matches_any(filter.name.as_ref(), &h.name)
                            && matches_any(request.hostids.as_ref(), &h.host_id)
                    })
                    .map(|h| state.expand(h))
                    .collect();
                reply(method, &found)
            }
            HostCreate::METHOD => {
                let request: HostCreate = decode(params)?;
                let host_id = create_host(&mut state, method, request)?;
                reply(method, &HostIds {
                    host_ids: vec![host_id],
                })
            }
            HostUpdate::METHOD => {
                let request: HostUpdate = decode(params)?;
                let host_id = update_host(&mut state, method, request)?;
                reply(method, &HostIds {
                    host_ids: vec![host_id],
                })
            }
            HostInterfaceGet::METHOD => {
                let request: HostInterfaceGet = decode(params)?;
                let found: Vec<RemoteInterface> = state
                    .interfaces
                    .iter()
                    .filter(|i| matches_any(request.filter.ip.as_ref(), &i.ip))
                    .cloned()
                    .collect();
                reply(method, &found)
            }
            HostInterfaceCreate::METHOD => {
                let request: HostInterfaceCreate = decode(params)?;
                state.host_mut(method, &request.host_id)?;
                let interface = NewInterface {
                    kind: request.kind,
                    main: request.main,
                    useip: request.useip,
                    ip: request.ip,
                    dns: request.dns,
                    port: request.port,
                };
                let interface_id = state.add_interface(&request.host_id, interface);
                reply(method, &InterfaceIds {
                    interface_ids: vec![interface_id],
                })
            }
            HostInterfaceUpdate::METHOD => {
                let request: HostInterfaceUpdate = decode(params)?;
                let interface = state
                    .interfaces
                    .iter_mut()
                    .find(|i| i.interface_id == request.interface_id)
                    .ok_or_else(|| missing_object(method))?;
                interface.ip = request.ip;
                interface.useip = request.useip;
                interface.dns = request.dns;
                reply(method, &InterfaceIds {
                    interface_ids: vec![request.interface_id],
                })
            }
            other => Err(Error::remote(
                other,
                CODE_INVALID_PARAMS,
                "Invalid params.",
                format!("Incorrect API \"{other}\"."),
            )),
        }
    }
}

impl Transport for InMemoryZabbix {
    fn send(&self, method: &str, params: Value) -> Result<Value> {
        let injected = {
            let mut state = self.state.borrow_mut();
            state.calls.push(RecordedCall {
                method: method.to_string(),
                params: params.clone(),
            });
            state.failures.get(method).cloned()
        };

        if let Some(data) = injected {
            return Err(Error::remote(
                method,
                CODE_APPLICATION,
                "Application error.",
                data,
            ));
        }

        self.dispatch(method, params)
    }
}

fn decode<M: RpcMethod + DeserializeOwned>(params: Value) -> Result<M> {
    serde_json::from_value(params).map_err(|e| {
        Error::remote(
            M::METHOD,
            CODE_INVALID_PARAMS,
            "Invalid params.",
            e.to_string(),
        )
    })
}

fn reply<R: Serialize>(method: &str, response: &R) -> Result<Value> {
    serde_json::to_value(response).map_err(|e| Error::invalid_response(method, e.to_string()))
}

fn matches_any(wanted: Option<&Vec<String>>, actual: &str) -> bool {
    wanted.is_none_or(|values| values.iter().any(|v| v == actual))
}

fn find_groups(groups: &[RemoteGroup], filter: &Filter) -> Vec<RemoteGroup> {
    groups
        .iter()
        .filter(|g| matches_any(filter.name.as_ref(), &g.name))
        .cloned()
        .collect()
}

fn already_exists(method: &str, what: &str) -> Error {
    Error::remote(
        method,
        CODE_INVALID_PARAMS,
        "Invalid params.",
        format!("{what} already exists."),
    )
}

fn missing_object(method: &str) -> Error {
    Error::remote(
        method,
        CODE_INVALID_PARAMS,
        "Invalid params.",
        "No permissions to referred object or it does not exist!",
    )
}

fn create_group(state: &mut State, method: &str, name: String, template: bool) -> Result<String> {
    let (label, exists) = if template {
        (
            "Template group",
            state.template_groups.iter().any(|g| g.name == name),
        )
    } else {
        (
            "Host group",
            state.host_groups.iter().any(|g| g.name == name),
        )
    };
    if exists {
        return Err(already_exists(method, &format!("{label} \"{name}\"")));
    }

    let group_id = state.allocate();
    let group = RemoteGroup {
        group_id: group_id.clone(),
        name,
    };
    if template {
        state.template_groups.push(group);
    } else {
        state.host_groups.push(group);
    }
    Ok(group_id)
}

fn create_template(state: &mut State, method: &str, request: TemplateCreate) -> Result<String> {
    if state
        .templates
        .iter()
        .any(|t| t.template.host == request.host || t.template.name == request.name)
    {
        return Err(already_exists(
            method,
            &format!("Template with the same name \"{}\"", request.host),
        ));
    }
    let group_ids: Vec<String> = request.groups.into_iter().map(|g| g.group_id).collect();
    if let Some(unknown) = group_ids
        .iter()
        .find(|id| !state.template_groups.iter().any(|g| &&g.group_id == id))
    {
        return Err(Error::remote(
            method,
            CODE_INVALID_PARAMS,
            "Invalid params.",
            format!("Template group with ID \"{unknown}\" is not available."),
        ));
    }

    let template_id = state.allocate();
    state.templates.push(StoredTemplate {
        template: RemoteTemplate {
            template_id: template_id.clone(),
            host: request.host,
            name: request.name,
        },
        group_ids,
    });
    Ok(template_id)
}

fn create_host(state: &mut State, method: &str, request: HostCreate) -> Result<String> {
    if state.hosts.iter().any(|h| h.host == request.host) {
        return Err(already_exists(
            method,
            &format!("Host with the same name \"{}\"", request.host),
        ));
    }
    if state.hosts.iter().any(|h| h.name == request.name) {
        return Err(already_exists(
            method,
            &format!("Host with the same visible name \"{}\"", request.name),
        ));
    }

    let host_id = state.allocate();
    state.hosts.push(StoredHost {
        host_id: host_id.clone(),
        host: request.host,
        name: request.name,
        group_ids: request.groups.into_iter().map(|g| g.group_id).collect(),
        template_ids: request
            .templates
            .into_iter()
            .map(|t| t.template_id)
            .collect(),
    });
    for interface in request.interfaces {
        state.add_interface(&host_id, interface);
    }
    Ok(host_id)
}

/// Groups and templates are linked additively; `templates_clear` unlinks.
fn update_host(state: &mut State, method: &str, request: HostUpdate) -> Result<String> {
    let clash = request.name.as_ref().filter(|name| {
        state
            .hosts
            .iter()
            .any(|h| &&h.name == name && h.host_id != request.host_id)
    });
    if let Some(name) = clash {
        return Err(already_exists(
            method,
            &format!("Host with the same visible name \"{name}\""),
        ));
    }

    let host = state.host_mut(method, &request.host_id)?;

    for group in request.groups {
        if !host.group_ids.contains(&group.group_id) {
            host.group_ids.push(group.group_id);
        }
    }
    host.template_ids
        .retain(|id| !request.templates_clear.iter().any(|t| &t.template_id == id));
    for template in request.templates {
        if !host.template_ids.contains(&template.template_id) {
            host.template_ids.push(template.template_id);
        }
    }
    if let Some(name) = request.name {
        host.name = name;
    }
    if let Some(technical) = request.host {
        host.host = technical;
    }
    Ok(request.host_id)
}
