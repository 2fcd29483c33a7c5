//! Ensure-exists resolution of groups and templates.
//!
//! Every call looks the name up first and only creates on a miss. Nothing is
//! cached between calls, so repeated names re-query the remote system.

use std::marker::PhantomData;

use hostsync_rpc::{
    GroupRef, HostGroupCreate, HostGroupGet, Mutation, Query, RemoteGroup, TemplateCreate,
    TemplateGet, TemplateGroupCreate, TemplateGroupGet, Transport,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::gate::SimulationGate;
use crate::text::sanitize_technical_name;

/// One of the two disjoint group namespaces.
pub trait GroupNamespace {
    /// Label used in logs.
    const KIND: &'static str;

    type Get: Query<Response = Vec<RemoteGroup>>;
    type Create: Mutation<Output = String>;

    fn get(name: &str) -> Self::Get;
    fn create(name: &str) -> Self::Create;
}

/// Host groups (`hostgroup.*`).
#[derive(Debug, Clone, Copy)]
pub struct HostGroups;

impl GroupNamespace for HostGroups {
    const KIND: &'static str = "host group";

    type Get = HostGroupGet;
    type Create = HostGroupCreate;

    fn get(name: &str) -> HostGroupGet {
        HostGroupGet::by_name(name)
    }

    fn create(name: &str) -> HostGroupCreate {
        HostGroupCreate::new(name)
    }
}

/// Template groups (`templategroup.*`).
#[derive(Debug, Clone, Copy)]
pub struct TemplateGroups;

impl GroupNamespace for TemplateGroups {
    const KIND: &'static str = "template group";

    type Get = TemplateGroupGet;
    type Create = TemplateGroupCreate;

    fn get(name: &str) -> TemplateGroupGet {
        TemplateGroupGet::by_name(name)
    }

    fn create(name: &str) -> TemplateGroupCreate {
        TemplateGroupCreate::new(name)
    }
}

/// Resolves group names to ids within one namespace.
pub struct GroupResolver<'g, 'a, T, N> {
    gate: &'g SimulationGate<'a, T>,
    namespace: PhantomData<N>,
}

impl<'g, 'a, T: Transport, N: GroupNamespace> GroupResolver<'g, 'a, T, N> {
    pub const fn new(gate: &'g SimulationGate<'a, T>) -> Self {
        Self {
            gate,
            namespace: PhantomData,
        }
    }

    /// Id of the group called `name`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the lookup or the creation fails.
    pub fn ensure(&self, name: &str) -> Result<String> {
        let found = self.gate.read(&N::get(name))?;
        if let Some(group) = found.into_iter().next() {
            debug!(kind = N::KIND, name, group_id = %group.group_id, "Found existing group");
            return Ok(group.group_id);
        }

        let group_id = self.gate.write(&N::create(name))?;
        info!(kind = N::KIND, name, group_id = %group_id, "Created group");
        Ok(group_id)
    }
}

/// Resolves template names to ids, creating empty templates on a miss.
pub struct TemplateResolver<'g, 'a, T> {
    gate: &'g SimulationGate<'a, T>,
    default_group: &'g str,
    max_name_len: usize,
}

impl<'g, 'a, T: Transport> TemplateResolver<'g, 'a, T> {
    pub const fn new(
        gate: &'g SimulationGate<'a, T>,
        default_group: &'g str,
        max_name_len: usize,
    ) -> Self {
        Self {
            gate,
            default_group,
            max_name_len,
        }
    }

    /// Id of the template named `name` (technical name first, then display
    /// name). A missing template is created empty in the default template
    /// group.
    ///
    /// # Errors
    ///
    /// Returns `Api` when a lookup or creation fails.
    pub fn ensure(&self, name: &str) -> Result<String> {
        if let Some(found) = self.lookup(name)? {
            return Ok(found);
        }

        let group_id = GroupResolver::<T, TemplateGroups>::new(self.gate).ensure(self.default_group)?;
        let technical_name = sanitize_technical_name(name, self.max_name_len);

        let template_id = self.gate.write(&TemplateCreate {
            host: technical_name.clone(),
            name: name.to_string(),
            groups: vec![GroupRef::new(group_id)],
        })?;
        info!(name, host = %technical_name, template_id = %template_id, "Created template");
        Ok(template_id)
    }

    fn lookup(&self, name: &str) -> Result<Option<String>> {
        let by_host = self.gate.read(&TemplateGet::by_technical_name(name))?;
        if let Some(template) = by_host.into_iter().next() {
            return Ok(Some(template.template_id));
        }

        let by_name = self.gate.read(&TemplateGet::by_display_name(name))?;
        Ok(by_name.into_iter().next().map(|t| t.template_id))
    }
}
