#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # hostsync-rpc
//!
//! Typed client for the Zabbix JSON-RPC API.
//!
//! ## Features
//!
//! - One request struct per method, tagged as [`Query`] or [`Mutation`]
//! - Tolerant decoding of string-encoded numbers and flags
//! - Blocking HTTP transport with bearer-token auth and per-call timeout
//! - [`InMemoryZabbix`], an in-process remote for tests
//!
//! ## Example
//!
//! ```ignore
//! use hostsync_rpc::{ApiClient, ApiConfig, HostGroupGet};
//!
//! let config = ApiConfig::default().overlay_env()?;
//! let client = ApiClient::connect(&config)?;
//! let groups = client.call(&HostGroupGet::by_name("Linux servers"))?;
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod method;
pub mod types;

pub use client::{ApiClient, HttpTransport, Transport};
pub use codec::InterfaceKind;
pub use config::{ApiConfig, ENV_API_TIMEOUT, ENV_API_TOKEN, ENV_API_URL};
pub use error::{Error, Result};
pub use memory::{InMemoryZabbix, RecordedCall};
pub use method::{Mutation, Query, RpcMethod};
pub use types::{
    ApiInfoVersion, CreatedGroups, CreatedTemplates, Filter, GroupRef, HostCreate, HostGet,
    HostGroupCreate, HostGroupGet, HostIds, HostInterfaceCreate, HostInterfaceGet,
    HostInterfaceUpdate, HostUpdate, InterfaceIds, NewInterface, RemoteGroup, RemoteHost,
    RemoteInterface, RemoteTemplate, TemplateCreate, TemplateGet, TemplateGroupCreate,
    TemplateGroupGet, TemplateRef,
};
