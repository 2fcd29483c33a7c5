//! Core types for the reconciler.

use std::fmt;

use hostsync_core::SourceRow;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::split_multi;

/// Whether mutations reach the remote system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Mutations are logged and replaced by placeholders.
    #[default]
    Simulate,
    /// Mutations are executed.
    Apply,
}

impl RunMode {
    pub const fn from_apply_flag(apply: bool) -> Self {
        if apply { Self::Apply } else { Self::Simulate }
    }

    pub const fn is_simulation(self) -> bool {
        matches!(self, Self::Simulate)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulate => write!(f, "simulate"),
            Self::Apply => write!(f, "apply"),
        }
    }
}

/// Desired state for one host, parsed from a source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub row_number: u64,
    pub display_name: String,
    pub group_names: Vec<String>,
    pub address: String,
    pub template_names: Vec<String>,
}

impl DesiredRecord {
    /// Parse a raw row. Never fails; completeness is checked by
    /// [`DesiredRecord::validate`].
    pub fn from_row(row: &SourceRow) -> Self {
        Self {
            row_number: row.row_number,
            display_name: row.display_name.trim().to_string(),
            group_names: split_multi(Some(&row.groups_raw)),
            address: row.address.trim().to_string(),
            template_names: split_multi(Some(&row.templates_raw)),
        }
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.display_name.is_empty() {
            return Err(Error::validation("missing display name"));
        }
        if self.address.is_empty() {
            return Err(Error::validation("missing address"));
        }
        if self.group_names.is_empty() {
            return Err(Error::validation("at least one host group is required"));
        }
        if self.template_names.is_empty() {
            return Err(Error::validation("at least one template is required"));
        }
        Ok(())
    }
}

/// How an existing host was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Name,
    Address,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// What happened to one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Created {
        host_id: String,
        technical_name: String,
        display_name: String,
    },
    Updated {
        host_id: String,
        matched_by: MatchStrategy,
    },
}

/// Outcome category written to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Created,
    Updated,
    WouldCreate,
    WouldUpdate,
    Error,
}

impl OutcomeKind {
    /// Report label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::WouldCreate => "WOULD_CREATE",
            Self::WouldUpdate => "WOULD_UPDATE",
            Self::Error => "ERROR",
        }
    }

    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classified result for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub row_number: u64,
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn new(row_number: u64, kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            row_number,
            kind,
            message: message.into(),
        }
    }

    pub const fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}
