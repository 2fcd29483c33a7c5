//! Map a per-record result to a report outcome.

use crate::error::Result;
use crate::types::{Outcome, OutcomeKind, Reconciliation, RunMode};

pub struct OutcomeClassifier;

impl OutcomeClassifier {
    pub fn classify(row_number: u64, mode: RunMode, result: &Result<Reconciliation>) -> Outcome {
        let simulated = mode.is_simulation();
        match result {
            Ok(Reconciliation::Created {
                technical_name,
                display_name,
                ..
            }) => {
                let (kind, verb) = if simulated {
                    (OutcomeKind::WouldCreate, "would be created")
                } else {
                    (OutcomeKind::Created, "created")
                };
                Outcome::new(
                    row_number,
                    kind,
                    format!(
                        "host did not exist; {verb} (name='{display_name}', host='{technical_name}')"
                    ),
                )
            }
            Ok(Reconciliation::Updated {
                host_id,
                matched_by,
            }) => {
                let (kind, verb) = if simulated {
                    (OutcomeKind::WouldUpdate, "would be updated")
                } else {
                    (OutcomeKind::Updated, "updated")
                };
                Outcome::new(
                    row_number,
                    kind,
                    format!("existing host (matched by {matched_by}); {verb} (hostid={host_id})"),
                )
            }
            Err(err) => Outcome::new(row_number, OutcomeKind::Error, err.to_string()),
        }
    }
}
