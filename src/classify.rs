use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::reconcile::ReconciledRecord;

/// Outcome flags attached to a call by the occurrence lookup. `None` means
/// the lookup had no value for that flag.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OutcomeFlags {
    pub attempt: Option<f64>,
    pub answered: Option<f64>,
    pub cpc: Option<f64>,
    pub promise: Option<f64>,
}

/// The truthiness rule shared by every flag: present and strictly positive.
pub fn is_set(flag: Option<f64>) -> bool {
    flag.is_some_and(|value| value > 0.0)
}

impl OutcomeFlags {
    /// Per-flag maximum. An absent flag never beats a present one.
    pub fn max(self, other: OutcomeFlags) -> OutcomeFlags {
        OutcomeFlags {
            attempt: max_present(self.attempt, other.attempt),
            answered: max_present(self.answered, other.answered),
            cpc: max_present(self.cpc, other.cpc),
            promise: max_present(self.promise, other.promise),
        }
    }
}

fn max_present(lhs: Option<f64>, rhs: Option<f64>) -> Option<f64> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(lhs.max(rhs)),
        (value, None) | (None, value) => value,
    }
}

/// Single classification of a phone within a service. Declaration order is
/// precedence order, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OutcomeLabel {
    Promise,
    RightPartyContact,
    Answered,
    Attempted,
    NoActivity,
}

impl OutcomeLabel {
    pub const ALL: [OutcomeLabel; 5] = [
        OutcomeLabel::Promise,
        OutcomeLabel::RightPartyContact,
        OutcomeLabel::Answered,
        OutcomeLabel::Attempted,
        OutcomeLabel::NoActivity,
    ];

    /// Label used in the report columns.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeLabel::Promise => "promessa",
            OutcomeLabel::RightPartyContact => "cpc",
            OutcomeLabel::Answered => "alo",
            OutcomeLabel::Attempted => "tentativa",
            OutcomeLabel::NoActivity => "nenhuma",
        }
    }
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the strongest outcome whose flag is set: promise, then CPC, then
/// answered, then attempted. Falls back to [`OutcomeLabel::NoActivity`].
pub fn classify(flags: &OutcomeFlags) -> OutcomeLabel {
    if is_set(flags.promise) {
        OutcomeLabel::Promise
    } else if is_set(flags.cpc) {
        OutcomeLabel::RightPartyContact
    } else if is_set(flags.answered) {
        OutcomeLabel::Answered
    } else if is_set(flags.attempt) {
        OutcomeLabel::Attempted
    } else {
        OutcomeLabel::NoActivity
    }
}

/// Best outcome observed for one phone within one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePhoneOutcome {
    pub service: String,
    pub phone: String,
    pub flags: OutcomeFlags,
    pub label: OutcomeLabel,
}

/// Collapses reconciled calls into one classified row per `(service, phone)`,
/// ordered by service then phone. Records without a service are left out;
/// unmapped records contribute no flags.
pub fn collapse_by_service(records: &[ReconciledRecord]) -> Vec<ServicePhoneOutcome> {
    let mut grouped: BTreeMap<(&str, &str), OutcomeFlags> = BTreeMap::new();
    for record in records {
        if record.service.is_empty() {
            continue;
        }
        let flags = record.flags.unwrap_or_default();
        grouped
            .entry((record.service.as_str(), record.phone.as_str()))
            .and_modify(|current| *current = current.max(flags))
            .or_insert(flags);
    }

    grouped
        .into_iter()
        .map(|((service, phone), flags)| ServicePhoneOutcome {
            service: service.to_string(),
            phone: phone.to_string(),
            flags,
            label: classify(&flags),
        })
        .collect()
}
