//! Excusable-exception resolution
//!
//! Determines whether a delivery delay is excusable, voiding the Guaranteed
//! Service Refund. Matching is tiered: carrier exception code, then
//! operator-maintained keyword rules, then a static safety-net keyword
//! list that always applies.

use core_kernel::{ExceptionRuleId, PortError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::Carrier;
use crate::ports::ExceptionRuleStore;

/// How an exception rule matches carrier signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    /// Exact match against the carrier-provided exception code
    Code,
    /// Case-insensitive substring match against status free text
    Keyword,
}

/// An operator-maintained exception rule
///
/// Reference data: operators add carrier-specific rules without code
/// changes. The static fallback list below is the safety net when no rule
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub id: ExceptionRuleId,
    pub carrier: Carrier,
    pub match_type: MatchType,
    pub match_value: String,
    pub excusable: bool,
    pub category: String,
}

/// Static safety-net keywords; category reported as OTHER
pub const FALLBACK_KEYWORDS: [&str; 10] = [
    "WEATHER",
    "NATURAL DISASTER",
    "EMERGENCY",
    "FORCE MAJEURE",
    "STRIKE",
    "NATIONAL EMERGENCY",
    "SECURITY DELAY",
    "GOVERNMENT",
    "ACT OF GOD",
    "CLOSED DUE TO",
];

/// Outcome of exception matching, with provenance for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionMatch {
    pub found: bool,
    pub category: Option<String>,
    /// Which rule fired, e.g. "CODE:DE.WX" or "FALLBACK:WEATHER"
    pub signal: Option<String>,
}

impl ExceptionMatch {
    pub fn not_found() -> Self {
        Self {
            found: false,
            category: None,
            signal: None,
        }
    }

    pub fn matched(category: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            found: true,
            category: Some(category.into()),
            signal: Some(signal.into()),
        }
    }
}

/// Resolves exception status using the carrier's configured rules
pub async fn resolve_exception(
    store: &dyn ExceptionRuleStore,
    carrier: Carrier,
    code: Option<&str>,
    text: &str,
) -> Result<ExceptionMatch, PortError> {
    let rules = store.rules_for(carrier).await?;
    let outcome = match_exception(&rules, code, text);
    if outcome.found {
        debug!(carrier = %carrier, signal = outcome.signal.as_deref(), "excusable exception matched");
    }
    Ok(outcome)
}

/// Tiered exception matching; first hit wins
///
/// 1. Exact CODE-rule match, authoritative when the rule is excusable.
/// 2. KEYWORD-rule substring match against the free text, excusable rules
///    only.
/// 3. Static fallback keyword scan.
///
/// A matching rule marked non-excusable does not stop the search; the
/// safety net always gets its chance.
pub fn match_exception(rules: &[ExceptionRule], code: Option<&str>, text: &str) -> ExceptionMatch {
    if let Some(code) = code {
        let code = code.trim();
        if !code.is_empty() {
            for rule in rules.iter().filter(|r| r.match_type == MatchType::Code) {
                if rule.excusable && rule.match_value.eq_ignore_ascii_case(code) {
                    return ExceptionMatch::matched(
                        rule.category.clone(),
                        format!("CODE:{}", rule.match_value),
                    );
                }
            }
        }
    }

    let upper_text = text.to_uppercase();

    for rule in rules.iter().filter(|r| r.match_type == MatchType::Keyword) {
        if rule.excusable && upper_text.contains(&rule.match_value.to_uppercase()) {
            return ExceptionMatch::matched(
                rule.category.clone(),
                format!("KEYWORD:{}", rule.match_value),
            );
        }
    }

    for keyword in FALLBACK_KEYWORDS {
        if upper_text.contains(keyword) {
            return ExceptionMatch::matched("OTHER", format!("FALLBACK:{}", keyword));
        }
    }

    ExceptionMatch::not_found()
}
