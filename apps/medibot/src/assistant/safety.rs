//! # Escalation
//!
//! Flags fact lists that name a condition needing urgent care.

/// Conditions whose mention triggers the emergency notice.
pub const HIGH_RISK_CONDITIONS: [&str; 3] = ["HeartAttack", "Stroke", "Cancer"];

/// Appended to `facts_used` when a high-risk condition is named.
pub const EMERGENCY_NOTICE: &str = " ⚠️ This may indicate a medical emergency. Seek immediate help.";

/// True when `facts` names a high-risk condition as a whole identifier.
///
/// `HeartAttackRisk` does not match `HeartAttack`.
#[must_use]
pub fn is_high_risk(facts: &str) -> bool {
    facts
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| HIGH_RISK_CONDITIONS.contains(&token))
}

/// Append the emergency notice when `facts` is high-risk.
#[must_use]
pub fn escalate(mut facts: String) -> String {
    if is_high_risk(&facts) {
        tracing::info!("High-risk condition in facts, escalating");
        facts.push_str(EMERGENCY_NOTICE);
    }
    facts
}
