use crate::round_cents;
use serde::{Deserialize, Serialize};
use transfer_domain::{Adjustment, PricingRule, TripLeg};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedRule {
    pub rule_id: Uuid,
    pub name: String,
    pub adjustment: Adjustment,
    /// Signed effect on the running subtotal, in cents.
    pub delta_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleOutcome {
    pub adjusted_subtotal_cents: i64,
    pub applied_rules: Vec<AppliedRule>,
}

impl RuleOutcome {
    pub fn total_adjustment_cents(&self) -> i64 {
        self.applied_rules.iter().map(|r| r.delta_cents).sum()
    }
}

/// Apply every matching rule to a running subtotal, lowest priority number
/// first. Percentage rules multiply the running subtotal (so a later
/// percentage applies on top of earlier fixed adjustments), fixed rules
/// add. Ties are broken by rule id so the order is reproducible for the
/// same rule set, and re-running on the same input always yields the same
/// result. The subtotal clamps at zero.
pub fn apply_rules(rules: &[PricingRule], leg: &TripLeg, subtotal_cents: i64) -> RuleOutcome {
    let mut matched: Vec<&PricingRule> = rules
        .iter()
        .filter(|rule| rule.matches(leg.route_id, leg.date, leg.time, leg.weekday()))
        .collect();
    matched.sort_by_key(|rule| (rule.priority, rule.id));

    let mut subtotal = subtotal_cents;
    let mut applied = Vec::with_capacity(matched.len());

    for rule in matched {
        let next = match rule.adjustment {
            Adjustment::Percentage(percent) => {
                round_cents(subtotal as f64 * (1.0 + percent / 100.0))
            }
            Adjustment::Fixed(cents) => subtotal + cents,
        };
        let next = next.max(0);
        applied.push(AppliedRule {
            rule_id: rule.id,
            name: rule.name.clone(),
            adjustment: rule.adjustment,
            delta_cents: next - subtotal,
        });
        subtotal = next;
    }

    RuleOutcome {
        adjusted_subtotal_cents: subtotal,
        applied_rules: applied,
    }
}
