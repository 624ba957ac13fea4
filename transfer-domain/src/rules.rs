use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed price adjustment attached to a pricing rule. Negative values are
/// promotions, positive values surcharges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "adjustment_type", content = "adjustment_value", rename_all = "snake_case")]
pub enum Adjustment {
    /// Percentage of the running subtotal.
    Percentage(f64),
    /// Flat amount in cents.
    Fixed(i64),
}

/// Time/route-conditional price adjustment maintained by operators and
/// read-only to the pricing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: Uuid,
    pub name: String,

    /// None matches every route.
    pub route_id: Option<Uuid>,

    /// Inclusive date window; open ends are unbounded.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Inclusive time-of-day window; open ends are unbounded.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,

    /// Empty set matches every weekday.
    pub days_of_week: Vec<Weekday>,

    #[serde(flatten)]
    pub adjustment: Adjustment,

    /// Lower numbers are applied first.
    pub priority: i32,
    pub is_active: bool,
}

impl PricingRule {
    /// Whether this rule covers the given leg coordinates.
    pub fn matches(
        &self,
        route_id: Option<Uuid>,
        date: NaiveDate,
        time: NaiveTime,
        weekday: Weekday,
    ) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(rule_route) = self.route_id {
            if route_id != Some(rule_route) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if time < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if time > end {
                return false;
            }
        }
        if !self.days_of_week.is_empty() && !self.days_of_week.contains(&weekday) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn rule() -> PricingRule {
        PricingRule {
            id: Uuid::new_v4(),
            name: "Alta temporada".to_string(),
            route_id: None,
            start_date: None,
            end_date: None,
            start_time: None,
            end_time: None,
            days_of_week: vec![],
            adjustment: Adjustment::Percentage(15.0),
            priority: 1,
            is_active: true,
        }
    }

    #[test]
    fn empty_weekday_set_matches_every_day() {
        let rule = rule();
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        for offset in 0..7 {
            let day = date + chrono::Duration::days(offset);
            assert!(rule.matches(None, day, time, day.weekday()));
        }
    }

    #[test]
    fn date_outside_window_matches_nothing() {
        let mut rule = rule();
        rule.start_date = NaiveDate::from_ymd_opt(2026, 12, 20);
        rule.end_date = NaiveDate::from_ymd_opt(2027, 1, 5);

        let inside = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        let outside = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        assert!(rule.matches(None, inside, time, inside.weekday()));
        assert!(!rule.matches(None, outside, time, outside.weekday()));
    }

    #[test]
    fn route_bound_rule_requires_exact_route() {
        let mut rule = rule();
        let route = Uuid::new_v4();
        rule.route_id = Some(route);

        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        assert!(rule.matches(Some(route), date, time, date.weekday()));
        assert!(!rule.matches(Some(Uuid::new_v4()), date, time, date.weekday()));
        assert!(!rule.matches(None, date, time, date.weekday()));
    }

    #[test]
    fn inactive_rule_never_matches() {
        let mut rule = rule();
        rule.is_active = false;
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(!rule.matches(None, date, time, date.weekday()));
    }
}
