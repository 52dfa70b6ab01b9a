//! Rate rule matching.
//!
//! A rate rule prices one (counterparty, vehicle type, work type, contract
//! type) combination from an effective date onward. Resolution returns an
//! explicit `Option`: no matching rule means the usage record waits for
//! manual pricing, it is not an error.

use chrono::NaiveDate;
use portledger_shared::types::{PartyId, RateRuleId, VehicleTypeId, WorkTypeId};
use rust_decimal::Decimal;

use crate::equipment::ContractType;

/// A unit-rate rule keyed by billing dimensions.
#[derive(Debug, Clone)]
pub struct RateRule {
    /// Unique identifier for the rule.
    pub id: RateRuleId,
    /// The counterparty this rate applies to.
    pub party: PartyId,
    /// The vehicle type this rate applies to.
    pub vehicle_type: VehicleTypeId,
    /// The work type this rate applies to.
    pub work_type: WorkTypeId,
    /// The contract type this rate applies to.
    pub contract_type: ContractType,
    /// The unit rate.
    pub rate: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
    /// Whether the rule is active.
    pub is_active: bool,
}

/// The dimensions a usage record is priced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateKey {
    /// The counterparty.
    pub party: PartyId,
    /// The vehicle type.
    pub vehicle_type: VehicleTypeId,
    /// The work type.
    pub work_type: WorkTypeId,
    /// The contract type.
    pub contract_type: ContractType,
}

/// Stateless resolver over a set of rate rules.
pub struct RateResolver;

impl RateResolver {
    /// Resolves the unit rate for a usage record.
    ///
    /// Considers active rules matching every key dimension whose effective
    /// date is not after the usage date; among those, the latest effective
    /// date wins. Returns `None` when no rule matches.
    #[must_use]
    pub fn resolve(rules: &[RateRule], key: &RateKey, usage_date: NaiveDate) -> Option<Decimal> {
        rules
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| {
                r.party == key.party
                    && r.vehicle_type == key.vehicle_type
                    && r.work_type == key.work_type
                    && r.contract_type == key.contract_type
            })
            .filter(|r| r.effective_date <= usage_date)
            .max_by_key(|r| r.effective_date)
            .map(|r| r.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key() -> RateKey {
        RateKey {
            party: PartyId::new(),
            vehicle_type: VehicleTypeId::new(),
            work_type: WorkTypeId::new(),
            contract_type: ContractType::Shift,
        }
    }

    fn rule(key: &RateKey, rate: Decimal, effective: NaiveDate) -> RateRule {
        RateRule {
            id: RateRuleId::new(),
            party: key.party,
            vehicle_type: key.vehicle_type,
            work_type: key.work_type,
            contract_type: key.contract_type,
            rate,
            effective_date: effective,
            is_active: true,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_single_match() {
        let key = key();
        let rules = vec![rule(&key, dec!(6000), date(2026, 1, 1))];
        assert_eq!(
            RateResolver::resolve(&rules, &key, date(2026, 3, 1)),
            Some(dec!(6000))
        );
    }

    #[test]
    fn test_resolve_no_match_returns_none() {
        let key = key();
        let other = self::key();
        let rules = vec![rule(&other, dec!(6000), date(2026, 1, 1))];
        assert_eq!(RateResolver::resolve(&rules, &key, date(2026, 3, 1)), None);
    }

    #[test]
    fn test_resolve_latest_effective_wins() {
        let key = key();
        let rules = vec![
            rule(&key, dec!(5500), date(2025, 7, 1)),
            rule(&key, dec!(6000), date(2026, 1, 1)),
            rule(&key, dec!(6500), date(2026, 6, 1)),
        ];
        // March usage: the January revision applies, not June.
        assert_eq!(
            RateResolver::resolve(&rules, &key, date(2026, 3, 1)),
            Some(dec!(6000))
        );
        // July usage picks up the June revision.
        assert_eq!(
            RateResolver::resolve(&rules, &key, date(2026, 7, 1)),
            Some(dec!(6500))
        );
    }

    #[test]
    fn test_resolve_future_rules_ignored() {
        let key = key();
        let rules = vec![rule(&key, dec!(6000), date(2026, 6, 1))];
        assert_eq!(RateResolver::resolve(&rules, &key, date(2026, 3, 1)), None);
    }

    #[test]
    fn test_resolve_effective_on_usage_date() {
        let key = key();
        let rules = vec![rule(&key, dec!(6000), date(2026, 3, 1))];
        assert_eq!(
            RateResolver::resolve(&rules, &key, date(2026, 3, 1)),
            Some(dec!(6000))
        );
    }

    #[test]
    fn test_resolve_skips_inactive_rules() {
        let key = key();
        let mut inactive = rule(&key, dec!(9999), date(2026, 2, 1));
        inactive.is_active = false;
        let rules = vec![inactive, rule(&key, dec!(6000), date(2026, 1, 1))];
        assert_eq!(
            RateResolver::resolve(&rules, &key, date(2026, 3, 1)),
            Some(dec!(6000))
        );
    }

    #[test]
    fn test_resolve_contract_type_is_part_of_key() {
        let shift_key = key();
        let hours_key = RateKey {
            contract_type: ContractType::Hours,
            ..shift_key
        };
        let rules = vec![rule(&shift_key, dec!(6000), date(2026, 1, 1))];
        assert_eq!(
            RateResolver::resolve(&rules, &hours_key, date(2026, 3, 1)),
            None
        );
    }
}
