//! Billable quantity and cost derivation for equipment usage.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::EquipmentError;

/// Hours in one billing shift.
pub const HOURS_PER_SHIFT: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Billing contract type for hired equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// One lump sum regardless of duration.
    Fixed,
    /// Billed per shift, rounded up to half shifts.
    Shift,
    /// Billed per tonne; quantity supplied by the closer.
    Tonnes,
    /// Billed per elapsed hour.
    Hours,
}

impl ContractType {
    /// Returns the string representation of the contract type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Shift => "shift",
            Self::Tonnes => "tonnes",
            Self::Hours => "hours",
        }
    }

    /// Parses a contract type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "shift" => Some(Self::Shift),
            "tonnes" => Some(Self::Tonnes),
            "hours" => Some(Self::Hours),
            _ => None,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of closing a usage record.
///
/// `rate` and `total` stay `None` when no rate rule matched; the record
/// then awaits manual pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedCost {
    /// Elapsed duration in fractional hours (2 dp).
    pub duration_hours: Decimal,
    /// Billable quantity for the contract type.
    pub quantity: Decimal,
    /// Unit rate, if known.
    pub rate: Option<Decimal>,
    /// `quantity × rate`, if the rate is known.
    pub total: Option<Decimal>,
}

/// Stateless engine deriving billable cost from a usage interval.
pub struct CostEngine;

impl CostEngine {
    /// Derives the full cost for a closing usage record.
    ///
    /// # Arguments
    ///
    /// * `contract_type` - Billing contract for this hire
    /// * `start` / `end` - The usage interval
    /// * `explicit_quantity` - Quantity supplied by the closer (tonnes only)
    /// * `rate` - The rate to bill at, if already known or resolved
    ///
    /// # Errors
    ///
    /// * `EquipmentError::InvalidInterval` if `end` is not after `start`
    /// * `EquipmentError::MissingQuantity` for a tonnes contract without a
    ///   positive explicit quantity
    pub fn derive(
        contract_type: ContractType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        explicit_quantity: Option<Decimal>,
        rate: Option<Decimal>,
    ) -> Result<DerivedCost, EquipmentError> {
        let duration_hours = Self::elapsed_hours(start, end)?;
        let quantity = Self::derive_quantity(contract_type, duration_hours, explicit_quantity)?;
        let total = rate.map(|r| Self::total(quantity, r));

        Ok(DerivedCost {
            duration_hours,
            quantity,
            rate,
            total,
        })
    }

    /// Computes the elapsed duration in fractional hours, rounded to 2 dp.
    ///
    /// # Errors
    ///
    /// Returns `EquipmentError::InvalidInterval` if `end` is not after
    /// `start`.
    pub fn elapsed_hours(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, EquipmentError> {
        let seconds = (end - start).num_seconds();
        if seconds <= 0 {
            return Err(EquipmentError::InvalidInterval);
        }
        let hours = Decimal::new(seconds, 0) / Decimal::new(3600, 0);
        Ok(hours.round_dp(2))
    }

    /// Derives the billable quantity for the contract type.
    ///
    /// * `hours` - the elapsed hours as-is
    /// * `shift` - elapsed / 8, rounded UP to the next 0.5
    /// * `fixed` - always 1
    /// * `tonnes` - the closer's explicit quantity
    ///
    /// # Errors
    ///
    /// Returns `EquipmentError::MissingQuantity` for a tonnes contract
    /// without a positive explicit quantity.
    pub fn derive_quantity(
        contract_type: ContractType,
        elapsed_hours: Decimal,
        explicit_quantity: Option<Decimal>,
    ) -> Result<Decimal, EquipmentError> {
        match contract_type {
            ContractType::Hours => Ok(elapsed_hours),
            ContractType::Shift => Ok(Self::round_up_to_half(elapsed_hours / HOURS_PER_SHIFT)),
            ContractType::Fixed => Ok(Decimal::ONE),
            ContractType::Tonnes => match explicit_quantity {
                Some(quantity) if quantity > Decimal::ZERO => Ok(quantity),
                _ => Err(EquipmentError::MissingQuantity),
            },
        }
    }

    /// Multiplies quantity by rate, banker's rounding to 2 dp.
    #[must_use]
    pub fn total(quantity: Decimal, rate: Decimal) -> Decimal {
        (quantity * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Normalizes a vehicle number to its canonical form.
    #[must_use]
    pub fn normalize_vehicle_number(vehicle_number: &str) -> String {
        vehicle_number.trim().to_uppercase()
    }

    /// Rounds a value UP to the next multiple of 0.5.
    fn round_up_to_half(value: Decimal) -> Decimal {
        let two = Decimal::TWO;
        (value * two).ceil() / two
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn interval(minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 6, 0, 0).unwrap();
        (start, start + chrono::Duration::minutes(minutes))
    }

    #[test]
    fn test_elapsed_hours_fractional() {
        let (start, end) = interval(135);
        assert_eq!(CostEngine::elapsed_hours(start, end).unwrap(), dec!(2.25));
    }

    #[test]
    fn test_elapsed_hours_rejects_reversed_interval() {
        let (start, end) = interval(30);
        let result = CostEngine::elapsed_hours(end, start);
        assert!(matches!(result, Err(EquipmentError::InvalidInterval)));
    }

    #[test]
    fn test_elapsed_hours_rejects_zero_interval() {
        let (start, _) = interval(0);
        let result = CostEngine::elapsed_hours(start, start);
        assert!(matches!(result, Err(EquipmentError::InvalidInterval)));
    }

    #[rstest]
    // 9.2 h → 9.2/8 = 1.15 → next half shift up = 1.5
    #[case(dec!(9.2), dec!(1.5))]
    // Exactly one shift stays one shift
    #[case(dec!(8), dec!(1.0))]
    // Just over one shift rounds to 1.5
    #[case(dec!(8.1), dec!(1.5))]
    // Half a shift exactly
    #[case(dec!(4), dec!(0.5))]
    // A short hire still bills half a shift
    #[case(dec!(0.25), dec!(0.5))]
    // Two shifts exactly
    #[case(dec!(16), dec!(2.0))]
    #[case(dec!(12.01), dec!(2.0))]
    fn test_shift_quantity_rounds_up_to_half(#[case] hours: Decimal, #[case] expected: Decimal) {
        let quantity =
            CostEngine::derive_quantity(ContractType::Shift, hours, None).unwrap();
        assert_eq!(quantity, expected);
    }

    #[test]
    fn test_hours_quantity_is_elapsed() {
        let quantity =
            CostEngine::derive_quantity(ContractType::Hours, dec!(2.25), None).unwrap();
        assert_eq!(quantity, dec!(2.25));
    }

    #[test]
    fn test_fixed_quantity_is_one_regardless_of_duration() {
        for hours in [dec!(0.1), dec!(7), dec!(250)] {
            let quantity =
                CostEngine::derive_quantity(ContractType::Fixed, hours, None).unwrap();
            assert_eq!(quantity, Decimal::ONE);
        }
    }

    #[test]
    fn test_tonnes_requires_explicit_quantity() {
        let result = CostEngine::derive_quantity(ContractType::Tonnes, dec!(5), None);
        assert!(matches!(result, Err(EquipmentError::MissingQuantity)));

        let result = CostEngine::derive_quantity(ContractType::Tonnes, dec!(5), Some(dec!(0)));
        assert!(matches!(result, Err(EquipmentError::MissingQuantity)));

        let quantity =
            CostEngine::derive_quantity(ContractType::Tonnes, dec!(5), Some(dec!(120.5))).unwrap();
        assert_eq!(quantity, dec!(120.5));
    }

    #[test]
    fn test_total_is_decimal_multiplication() {
        assert_eq!(CostEngine::total(dec!(1.5), dec!(6000)), dec!(9000.00));
        assert_eq!(CostEngine::total(dec!(2.25), dec!(800)), dec!(1800.00));
        // Banker's rounding on the half-cent
        assert_eq!(CostEngine::total(dec!(0.125), dec!(1)), dec!(0.12));
    }

    #[test]
    fn test_derive_with_rate() {
        let (start, end) = interval(552); // 9.2 hours
        let cost = CostEngine::derive(
            ContractType::Shift,
            start,
            end,
            None,
            Some(dec!(6000)),
        )
        .unwrap();
        assert_eq!(cost.duration_hours, dec!(9.2));
        assert_eq!(cost.quantity, dec!(1.5));
        assert_eq!(cost.total, Some(dec!(9000.00)));
    }

    #[test]
    fn test_derive_without_rate_leaves_total_unset() {
        let (start, end) = interval(135);
        let cost =
            CostEngine::derive(ContractType::Hours, start, end, None, None).unwrap();
        assert_eq!(cost.quantity, dec!(2.25));
        assert_eq!(cost.rate, None);
        assert_eq!(cost.total, None);
    }

    #[test]
    fn test_normalize_vehicle_number() {
        assert_eq!(
            CostEngine::normalize_vehicle_number("  ka-05-mx-1234 "),
            "KA-05-MX-1234"
        );
        assert_eq!(CostEngine::normalize_vehicle_number("GJ01aa0001"), "GJ01AA0001");
    }

    #[test]
    fn test_contract_type_roundtrip() {
        for contract in [
            ContractType::Fixed,
            ContractType::Shift,
            ContractType::Tonnes,
            ContractType::Hours,
        ] {
            assert_eq!(ContractType::parse(contract.as_str()), Some(contract));
        }
        assert_eq!(ContractType::parse("daily"), None);
    }
}
