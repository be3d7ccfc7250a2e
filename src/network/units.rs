//! Exact unit conversion between smallest units (wei) and base units (ether).

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::U256;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::gateway::types::{GatewayError, GatewayResult};

/// Largest scale whose power of ten still fits in a U256.
const MAX_DECIMALS: u8 = 77;

/// An amount in a network's smallest unit together with its decimal form.
///
/// Serializes as `{"minor_units": "...", "formatted": "...", "decimals": n}`;
/// the two renderings are always emitted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountValue {
    minor_units: U256,
    decimals: u8,
}

impl AmountValue {
    pub fn new(minor_units: U256, decimals: u8) -> Self {
        Self {
            minor_units,
            decimals,
        }
    }

    pub fn from_u128(minor_units: u128, decimals: u8) -> Self {
        Self::new(U256::from(minor_units), decimals)
    }

    pub fn minor_units(&self) -> U256 {
        self.minor_units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Exact decimal rendering in the base unit, e.g. `"1.0"` or `"0.000021"`.
    pub fn formatted(&self) -> String {
        format_exact(self.minor_units, self.decimals)
    }
}

impl Serialize for AmountValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AmountValue", 3)?;
        state.serialize_field("minor_units", &self.minor_units.to_string())?;
        state.serialize_field("formatted", &self.formatted())?;
        state.serialize_field("decimals", &self.decimals)?;
        state.end()
    }
}

fn format_exact(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return format!("{value}.0");
    }

    // Every U256 is below 10^78, so larger scales have no whole part.
    let (whole, fraction) = if decimals > MAX_DECIMALS {
        (U256::ZERO, value)
    } else {
        value.div_rem(U256::from(10u64).pow(U256::from(decimals)))
    };
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parse a base-unit decimal string (`"0.5"`) into smallest units.
///
/// Negative amounts and more fractional digits than `decimals` are rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> GatewayResult<U256> {
    let trimmed = amount.trim();
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(GatewayError::InvalidInput(format!(
                "amount '{}' has more than {} fractional digits",
                trimmed, decimals
            )));
        }
    }

    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(GatewayError::InvalidInput(format!(
            "amount '{}' must not be negative",
            trimmed
        ))),
        Err(e) => Err(GatewayError::InvalidInput(format!(
            "invalid amount '{}': {}",
            trimmed, e
        ))),
    }
}
