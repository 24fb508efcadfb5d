use crate::error::{AmountError, LockError};
use alloy_primitives::{
    U256,
    utils::{format_ether, parse_ether},
};
use std::num::ParseIntError;

/// What the user sees: the contract's held amount and the two input fields.
///
/// Every transition returns a new record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    /// Contract balance in ether, as a decimal string.
    pub held_amount: String,
    /// Raw deposit amount as typed, in ether.
    pub deposit_input: String,
    /// Raw unlock time as typed, in Unix seconds.
    pub unlock_time_input: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            held_amount: "0".to_string(),
            deposit_input: String::new(),
            unlock_time_input: String::new(),
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn with_deposit_input(&self, input: impl Into<String>) -> Self {
        Self { deposit_input: input.into(), ..self.clone() }
    }

    #[must_use]
    pub fn with_unlock_time_input(&self, input: impl Into<String>) -> Self {
        Self { unlock_time_input: input.into(), ..self.clone() }
    }

    /// Replaces the held amount with `wei`, converted to ether.
    #[must_use]
    pub fn with_held_amount(&self, wei: U256) -> Self {
        Self { held_amount: display_ether(wei), ..self.clone() }
    }

    /// Resets both input fields, as done after a successful transaction.
    #[must_use]
    pub fn with_cleared_inputs(&self) -> Self {
        Self { deposit_input: String::new(), unlock_time_input: String::new(), ..self.clone() }
    }

    /// The held amount in wei.
    pub fn held_wei(&self) -> U256 {
        parse_ether(&self.held_amount).unwrap_or_default()
    }

    pub fn has_deposit_input(&self) -> bool {
        !self.deposit_input.is_empty()
    }

    /// Parses the deposit input from ether into wei.
    ///
    /// Negative amounts are rejected.
    pub fn deposit_wei(&self) -> Result<U256, LockError> {
        let input = self.deposit_input.trim();
        let parsed = if input.starts_with('-') {
            Err(AmountError::Negative)
        } else {
            parse_ether(input).map_err(AmountError::from)
        };
        parsed.map_err(|source| LockError::MalformedAmount {
            input: self.deposit_input.clone(),
            source,
        })
    }

    /// The declared unlock time, `None` if the field is empty.
    pub fn declared_unlock_time(&self) -> Result<Option<u64>, ParseIntError> {
        let input = self.unlock_time_input.trim();
        if input.is_empty() { Ok(None) } else { input.parse().map(Some) }
    }
}

/// Formats `wei` as ether without trailing zeros, keeping at least one decimal.
pub fn display_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() { format!("{int}.0") } else { format!("{int}.{frac}") }
        }
        None => formatted,
    }
}
