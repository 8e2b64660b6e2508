//! User input for the two mutating operations.

use alloy::primitives::Address;

use crate::blockchain::TokenCall;
use crate::token::amount::TokenAmount;
use crate::token::error::TokenError;

/// Send `amount` tokens to `recipient`. Fields are raw user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
}

impl TransferRequest {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Validate the input and build the contract call.
    pub fn to_call(&self) -> Result<TokenCall, TokenError> {
        if self.recipient.trim().is_empty() || self.amount.trim().is_empty() {
            return Err(TokenError::InvalidInput("Please fill all fields".to_string()));
        }
        let to = parse_recipient(&self.recipient)?;
        let amount = parse_amount(&self.amount)?;
        Ok(TokenCall::Transfer {
            to,
            amount: amount.raw(),
        })
    }
}

/// Destroy `amount` of the caller's tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurnRequest {
    pub amount: String,
}

impl BurnRequest {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
        }
    }

    pub fn to_call(&self) -> Result<TokenCall, TokenError> {
        if self.amount.trim().is_empty() {
            return Err(TokenError::InvalidInput(
                "Please enter an amount to burn".to_string(),
            ));
        }
        let amount = parse_amount(&self.amount)?;
        Ok(TokenCall::Burn {
            amount: amount.raw(),
        })
    }
}

/// A recipient must be `0x` followed by exactly 40 hex digits.
pub fn parse_recipient(input: &str) -> Result<Address, TokenError> {
    let s = input.trim();
    let invalid = || TokenError::InvalidInput("Invalid recipient address".to_string());

    let hex = s.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    s.parse().map_err(|_| invalid())
}

fn parse_amount(input: &str) -> Result<TokenAmount, TokenError> {
    TokenAmount::parse_positive(input)
        .map_err(|e| TokenError::InvalidInput(format!("Invalid amount: {}", e)))
}

/// `0x1234...abcd` form used in notices, always lowercase.
pub fn abbreviate(address: &Address) -> String {
    let hex = alloy::hex::encode(address);
    format!("0x{}...{}", &hex[..4], &hex[hex.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    const RECIPIENT: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";

    fn invalid(err: Result<TokenCall, TokenError>) -> String {
        match err {
            Err(TokenError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_transfer() {
        let call = TransferRequest::new(RECIPIENT, "30.5").to_call().unwrap();
        assert_eq!(
            call,
            TokenCall::Transfer {
                to: address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2"),
                amount: U256::from(30_500_000_000_000_000_000u128),
            }
        );
    }

    #[test]
    fn test_transfer_missing_fields() {
        assert_eq!(invalid(TransferRequest::new("", "1").to_call()), "Please fill all fields");
        assert_eq!(invalid(TransferRequest::new(RECIPIENT, " ").to_call()), "Please fill all fields");
    }

    #[test]
    fn test_transfer_bad_recipient() {
        let no_prefix = &RECIPIENT[2..];
        assert_eq!(
            invalid(TransferRequest::new(no_prefix, "1").to_call()),
            "Invalid recipient address"
        );
        assert_eq!(
            invalid(TransferRequest::new("0x1234", "1").to_call()),
            "Invalid recipient address"
        );
        assert_eq!(
            invalid(TransferRequest::new("0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz", "1").to_call()),
            "Invalid recipient address"
        );
    }

    #[test]
    fn test_transfer_non_positive_amount() {
        let msg = invalid(TransferRequest::new(RECIPIENT, "0").to_call());
        assert_eq!(msg, "Invalid amount: amount must be greater than zero");
        let msg = invalid(TransferRequest::new(RECIPIENT, "-3").to_call());
        assert!(msg.starts_with("Invalid amount"));
    }

    #[test]
    fn test_burn() {
        let call = BurnRequest::new("25.0").to_call().unwrap();
        assert_eq!(
            call,
            TokenCall::Burn {
                amount: U256::from(25_000_000_000_000_000_000u128)
            }
        );
        assert_eq!(invalid(BurnRequest::new("").to_call()), "Please enter an amount to burn");
        assert!(invalid(BurnRequest::new("1.2.3").to_call()).starts_with("Invalid amount"));
    }

    #[test]
    fn test_abbreviate() {
        let addr = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2");
        assert_eq!(abbreviate(&addr), "0xbbbb...bbb2");

        let checksummed = parse_recipient("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        assert_eq!(abbreviate(&checksummed), "0x5fbd...0aa3");
    }
}
