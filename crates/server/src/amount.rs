//! Request-side amount parsing.

use api_types::Amount;
use engine::{EngineError, Money};

use crate::ServerError;

/// Minor units carried by a request amount. Non-numeric strings and
/// fractional numbers are `InvalidInput`, which the API reports as 422.
pub(crate) fn minor(amount: &Amount) -> Result<i64, ServerError> {
    match amount {
        Amount::Minor(value) => Ok(*value),
        Amount::Fractional(_) => Err(EngineError::InvalidInput(
            "amount must be a whole number of minor units".to_string(),
        )
        .into()),
        Amount::Text(text) => text
            .parse::<Money>()
            .map(Money::minor)
            .map_err(ServerError::from),
    }
}

pub(crate) fn optional_minor(amount: Option<&Amount>) -> Result<Option<i64>, ServerError> {
    amount.map(minor).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(minor(&Amount::Text(" 1500 ".to_string())).ok(), Some(1500));
        assert_eq!(minor(&Amount::Minor(-750)).ok(), Some(-750));
    }

    #[test]
    fn non_numeric_strings_are_invalid_input() {
        let err = minor(&Amount::Text("abc".to_string())).err();
        assert!(matches!(
            err,
            Some(ServerError::Engine(EngineError::InvalidInput(_)))
        ));
    }

    #[test]
    fn fractional_numbers_are_invalid_input() {
        let err = minor(&Amount::Fractional(15.5)).err();
        assert!(matches!(
            err,
            Some(ServerError::Engine(EngineError::InvalidInput(_)))
        ));
    }
}
