use thiserror::Error;

/// Validation failures in user-entered holdings. Messages are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("Invalid syntax: {line}")]
    InvalidGoldLine { line: String },

    #[error("Invalid syntax: {line}")]
    InvalidCashLine { line: String },

    #[error("Invalid seller code: '{seller}'. Valid sellers: {}", .valid.join(", "))]
    UnknownSeller { seller: String, valid: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_seller_lists_valid_sellers() {
        let err = ValuationError::UnknownSeller {
            seller: "SJC".to_string(),
            valid: vec!["PNJ".to_string(), "DOJI".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid seller code: 'SJC'. Valid sellers: PNJ, DOJI"
        );
    }
}
