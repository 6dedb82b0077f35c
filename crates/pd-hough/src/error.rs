use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HoughError {
    #[error("invalid Hough parameters: {0}")]
    InvalidParams(String),

    #[error("time budget exceeded after {processed} edge points")]
    BudgetExceeded { processed: usize },
}

impl HoughError {
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::HoughError;

    #[test]
    fn messages_carry_details() {
        let err = HoughError::invalid_params("rho must be positive");
        assert!(err.to_string().contains("rho must be positive"));

        let err = HoughError::BudgetExceeded { processed: 512 };
        assert!(err.to_string().contains("512"));
    }
}
