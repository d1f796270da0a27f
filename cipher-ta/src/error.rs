use thiserror::Error;

/// Errors raised by the indicator engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: {required} rows required, {got} given")]
    InsufficientData { required: usize, got: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Degenerate-period guard shared by the whole catalog.
pub(crate) fn check_period(period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "period must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Minimum-row guard shared by the whole catalog.
pub(crate) fn check_len(got: usize, required: usize) -> Result<(), IndicatorError> {
    if got < required {
        return Err(IndicatorError::InsufficientData { required, got });
    }
    Ok(())
}
