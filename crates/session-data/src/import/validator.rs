use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("non-positive price: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("negative volume: {0}")]
    NegativeVolume(i64),

    #[error("high ({high}) is below low ({low})")]
    HighBelowLow { high: f64, low: f64 },

    #[error("{field} ({value}) falls outside [low, high] = [{low}, {high}]")]
    OutsideRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
}

/// Sanity-checks an OHLCV row before it becomes a `Bar`. Mirrors the
/// invariants `Bar`'s constructor assumes but doesn't itself enforce.
pub fn validate_bar_fields(
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
) -> Result<(), ValidationError> {
    if open <= 0.0 || high <= 0.0 || low <= 0.0 || close <= 0.0 {
        return Err(ValidationError::NonPositivePrice {
            open,
            high,
            low,
            close,
        });
    }
    if volume < 0 {
        return Err(ValidationError::NegativeVolume(volume));
    }
    if high < low {
        return Err(ValidationError::HighBelowLow { high, low });
    }
    if open > high || open < low {
        return Err(ValidationError::OutsideRange {
            field: "open",
            value: open,
            low,
            high,
        });
    }
    if close > high || close < low {
        return Err(ValidationError::OutsideRange {
            field: "close",
            value: close,
            low,
            high,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bar_passes() {
        assert!(validate_bar_fields(100.0, 102.0, 99.0, 101.0, 1000).is_ok());
    }

    #[test]
    fn rejects_negative_volume() {
        assert!(matches!(
            validate_bar_fields(100.0, 102.0, 99.0, 101.0, -1),
            Err(ValidationError::NegativeVolume(-1))
        ));
    }

    #[test]
    fn rejects_high_below_low() {
        assert!(matches!(
            validate_bar_fields(100.0, 98.0, 99.0, 101.0, 1000),
            Err(ValidationError::HighBelowLow { .. })
        ));
    }

    #[test]
    fn rejects_close_outside_range() {
        assert!(matches!(
            validate_bar_fields(100.0, 102.0, 99.0, 105.0, 1000),
            Err(ValidationError::OutsideRange { field: "close", .. })
        ));
    }
}
