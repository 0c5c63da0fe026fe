use crate::domain::errors::AnalyticsError;

/// Percent change from `open` to `close`: `((close - open) / open) * 100`.
///
/// With `signed == false` the magnitude is returned. A zero `open` is an
/// error rather than an infinite or NaN result.
pub fn percent_change(open: f64, close: f64, signed: bool) -> Result<f64, AnalyticsError> {
    if open == 0.0 {
        return Err(AnalyticsError::divide_by_zero(format!(
            "percent change from a zero open (close {})",
            close
        )));
    }

    let change = ((close - open) / open) * 100.0;
    Ok(if signed { change } else { change.abs() })
}
