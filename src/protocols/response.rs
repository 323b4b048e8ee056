/// How many decimals of a parsed reading to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Decimals(u32),
    Full,
}

/// Parse a response line into a reading.
///
/// Exact halves round to the even digit, so `0.125` becomes `0.12`.
/// Returns `None` for anything that is not a finite decimal number, the
/// firmware occasionally emits partial or garbled lines.
pub fn parse_reading(line: &str, precision: Precision) -> Option<f64> {
    let value = line.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(match precision {
        Precision::Full => value,
        Precision::Decimals(decimals) => {
            let scale = 10f64.powi(decimals as i32);
            (value * scale).round_ties_even() / scale
        }
    })
}
