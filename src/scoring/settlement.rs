use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::config::SeverityTag;

/// Question name under which a settlement estimate joins an evaluation
pub const SETTLEMENT_QUESTION: &str = "Setzung des Neuschnees";

/// Elapsed time beyond this many hours no longer adds settlement
pub const MAX_ELAPSED_HOURS: f64 = 72.0;

/// Raw observations a settlement estimate is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SettlementInput {
    pub snow_cm: f64,
    pub temp_c: f64,
    pub elapsed_hours: f64,
}

impl SettlementInput {
    pub fn new(snow_cm: f64, temp_c: f64, elapsed_hours: f64) -> Self {
        Self {
            snow_cm,
            temp_c,
            elapsed_hours,
        }
    }

    /// Build an input from user-supplied values, rejecting negative or
    /// non-finite snow depth and elapsed time and a non-finite temperature.
    pub fn checked(snow_cm: f64, temp_c: f64, elapsed_hours: f64) -> Result<Self> {
        if !snow_cm.is_finite() || snow_cm < 0.0 {
            bail!("Snow depth must be a non-negative number of cm: {}", snow_cm);
        }
        if !temp_c.is_finite() {
            bail!("Temperature must be a finite number: {}", temp_c);
        }
        if !elapsed_hours.is_finite() || elapsed_hours < 0.0 {
            bail!("Elapsed time must be a non-negative number of hours: {}", elapsed_hours);
        }
        Ok(Self::new(snow_cm, temp_c, elapsed_hours))
    }

    /// Only fresh snow with some elapsed time yields a scored answer
    pub fn applies(&self) -> bool {
        self.temp_c.is_finite()
            && self.snow_cm.is_finite()
            && self.snow_cm > 0.0
            && self.elapsed_hours.is_finite()
            && self.elapsed_hours > 0.0
    }

    pub fn estimate(&self) -> Settlement {
        compute_settlement(self.snow_cm, self.temp_c, self.elapsed_hours)
    }
}

/// Derived settlement answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// Tagged label, e.g. "2: mäßige Setzung". Empty when no estimate exists.
    pub label: String,
    pub tag: Option<SeverityTag>,
    pub score: f64,
    /// Settlement degree in percent (0..=100), absent when no estimate exists
    pub degree: Option<f64>,
}

impl Settlement {
    pub fn none() -> Self {
        Self {
            label: String::new(),
            tag: None,
            score: 0.0,
            degree: None,
        }
    }

    fn tagged(tag: SeverityTag, text: &str, score: f64, degree: f64) -> Self {
        Self {
            label: format!("{}: {}", tag, text),
            tag: Some(tag),
            score,
            degree: Some(degree),
        }
    }

    pub fn is_none(&self) -> bool {
        self.tag.is_none()
    }
}

/// Parse elapsed time as plain hours ("24", "1.5") or a duration ("36h", "1day 6h").
pub fn parse_elapsed_hours(s: &str) -> Result<f64> {
    let s = s.trim();
    if let Ok(hours) = s.parse::<f64>() {
        if !hours.is_finite() || hours < 0.0 {
            bail!("Elapsed time must be a non-negative number of hours: {}", s);
        }
        return Ok(hours);
    }
    let duration = humantime::parse_duration(s)
        .with_context(|| format!("Invalid elapsed time '{}': expected hours or a duration like 36h", s))?;
    Ok(duration.as_secs_f64() / 3600.0)
}

/// Settlement degree in percent, capped at 100.
pub fn settlement_degree(temp_c: f64, elapsed_hours: f64) -> f64 {
    let ln_term = (elapsed_hours.min(MAX_ELAPSED_HOURS) + 1.0).ln();
    ((0.4 * (temp_c + 5.0) * ln_term / 8.0) * 100.0).min(100.0)
}

/// Estimate new-snow settlement from depth, temperature and elapsed time.
///
/// The degree falls into one of three bands (<20, 20-40, >=40). Each band
/// compares the snow depth against its own cutoff (30, 50, 80 cm).
pub fn compute_settlement(snow_cm: f64, temp_c: f64, elapsed_hours: f64) -> Settlement {
    if elapsed_hours <= 0.0 {
        return Settlement::none();
    }

    let degree = settlement_degree(temp_c, elapsed_hours);
    let little = |d| Settlement::tagged(SeverityTag::High, "(fast) keine Setzung", 3.5, d);
    let moderate = |d| Settlement::tagged(SeverityTag::Medium, "mäßige Setzung", 2.0, d);
    let strong = |d| Settlement::tagged(SeverityTag::Low, "starke Setzung", 3.5, d);

    if degree < 20.0 {
        if snow_cm > 30.0 {
            little(degree)
        } else {
            moderate(degree)
        }
    } else if degree < 40.0 {
        if snow_cm > 50.0 {
            little(degree)
        } else {
            moderate(degree)
        }
    } else if snow_cm > 80.0 {
        strong(degree)
    } else {
        moderate(degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_elapsed_time_gives_no_estimate() {
        assert_eq!(compute_settlement(50.0, 2.0, 0.0), Settlement::none());
        assert_eq!(compute_settlement(120.0, -10.0, -3.0), Settlement::none());
        let none = compute_settlement(0.0, 0.0, 0.0);
        assert_eq!(none.label, "");
        assert_eq!(none.score, 0.0);
    }

    #[test]
    fn test_clamped_degree_moderate() {
        // ln(25) * 0.4 * 7 / 8 * 100 ~ 112.66, clamped to 100
        let s = compute_settlement(50.0, 2.0, 24.0);
        assert_eq!(s.label, "2: mäßige Setzung");
        assert_eq!(s.tag, Some(SeverityTag::Medium));
        assert_eq!(s.score, 2.0);
        assert_eq!(s.degree, Some(100.0));
    }

    #[test]
    fn test_high_band_deep_snow_is_strong() {
        let s = compute_settlement(100.0, 2.0, 24.0);
        assert_eq!(s.label, "3: starke Setzung");
        assert_eq!(s.score, 3.5);
    }

    #[test]
    fn test_low_band_cutoff() {
        // temp -5 makes the degree zero
        let deep = compute_settlement(40.0, -5.0, 10.0);
        assert_eq!(deep.label, "1: (fast) keine Setzung");
        assert_eq!(deep.score, 3.5);

        let shallow = compute_settlement(30.0, -5.0, 10.0);
        assert_eq!(shallow.label, "2: mäßige Setzung");
        assert_eq!(shallow.score, 2.0);
    }

    #[test]
    fn test_middle_band_cutoff() {
        // 5 * 2 * ln(20) ~ 29.96
        let degree = settlement_degree(-3.0, 19.0);
        assert!(degree > 20.0 && degree < 40.0);

        assert_eq!(compute_settlement(60.0, -3.0, 19.0).tag, Some(SeverityTag::High));
        assert_eq!(compute_settlement(50.0, -3.0, 19.0).tag, Some(SeverityTag::Medium));
    }

    #[test]
    fn test_elapsed_hours_capped() {
        assert_eq!(settlement_degree(-4.0, 72.0), settlement_degree(-4.0, 500.0));
        assert!(settlement_degree(-4.0, 10.0) < settlement_degree(-4.0, 72.0));
    }

    #[test]
    fn test_negative_degree_for_cold_snow() {
        let degree = settlement_degree(-20.0, 24.0);
        assert!(degree < 0.0);
        assert_eq!(compute_settlement(35.0, -20.0, 24.0).tag, Some(SeverityTag::High));
    }

    #[test]
    fn test_input_applies() {
        assert!(SettlementInput::new(20.0, 0.0, 12.0).applies());
        assert!(!SettlementInput::new(0.0, 0.0, 12.0).applies());
        assert!(!SettlementInput::new(20.0, 0.0, 0.0).applies());
    }

    #[test]
    fn test_checked_rejects_bad_inputs() {
        assert_eq!(
            SettlementInput::checked(50.0, -3.0, 24.0).unwrap(),
            SettlementInput::new(50.0, -3.0, 24.0)
        );
        assert!(SettlementInput::checked(0.0, 0.0, 0.0).is_ok());

        let err = SettlementInput::checked(-5.0, 2.0, 24.0).unwrap_err();
        assert!(err.to_string().contains("Snow depth"));
        assert!(SettlementInput::checked(f64::NAN, 2.0, 24.0).is_err());
        assert!(SettlementInput::checked(f64::INFINITY, 2.0, 24.0).is_err());

        let err = SettlementInput::checked(50.0, f64::NAN, 24.0).unwrap_err();
        assert!(err.to_string().contains("Temperature"));
        assert!(SettlementInput::checked(50.0, f64::NEG_INFINITY, 24.0).is_err());

        assert!(SettlementInput::checked(50.0, 2.0, -1.0).is_err());
    }

    #[test]
    fn test_nan_temperature_never_applies() {
        assert!(!SettlementInput::new(50.0, f64::NAN, 24.0).applies());
        assert!(!SettlementInput::new(f64::NAN, 2.0, 24.0).applies());
    }

    #[test]
    fn test_parse_elapsed_hours() {
        assert_eq!(parse_elapsed_hours("24").unwrap(), 24.0);
        assert_eq!(parse_elapsed_hours("1.5").unwrap(), 1.5);
        assert_eq!(parse_elapsed_hours("36h").unwrap(), 36.0);
        assert_eq!(parse_elapsed_hours("1day 6h").unwrap(), 30.0);
        assert_eq!(parse_elapsed_hours("90m").unwrap(), 1.5);
        assert!(parse_elapsed_hours("-2").is_err());
        assert!(parse_elapsed_hours("yesterday").is_err());
    }

    #[test]
    fn test_pure_function() {
        let a = compute_settlement(55.0, -1.0, 30.0);
        let b = compute_settlement(55.0, -1.0, 30.0);
        assert_eq!(a, b);
    }
}
