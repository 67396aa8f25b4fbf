use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A vitals panel taken during one visit. `bmi` is computed once at
/// write time and stored; it is never recomputed from later edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub id: i64,
    pub medical_record_id: i64,
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<i64>,
    pub oxygen_saturation: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bmi: Option<f64>,
    pub recorded_by: String,
    pub recorded_at: NaiveDateTime,
}

/// Measurements accepted from the client; BMI is derived here, not
/// taken from input.
#[derive(Debug, Clone, Default)]
pub struct NewVitalSigns {
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<i64>,
    pub oxygen_saturation: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub recorded_by: String,
}

/// BMI from weight (kg) and height (cm), rounded to one decimal.
/// Returns `None` unless both measurements are present and positive.
pub fn compute_bmi(weight: Option<f64>, height: Option<f64>) -> Option<f64> {
    match (weight, height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => {
            let meters = h / 100.0;
            let bmi = w / (meters * meters);
            Some((bmi * 10.0).round() / 10.0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_rounds_to_one_decimal() {
        assert_eq!(compute_bmi(Some(70.5), Some(175.0)), Some(23.0));
        assert_eq!(compute_bmi(Some(80.0), Some(180.0)), Some(24.7));
    }

    #[test]
    fn bmi_requires_both_measurements() {
        assert_eq!(compute_bmi(Some(70.5), None), None);
        assert_eq!(compute_bmi(None, Some(175.0)), None);
        assert_eq!(compute_bmi(None, None), None);
    }

    #[test]
    fn bmi_rejects_nonpositive_values() {
        assert_eq!(compute_bmi(Some(0.0), Some(175.0)), None);
        assert_eq!(compute_bmi(Some(70.5), Some(0.0)), None);
        assert_eq!(compute_bmi(Some(-70.5), Some(175.0)), None);
    }
}
