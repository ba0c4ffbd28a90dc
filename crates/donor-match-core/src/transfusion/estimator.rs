//! Rule-based transfusion-frequency estimator.
//!
//! Each rule nudges an integer score; lower means transfusions are needed
//! more often. The final score maps onto a fixed interval:
//!
//! | Score   | Interval      | Confidence |
//! |---------|---------------|------------|
//! | <= -4   | every 2 weeks | high       |
//! | <= -2   | every 3 weeks | high       |
//! | <= 0    | every 4 weeks | medium     |
//! | <= 2    | every 6 weeks | medium     |
//! | > 2     | every 8 weeks | low        |

use crate::models::{ClinicalProfile, Confidence, TransfusionInterval, TransfusionRecommendation};

const BETA_MAJOR: &str = "beta-thalassemia-major";
const INTERMEDIA: &str = "thalassemia-intermedia";

const SYMPTOM_KEYWORDS: [&str; 3] = ["fatigue", "shortness", "pallor"];

const MANUAL_REASON: &str = "Patient-specified frequency";
const ADVISORY_REASONS: [&str; 2] = [
    "This recommendation should be validated with your healthcare provider",
    "Frequency may need adjustment based on ongoing monitoring",
];

/// Recommend a transfusion interval for a patient.
///
/// A non-blank manual frequency short-circuits scoring and is returned as-is.
pub fn recommend_transfusion_frequency(profile: &ClinicalProfile) -> TransfusionRecommendation {
    if let Some(manual) = non_blank(profile.manual_transfusion_frequency.as_deref()) {
        return TransfusionRecommendation {
            frequency: manual.to_string(),
            reasoning: vec![MANUAL_REASON.to_string()],
            confidence: Confidence::High,
        };
    }

    let (score, mut reasoning) = score_profile(profile);
    let (interval, confidence) = interval_for_score(score);

    reasoning.extend(ADVISORY_REASONS.iter().map(|s| s.to_string()));

    TransfusionRecommendation {
        frequency: interval.as_str().to_string(),
        reasoning,
        confidence,
    }
}

/// Apply every scoring rule. Returns the score and one reason per rule fired.
pub fn score_profile(profile: &ClinicalProfile) -> (i32, Vec<String>) {
    let mut score = 0;
    let mut reasoning = Vec::new();
    let mut apply = |delta: i32, reason: &str| {
        score += delta;
        reasoning.push(reason.to_string());
    };

    match profile.thalassemia_type.as_deref() {
        Some(BETA_MAJOR) => apply(-2, "β-thalassemia major typically requires regular transfusions"),
        Some(INTERMEDIA) => apply(1, "Thalassemia intermedia may require less frequent transfusions"),
        _ => {}
    }

    if let Some(hb) = parse_hb(profile.recent_pre_transfusion_hb.as_deref()) {
        if hb < 7.0 {
            apply(-2, "Low pre-transfusion Hb (<7 g/dL) indicates need for frequent transfusions");
        } else if hb < 8.0 {
            apply(-1, "Moderate pre-transfusion Hb (7-8 g/dL) suggests regular transfusion needs");
        } else if hb > 9.0 {
            apply(1, "Higher pre-transfusion Hb (>9 g/dL) may allow longer intervals");
        }
    }

    let symptoms = profile
        .symptoms_between_transfusions
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    if SYMPTOM_KEYWORDS.iter().any(|k| symptoms.contains(k)) {
        apply(-1, "Symptoms between transfusions indicate need for closer monitoring");
    }

    match profile
        .transfusion_frequency_past_6_months
        .as_deref()
        .and_then(TransfusionInterval::parse)
    {
        Some(TransfusionInterval::Every2Weeks) => {
            apply(-2, "Previous 2-week frequency suggests high transfusion needs")
        }
        Some(TransfusionInterval::Every3Weeks) => {
            apply(-1, "Previous 3-week frequency is a good baseline")
        }
        Some(TransfusionInterval::Every4Weeks) => {
            apply(0, "Previous 4-week frequency shows stable condition")
        }
        Some(TransfusionInterval::Every6Weeks) => {
            apply(1, "Previous 6-week frequency suggests milder condition")
        }
        _ => {}
    }

    if profile.has_complications() {
        apply(-1, "History of complications suggests need for adequate transfusion support");
    }

    if non_blank(profile.organ_issues_history.as_deref()).is_some() {
        apply(-1, "Organ complications require careful transfusion management");
    }

    (score, reasoning)
}

/// Map a final score onto an interval and confidence.
pub fn interval_for_score(score: i32) -> (TransfusionInterval, Confidence) {
    match score {
        s if s <= -4 => (TransfusionInterval::Every2Weeks, Confidence::High),
        s if s <= -2 => (TransfusionInterval::Every3Weeks, Confidence::High),
        s if s <= 0 => (TransfusionInterval::Every4Weeks, Confidence::Medium),
        s if s <= 2 => (TransfusionInterval::Every6Weeks, Confidence::Medium),
        _ => (TransfusionInterval::Every8Weeks, Confidence::Low),
    }
}

/// Longest numeric prefix of a hemoglobin reading, e.g. "6.5 g/dL" → 6.5
/// and "7.5.1" → 7.5.
fn parse_hb(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    let mut seen_dot = false;
    let end = value
        .char_indices()
        .find(|&(i, c)| match c {
            '0'..='9' => false,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            '-' | '+' => i != 0,
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok().filter(|hb| hb.is_finite())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_major_low_hb() {
        let profile = ClinicalProfile {
            thalassemia_type: Some("beta-thalassemia-major".into()),
            recent_pre_transfusion_hb: Some("6.5".into()),
            ..Default::default()
        };

        let rec = recommend_transfusion_frequency(&profile);

        assert_eq!(rec.frequency, "every-2-weeks");
        assert_eq!(rec.confidence, Confidence::High);
        assert_eq!(score_profile(&profile).0, -4);
        // Two rules plus two advisory lines
        assert_eq!(rec.reasoning.len(), 4);
    }

    #[test]
    fn test_manual_override_short_circuits() {
        let profile = ClinicalProfile {
            thalassemia_type: Some("beta-thalassemia-major".into()),
            recent_pre_transfusion_hb: Some("5".into()),
            manual_transfusion_frequency: Some("every-5-weeks".into()),
            ..Default::default()
        };

        let rec = recommend_transfusion_frequency(&profile);

        assert_eq!(rec.frequency, "every-5-weeks");
        assert_eq!(rec.confidence, Confidence::High);
        assert_eq!(rec.reasoning, vec!["Patient-specified frequency".to_string()]);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let profile = ClinicalProfile {
            manual_transfusion_frequency: Some("   ".into()),
            ..Default::default()
        };
        let rec = recommend_transfusion_frequency(&profile);
        assert_eq!(rec.frequency, "every-4-weeks");
        assert_eq!(rec.confidence, Confidence::Medium);
    }

    #[test]
    fn test_hb_bands() {
        let score_for = |hb: &str| {
            score_profile(&ClinicalProfile {
                recent_pre_transfusion_hb: Some(hb.into()),
                ..Default::default()
            })
            .0
        };
        assert_eq!(score_for("6.9"), -2);
        assert_eq!(score_for("7"), -1);
        assert_eq!(score_for("7.9"), -1);
        assert_eq!(score_for("8.5"), 0);
        assert_eq!(score_for("9"), 0);
        assert_eq!(score_for("9.4 g/dL"), 1);
        assert_eq!(score_for("unknown"), 0);
        assert_eq!(score_for("7.5.1"), -1);
        assert_eq!(score_for("6.8.2 g/dL"), -2);
        assert_eq!(score_for(""), 0);
    }

    #[test]
    fn test_parse_hb_prefix() {
        assert_eq!(parse_hb(Some("7.5.1")), Some(7.5));
        assert_eq!(parse_hb(Some(" 8. g/dL")), Some(8.0));
        assert_eq!(parse_hb(Some("-1.2-3")), Some(-1.2));
        assert_eq!(parse_hb(Some("..5")), None);
        assert_eq!(parse_hb(None), None);
    }

    #[test]
    fn test_every_rule_stacks() {
        let profile = ClinicalProfile {
            thalassemia_type: Some("beta-thalassemia-major".into()),
            recent_pre_transfusion_hb: Some("7.5".into()),
            symptoms_between_transfusions: Some("Frequent FATIGUE after school".into()),
            transfusion_frequency_past_6_months: Some("every-2-weeks".into()),
            organ_issues_history: Some("cardiac iron loading".into()),
            recurrent_infections: true,
            ..Default::default()
        };

        let (score, reasons) = score_profile(&profile);
        assert_eq!(score, -2 - 1 - 1 - 2 - 1 - 1);
        assert_eq!(reasons.len(), 6);
        assert_eq!(
            recommend_transfusion_frequency(&profile).frequency,
            "every-2-weeks"
        );
    }

    #[test]
    fn test_four_week_history_adds_reason_only() {
        let (score, reasons) = score_profile(&ClinicalProfile {
            transfusion_frequency_past_6_months: Some("every-4-weeks".into()),
            ..Default::default()
        });
        assert_eq!(score, 0);
        assert_eq!(reasons, vec!["Previous 4-week frequency shows stable condition".to_string()]);
    }

    #[test]
    fn test_mild_profile_gets_long_interval() {
        let profile = ClinicalProfile {
            thalassemia_type: Some("thalassemia-intermedia".into()),
            recent_pre_transfusion_hb: Some("10.2".into()),
            transfusion_frequency_past_6_months: Some("every-6-weeks".into()),
            ..Default::default()
        };

        let rec = recommend_transfusion_frequency(&profile);
        assert_eq!(rec.frequency, "every-8-weeks");
        assert_eq!(rec.confidence, Confidence::Low);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(interval_for_score(-9).0, TransfusionInterval::Every2Weeks);
        assert_eq!(interval_for_score(-4).0, TransfusionInterval::Every2Weeks);
        assert_eq!(interval_for_score(-3).0, TransfusionInterval::Every3Weeks);
        assert_eq!(interval_for_score(-2).1, Confidence::High);
        assert_eq!(interval_for_score(-1).0, TransfusionInterval::Every4Weeks);
        assert_eq!(interval_for_score(0).1, Confidence::Medium);
        assert_eq!(interval_for_score(2).0, TransfusionInterval::Every6Weeks);
        assert_eq!(interval_for_score(3), (TransfusionInterval::Every8Weeks, Confidence::Low));
    }

    #[test]
    fn test_deterministic() {
        let profile = ClinicalProfile {
            thalassemia_type: Some("beta-thalassemia-major".into()),
            bone_deformities: true,
            ..Default::default()
        };
        assert_eq!(
            recommend_transfusion_frequency(&profile),
            recommend_transfusion_frequency(&profile)
        );
    }
}
