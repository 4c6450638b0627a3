use serde::{Deserialize, Serialize};

const MAX_TOTAL_SCORE: f64 = 15.0;
const CGPA_MAX: f64 = 10.0;
const SUB_SCORE_MAX: f64 = 3.0;
const STRUCTURED_PERCENT_CEILING: f64 = 60.0;

/// Raw answers for one quiz submission. Unanswered fields deserialize to 0,
/// which is a valid (extreme) low score; inputs are not range-checked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QuizAnswers {
    #[serde(default)]
    pub coding_level_score: f64,
    #[serde(default)]
    pub coding_proficiency_score: f64,
    #[serde(default)]
    pub decision_making_score: f64,
    #[serde(default)]
    pub cgpa: f64,
    #[serde(default)]
    pub real_life_application_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Needs detailed, step-by-step guidance.
    Structured,
    /// Self-directed learner.
    Advanced,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Advanced => "advanced",
        }
    }

    pub fn difficulty(&self) -> &'static str {
        match self {
            Self::Structured => "beginner",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "structured" => Some(Self::Structured),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Assessment {
    pub total_score: f64,
    pub percent: f64,
    pub category: Category,
}

/// CGPA (1-10) is rescaled onto the 0-3 range of the other four sub-scores
/// before summing, so every input contributes equally. Only the final percent
/// is clamped; an out-of-range CGPA flows through the sum unclamped.
pub fn normalize(answers: &QuizAnswers) -> (f64, f64) {
    let total = answers.coding_level_score
        + answers.coding_proficiency_score
        + answers.decision_making_score
        + (answers.cgpa / CGPA_MAX) * SUB_SCORE_MAX
        + answers.real_life_application_score;

    let percent = (total / MAX_TOTAL_SCORE * 100.0).clamp(0.0, 100.0);
    (total, percent)
}

/// Single boundary at 60%: at or below is Structured, above is Advanced.
pub fn classify(percent: f64) -> Category {
    if percent <= STRUCTURED_PERCENT_CEILING {
        Category::Structured
    } else {
        Category::Advanced
    }
}

pub fn assess(answers: &QuizAnswers) -> Assessment {
    let (total_score, percent) = normalize(answers);
    Assessment {
        total_score,
        percent,
        category: classify(percent),
    }
}

/// Deterministic analysis text used whenever the generation service cannot
/// produce one. Always non-empty and references the computed result.
pub fn fallback_analysis(assessment: &Assessment) -> String {
    match assessment.category {
        Category::Structured => format!(
            "You scored {:.1}% on the assessment. A structured track suits you best: \
             work through each concept in order, follow the step-by-step explanations, \
             and mark a topic as read only once the examples make sense.",
            assessment.percent
        ),
        Category::Advanced => format!(
            "You scored {:.1}% on the assessment. You are ready for the advanced track: \
             concise explanations focused on trade-offs, complexity, and edge cases, \
             in whatever order matches your goals.",
            assessment.percent
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_minimum_answers() {
        let answers = QuizAnswers {
            coding_level_score: 1.0,
            coding_proficiency_score: 1.0,
            decision_making_score: 1.0,
            cgpa: 1.0,
            real_life_application_score: 1.0,
        };
        let result = assess(&answers);
        assert!((result.total_score - 4.3).abs() < 1e-9);
        assert!((result.percent - 4.3 / 15.0 * 100.0).abs() < 1e-9);
        assert_eq!(result.category, Category::Structured);
    }

    #[test]
    fn test_all_maximum_answers() {
        let answers = QuizAnswers {
            coding_level_score: 3.0,
            coding_proficiency_score: 3.0,
            decision_making_score: 3.0,
            cgpa: 10.0,
            real_life_application_score: 3.0,
        };
        let result = assess(&answers);
        assert!((result.total_score - 15.0).abs() < 1e-9);
        assert!((result.percent - 100.0).abs() < 1e-9);
        assert_eq!(result.category, Category::Advanced);
    }

    #[test]
    fn test_unanswered_defaults_to_zero_percent() {
        let result = assess(&QuizAnswers::default());
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.percent, 0.0);
        assert_eq!(result.category, Category::Structured);
    }

    #[test]
    fn test_boundary_at_sixty() {
        assert_eq!(classify(60.0), Category::Structured);
        assert_eq!(classify(60.0001), Category::Advanced);
    }

    #[test]
    fn test_missing_fields_deserialize_to_zero() {
        let answers: QuizAnswers = serde_json::from_str(r#"{"cgpa": 8}"#).unwrap();
        assert_eq!(answers.coding_level_score, 0.0);
        assert_eq!(answers.cgpa, 8.0);
    }

    #[test]
    fn test_category_serde_values() {
        assert_eq!(
            serde_json::to_string(&Category::Structured).unwrap(),
            "\"structured\""
        );
        assert_eq!(Category::parse("Advanced"), Some(Category::Advanced));
        assert_eq!(Category::parse("spoonfeeder"), None);
    }

    #[test]
    fn test_fallback_analysis_mentions_percent() {
        let assessment = Assessment {
            total_score: 9.0,
            percent: 60.0,
            category: Category::Structured,
        };
        assert!(fallback_analysis(&assessment).contains("60.0%"));
    }

    proptest! {
        #[test]
        fn percent_always_within_bounds(
            level in -100.0f64..100.0,
            prof in -100.0f64..100.0,
            decision in -100.0f64..100.0,
            cgpa in -100.0f64..100.0,
            real in -100.0f64..100.0,
        ) {
            let answers = QuizAnswers {
                coding_level_score: level,
                coding_proficiency_score: prof,
                decision_making_score: decision,
                cgpa,
                real_life_application_score: real,
            };
            let (_, percent) = normalize(&answers);
            prop_assert!((0.0..=100.0).contains(&percent));
        }

        #[test]
        fn classification_monotonic_in_percent(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if classify(lo) == Category::Advanced {
                prop_assert_eq!(classify(hi), Category::Advanced);
            }
        }
    }
}
