use std::fmt::Write;

use crate::services::assessment::{Assessment, Category, QuizAnswers};
use crate::services::catalog;

pub const DEFAULT_LANGUAGE: &str = "programming";

/// Picks the instruction template for one concept: verbose step-by-step for
/// Structured learners, terse and trade-off oriented for Advanced. Known
/// concepts get their fixed sub-topic enumeration from the catalog; unknown
/// names get only the generic structure.
pub fn build_prompt(category: Category, concept_name: &str, language: &str) -> String {
    match category {
        Category::Structured => beginner_prompt(concept_name, language),
        Category::Advanced => advanced_prompt(concept_name, language),
    }
}

fn subtopic_block(concept_name: &str) -> Option<String> {
    let outline = catalog::catalog().outline(concept_name)?;
    let mut block = String::from("CRITICAL REQUIREMENTS - Cover ALL sub-topics:\n");
    for subtopic in &outline.subtopics {
        let _ = writeln!(block, "- {subtopic}");
    }
    Some(block)
}

fn beginner_prompt(concept_name: &str, language: &str) -> String {
    let mut prompt = format!(
        "You are teaching \"{concept_name}\" in {language} to a complete beginner. \
         Provide a comprehensive, detailed explanation that covers every aspect and sub-topic.\n\n"
    );

    if let Some(block) = subtopic_block(concept_name) {
        prompt.push_str(&block);
        prompt.push_str(
            "For EACH sub-topic: definition, how it works, example code, and a \
             line-by-line explanation of the example.\n\n",
        );
    }

    prompt.push_str(
        "WRITING STYLE FOR BEGINNERS:\n\
         - Use simple, everyday language and short sentences\n\
         - Explain every technical term the first time it appears\n\
         - Use real-life analogies when they help\n\
         - Address the reader as \"you\"\n\n\
         STRUCTURE:\n\
         1. Start with: \"What is [topic]? [Simple explanation in 2-3 sentences]\"\n\
         2. Cover each sub-topic under its own numbered heading: definition, how it \
         works, example code, step-by-step walkthrough, and when to use it\n\
         3. Include a \"Common Mistakes\" section at the end\n\
         4. Finish with a simple practice suggestion\n\n\
         IMPORTANT: Do NOT write generic text like \"Learn about X in programming.\" \
         Write actual, detailed explanations.\n\n\
         Now write the complete explanation:\n",
    );

    prompt
}

fn advanced_prompt(concept_name: &str, language: &str) -> String {
    let mut prompt = format!(
        "You are teaching \"{concept_name}\" in {language} to an experienced programmer. \
         Provide a concise but comprehensive explanation covering all sub-topics.\n\n"
    );

    if let Some(block) = subtopic_block(concept_name) {
        prompt.push_str(&block);
        prompt.push_str(
            "For EACH sub-topic: definition, key behavior, an idiomatic example, \
             use cases, and gotchas or edge cases.\n\n",
        );
    }

    prompt.push_str(
        "WRITING STYLE FOR ADVANCED LEARNERS:\n\
         - Be concise but complete; no step-by-step handholding\n\
         - Use technical terminology appropriately\n\
         - Focus on what, why, and when rather than detailed how\n\
         - Include performance considerations where relevant\n\n\
         STRUCTURE:\n\
         1. Brief overview: \"[Topic] is... [purpose in 1-2 sentences]\"\n\
         2. Each sub-topic under its own numbered heading: one-line definition, \
         characteristics, clean example, use cases, and gotchas\n\
         3. Best practices section\n\
         4. Performance considerations if applicable\n\n\
         IMPORTANT: Do NOT write generic text. Be efficient with words but complete \
         in coverage.\n\n\
         Now write the complete explanation:\n",
    );

    prompt
}

/// The analysis prompt for a finished quiz submission: asks for a short
/// personalized learning-path recommendation.
pub fn analysis_prompt(answers: &QuizAnswers, assessment: &Assessment) -> String {
    format!(
        "Analyze this coding assessment quiz result and provide personalized learning \
         recommendations.\n\n\
         Quiz Scores:\n\
         - Coding Level: {}/3\n\
         - Coding Proficiency: {}/3\n\
         - Decision Making: {}/3\n\
         - CGPA: {}/10\n\
         - Real Life Application: {}/3\n\n\
         Total Score: {:.2}\n\
         Category: {}\n\n\
         Provide a brief (2-3 sentences) personalized learning path recommendation \
         for this student.",
        answers.coding_level_score,
        answers.coding_proficiency_score,
        answers.decision_making_score,
        answers.cgpa,
        answers.real_life_application_score,
        assessment.total_score,
        assessment.category.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_template_enumerates_known_subtopics() {
        let prompt = build_prompt(Category::Structured, "Basic Operators", "Python");
        assert!(prompt.contains("complete beginner"));
        assert!(prompt.contains("Assignment operators"));
        assert!(prompt.contains("Common Mistakes"));
        assert!(prompt.contains("Python"));
    }

    #[test]
    fn test_advanced_template_enumerates_known_subtopics() {
        let prompt = build_prompt(Category::Advanced, "Linked Lists Implementation", "C++");
        assert!(prompt.contains("experienced programmer"));
        assert!(prompt.contains("cycle detection"));
        assert!(prompt.contains("Best practices"));
    }

    #[test]
    fn test_unknown_concept_gets_generic_structure_only() {
        let prompt = build_prompt(Category::Structured, "Quantum Computing", DEFAULT_LANGUAGE);
        assert!(!prompt.contains("CRITICAL REQUIREMENTS"));
        assert!(prompt.contains("Common Mistakes"));
        assert!(prompt.contains("Quantum Computing"));
    }

    #[test]
    fn test_templates_differ_by_category() {
        let beginner = build_prompt(Category::Structured, "Loops", DEFAULT_LANGUAGE);
        let advanced = build_prompt(Category::Advanced, "Loops", DEFAULT_LANGUAGE);
        assert_ne!(beginner, advanced);
        assert!(beginner.contains("everyday language"));
        assert!(advanced.contains("performance"));
    }

    #[test]
    fn test_analysis_prompt_includes_scores_and_category() {
        let answers = QuizAnswers {
            coding_level_score: 2.0,
            coding_proficiency_score: 2.0,
            decision_making_score: 2.0,
            cgpa: 7.0,
            real_life_application_score: 2.0,
        };
        let assessment = crate::services::assessment::assess(&answers);
        let prompt = analysis_prompt(&answers, &assessment);
        assert!(prompt.contains("CGPA: 7/10"));
        assert!(prompt.contains(assessment.category.as_str()));
    }
}
