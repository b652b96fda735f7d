use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assessment::badge::Badge;
use crate::assessment::models::{AnswerRecord, AssessmentResult, DifficultyTier, Question, SkillScore};

/// Domains scoring below this share of correct answers are reported as weak.
pub const WEAK_DOMAIN_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreSheet {
    pub correct_count: u32,
    pub total: u32,
    pub skill_scores: BTreeMap<String, SkillScore>,
}

/// Trimmed, lowercased form used on both sides of every answer comparison.
pub fn normalize_answer(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Scores every sampled question. Unanswered questions count toward `total`
/// but never toward `correct`.
pub fn score_answers(questions: &[Question], answers: &AnswerRecord) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();

    for question in questions {
        let entry = sheet
            .skill_scores
            .entry(question.domain.clone())
            .or_default();
        entry.total += 1;
        sheet.total += 1;

        let is_correct = answers
            .get(&question.id)
            .is_some_and(|chosen| normalize_answer(chosen) == normalize_answer(&question.correct_answer));
        if is_correct {
            entry.correct += 1;
            sheet.correct_count += 1;
        }
    }

    sheet
}

pub fn weak_domains(skill_scores: &BTreeMap<String, SkillScore>) -> Vec<String> {
    skill_scores
        .iter()
        .filter(|(_, s)| s.ratio() < WEAK_DOMAIN_THRESHOLD)
        .map(|(domain, _)| domain.clone())
        .collect()
}

/// Full terminal result: score sheet, badge and weak domains.
pub fn build_result(
    tier: DifficultyTier,
    questions: &[Question],
    answers: &AnswerRecord,
) -> AssessmentResult {
    let sheet = score_answers(questions, answers);
    let weak = weak_domains(&sheet.skill_scores);
    AssessmentResult {
        correct_count: sheet.correct_count,
        total_questions: sheet.total,
        badge: Badge::from_correct_count(sheet.correct_count),
        skill_scores: sheet.skill_scores,
        tier,
        weak_domains: weak,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assessment::models::{AnswerOption, OPTION_LABELS};

    pub(crate) fn question(id: &str, domain: &str, tier: DifficultyTier) -> Question {
        let texts = ["right", "wrong one", "wrong two", "wrong three"];
        Question {
            id: id.to_string(),
            text: format!("Question {id}?"),
            domain: domain.to_string(),
            tier,
            options: OPTION_LABELS.map(|label| AnswerOption {
                label,
                text: texts[(label as u8 - b'a') as usize].to_string(),
            }),
            correct_answer: "right".to_string(),
        }
    }

    fn web_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| question(&format!("w{i}"), "web", DifficultyTier::Beginner))
            .collect()
    }

    #[test]
    fn test_seven_of_ten_is_silver() {
        let questions = web_questions(10);
        let mut answers = AnswerRecord::new();
        for (i, q) in questions.iter().enumerate() {
            let choice = if i < 7 { "right" } else { "wrong one" };
            answers.insert(q.id.clone(), choice.to_string());
        }

        let result = build_result(DifficultyTier::Beginner, &questions, &answers);
        assert_eq!(result.correct_count, 7);
        assert_eq!(result.total_questions, 10);
        assert_eq!(result.skill_scores["web"], SkillScore { correct: 7, total: 10 });
        assert_eq!(result.badge, Badge::Silver);
    }

    #[test]
    fn test_no_answers_is_bronze() {
        let questions = vec![
            question("a", "web", DifficultyTier::Beginner),
            question("b", "data", DifficultyTier::Beginner),
            question("c", "data", DifficultyTier::Beginner),
            question("d", "cloud", DifficultyTier::Beginner),
            question("e", "web", DifficultyTier::Beginner),
        ];
        let result = build_result(DifficultyTier::Beginner, &questions, &AnswerRecord::new());
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.total_questions, 5);
        assert!(result.skill_scores.values().all(|s| s.correct == 0));
        assert_eq!(result.badge, Badge::Bronze);
    }

    #[test]
    fn test_totals_sum_to_question_count() {
        let questions = vec![
            question("a", "web", DifficultyTier::Advanced),
            question("b", "data", DifficultyTier::Advanced),
            question("c", "data", DifficultyTier::Advanced),
        ];
        let mut answers = AnswerRecord::new();
        answers.insert("b".to_string(), "right".to_string());
        answers.insert("unrelated".to_string(), "right".to_string());

        let sheet = score_answers(&questions, &answers);
        let total: u32 = sheet.skill_scores.values().map(|s| s.total).sum();
        assert_eq!(total as usize, questions.len());
        assert!(sheet.skill_scores.values().all(|s| s.correct <= s.total));
        assert_eq!(sheet.correct_count, 1);
    }

    #[test]
    fn test_comparison_is_trimmed_and_case_folded() {
        let questions = vec![question("a", "web", DifficultyTier::Beginner)];
        let mut answers = AnswerRecord::new();
        answers.insert("a".to_string(), "  RIGHT ".to_string());
        assert_eq!(score_answers(&questions, &answers).correct_count, 1);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let questions = web_questions(4);
        let mut answers = AnswerRecord::new();
        answers.insert("w1".to_string(), "right".to_string());
        assert_eq!(
            score_answers(&questions, &answers),
            score_answers(&questions, &answers)
        );
    }

    #[test]
    fn test_weak_domains_below_seventy_percent() {
        let mut scores = BTreeMap::new();
        scores.insert("cloud".to_string(), SkillScore { correct: 7, total: 10 });
        scores.insert("data".to_string(), SkillScore { correct: 2, total: 3 });
        scores.insert("web".to_string(), SkillScore { correct: 0, total: 1 });
        assert_eq!(weak_domains(&scores), vec!["data".to_string(), "web".to_string()]);
    }
}
