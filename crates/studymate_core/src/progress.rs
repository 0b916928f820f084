//! crates/studymate_core/src/progress.rs
//!
//! Pure calculators for promotion eligibility and accumulated learning
//! progress. No side effects; safe to call repeatedly.

use crate::domain::{Achievement, ProgressSummary, PromotionProgress, StoredProgress};

/// The ratio `value / required`, capped at 1.0. A requirement of zero counts
/// as already satisfied.
fn capped_ratio(value: f64, required: f64) -> f64 {
    if required <= 0.0 {
        1.0
    } else {
        (value / required).min(1.0)
    }
}

/// Derives the progress figures toward the next promotion level.
///
/// The overall percentage is the arithmetic mean of the challenge-count
/// ratio and the accuracy ratio, each capped at a full contribution.
/// Promotion requires both thresholds to be met simultaneously.
pub fn promotion_progress(
    challenges_completed: u32,
    challenges_required: u32,
    current_accuracy: f64,
    accuracy_required: f64,
) -> PromotionProgress {
    let challenge_ratio = capped_ratio(f64::from(challenges_completed), f64::from(challenges_required));
    let accuracy_ratio = capped_ratio(current_accuracy, accuracy_required);

    PromotionProgress {
        challenges_completed,
        challenges_required,
        challenges_remaining: challenges_required.saturating_sub(challenges_completed),
        current_accuracy,
        accuracy_required,
        progress_percentage: (challenge_ratio + accuracy_ratio) / 2.0 * 100.0,
        can_promote: challenges_completed >= challenges_required
            && current_accuracy >= accuracy_required,
    }
}

/// Summarizes the locally accumulated progress: lesson count, quiz count,
/// rounded average quiz score, and points (10 per completed lesson).
pub fn summarize(progress: &StoredProgress) -> ProgressSummary {
    let lessons_completed = progress.completed_lessons.len();
    let quizzes_taken = progress.quiz_scores.len();
    let average_quiz_score = if quizzes_taken > 0 {
        let total: u32 = progress.quiz_scores.iter().sum();
        (f64::from(total) / quizzes_taken as f64).round() as u32
    } else {
        0
    };

    ProgressSummary {
        lessons_completed,
        quizzes_taken,
        average_quiz_score,
        points: lessons_completed as u32 * 10,
    }
}

/// The fixed set of unlockable achievements, with their unlocked flags
/// derived from the given summary.
pub fn achievements(summary: &ProgressSummary) -> Vec<Achievement> {
    vec![
        Achievement {
            id: "first-steps",
            name: "First Steps",
            description: "Complete your first lesson.",
            unlocked: summary.lessons_completed >= 1,
        },
        Achievement {
            id: "bookworm",
            name: "Bookworm",
            description: "Complete 5 lessons.",
            unlocked: summary.lessons_completed >= 5,
        },
        Achievement {
            id: "quiz-whiz",
            name: "Quiz Whiz",
            description: "Complete your first quiz.",
            unlocked: summary.quizzes_taken >= 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_needs_both_thresholds() {
        // Challenge count is met but accuracy falls 0.01 short.
        let progress = promotion_progress(5, 5, 0.79, 0.80);
        assert!(!progress.can_promote);
        assert_eq!(progress.challenges_remaining, 0);

        let progress = promotion_progress(5, 5, 0.80, 0.80);
        assert!(progress.can_promote);
        assert_eq!(progress.progress_percentage, 100.0);
    }

    #[test]
    fn zero_requirement_counts_as_satisfied() {
        let progress = promotion_progress(0, 0, 0.0, 0.0);
        assert!(progress.can_promote);
        assert_eq!(progress.progress_percentage, 100.0);
    }

    #[test]
    fn percentage_is_the_mean_of_the_capped_ratios() {
        // 2/4 challenges and 0.40/0.80 accuracy: both ratios are 0.5.
        let progress = promotion_progress(2, 4, 0.40, 0.80);
        assert!((progress.progress_percentage - 50.0).abs() < 1e-9);
        assert_eq!(progress.challenges_remaining, 2);

        // Overshooting a threshold never contributes more than 100%.
        let progress = promotion_progress(8, 4, 0.40, 0.80);
        assert!((progress.progress_percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn summary_averages_and_points() {
        let stored = StoredProgress {
            completed_lessons: vec!["l1".into(), "l2".into(), "l3".into()],
            quiz_scores: vec![70, 75],
        };
        let summary = summarize(&stored);
        assert_eq!(summary.lessons_completed, 3);
        assert_eq!(summary.quizzes_taken, 2);
        // 72.5 rounds up.
        assert_eq!(summary.average_quiz_score, 73);
        assert_eq!(summary.points, 30);
    }

    #[test]
    fn empty_progress_summarizes_to_zeroes() {
        let summary = summarize(&StoredProgress::default());
        assert_eq!(summary, ProgressSummary::default());
    }

    #[test]
    fn achievements_unlock_at_their_thresholds() {
        let none = achievements(&ProgressSummary::default());
        assert!(none.iter().all(|a| !a.unlocked));

        let some = achievements(&ProgressSummary {
            lessons_completed: 5,
            quizzes_taken: 1,
            average_quiz_score: 60,
            points: 50,
        });
        assert!(some.iter().all(|a| a.unlocked));
    }
}
