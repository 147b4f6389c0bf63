//! Structured field extraction from free-text model answers.
//!
//! Pure and total: every field has a default, so any input (including an
//! empty string) yields a complete [`StructuredFields`].

use std::sync::LazyLock;

use regex::Regex;

use clipscope_models::analysis::{DEFAULT_BUDGET_USD, DEFAULT_DIFFICULTY, DEFAULT_REPLICATION_SCORE};
use clipscope_models::{BeginnerAssessment, StructuredFields};

static REPLICATION_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:overall|replication)(?:\s+score)?[*\s]*:[*\s]*(\d+)(?:\.\d+)?\s*/\s*10")
        .expect("valid replication regex")
});

static DIFFICULTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdifficulty[*\s]*:[*\s]*(\d+)(?:\.\d+)?\s*/\s*10").expect("valid difficulty regex")
});

static BUDGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:total|budget)[*\s]*:[*\s]*\$\s*(\d[\d,]*)").expect("valid budget regex")
});

static YES_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bYES\b").expect("valid yes regex"));
static BUT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bBUT\b").expect("valid but regex"));
static NO_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bNO\b").expect("valid no regex"));

/// Extract all structured fields.
pub fn structure(raw_text: &str) -> StructuredFields {
    StructuredFields {
        replication_score: score_out_of_ten(&REPLICATION_SCORE, raw_text).unwrap_or(DEFAULT_REPLICATION_SCORE),
        difficulty: score_out_of_ten(&DIFFICULTY, raw_text).unwrap_or(DEFAULT_DIFFICULTY),
        budget_usd: budget(raw_text).unwrap_or(DEFAULT_BUDGET_USD),
        beginner_assessment: beginner_assessment(raw_text),
    }
}

/// First `N/10` match; values above 10 are malformed.
fn score_out_of_ten(pattern: &Regex, text: &str) -> Option<u8> {
    let captures = pattern.captures(text)?;
    let value: u8 = captures.get(1)?.as_str().parse().ok()?;
    (value <= 10).then_some(value)
}

/// First `Total: $N` or `Budget: $N`, commas allowed, cents ignored.
fn budget(text: &str) -> Option<u32> {
    let captures = BUDGET.captures(text)?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Classify the beginner verdict from its uppercase marker words.
pub fn beginner_assessment(text: &str) -> BeginnerAssessment {
    let has_but = BUT_WORD.is_match(text);
    let mut has_yes = false;
    let mut has_plain_yes = false;

    for m in YES_WORD.find_iter(text) {
        has_yes = true;
        let rest = text[m.end()..].trim_start();
        let qualified = rest.starts_with('-') || BUT_WORD.find(rest).is_some_and(|b| b.start() == 0);
        if !qualified {
            has_plain_yes = true;
        }
    }

    if has_plain_yes && !has_but {
        BeginnerAssessment::Yes
    } else if has_yes {
        BeginnerAssessment::YesWithConditions
    } else if NO_WORD.is_match(text) {
        BeginnerAssessment::No
    } else {
        BeginnerAssessment::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_score() {
        assert_eq!(structure("Overall: 8/10").replication_score, 8);
        assert_eq!(structure("**Overall Score:** 6/10").replication_score, 6);
        assert_eq!(structure("replication: 9 / 10").replication_score, 9);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let fields = structure("The video is nice.");
        assert_eq!(fields, StructuredFields::default());
        assert_eq!(structure("").replication_score, 7);
    }

    #[test]
    fn test_malformed_score_uses_default() {
        assert_eq!(structure("Overall: 15/10").replication_score, 7);
        assert_eq!(structure("Difficulty: 300/10").difficulty, 5);
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Overall: 4/10\nLater, Overall: 9/10\nDifficulty: 3/10\nDifficulty: 8/10";
        let fields = structure(text);
        assert_eq!(fields.replication_score, 4);
        assert_eq!(fields.difficulty, 3);
    }

    #[test]
    fn test_budget() {
        assert_eq!(structure("Total: $1,250.99").budget_usd, 1250);
        assert_eq!(structure("- **Budget:** $ 35").budget_usd, 35);
        assert_eq!(structure("Costs about 20 dollars").budget_usd, 50);
    }

    #[test]
    fn test_unqualified_yes() {
        assert_eq!(beginner_assessment("✅ YES, anyone can do this."), BeginnerAssessment::Yes);
    }

    #[test]
    fn test_yes_but_is_conditional() {
        assert_eq!(
            beginner_assessment("⚠️ YES BUT need extra lighting"),
            BeginnerAssessment::YesWithConditions
        );
        assert_eq!(
            beginner_assessment("YES - with a tripod"),
            BeginnerAssessment::YesWithConditions
        );
        assert_eq!(
            beginner_assessment("YES. BUT the editing is hard."),
            BeginnerAssessment::YesWithConditions
        );
    }

    #[test]
    fn test_no() {
        assert_eq!(beginner_assessment("❌ NO, too much gear."), BeginnerAssessment::No);
        assert_eq!(beginner_assessment("There is NOTHING here"), BeginnerAssessment::YesWithConditions);
    }

    #[test]
    fn test_lowercase_words_are_ignored() {
        assert_eq!(beginner_assessment("yes, but no"), BeginnerAssessment::YesWithConditions);
    }

    #[test]
    fn test_idempotent() {
        let text = "Overall: 8/10\nDifficulty: 4/10\nBudget: $120\n⚠️ YES BUT practice first";
        let first = structure(text);
        assert_eq!(first, structure(text));
        assert_eq!(first.replication_score, 8);
        assert_eq!(first.difficulty, 4);
        assert_eq!(first.budget_usd, 120);
        assert_eq!(first.beginner_assessment, BeginnerAssessment::YesWithConditions);
    }

    #[test]
    fn test_answer_in_requested_layout() {
        let answer = "2. REPLICATION GUIDE\n\
                      - Cardboard: $5\n\
                      - Total: $45\n\n\
                      3. DIFFICULTY\n   \
                      - Equipment: 2/10\n   \
                      - Acting: 3/10\n   \
                      - Setup: 2/10\n   \
                      - Difficulty: 4/10 (how hard the whole video is to recreate)\n   \
                      - Overall: 6/10 (how replicable the video is)\n   \
                      - Budget: $30\n\n\
                      4. BEGINNER VERDICT\n\
                      ✅ YES, only scissors and tape.";
        let fields = structure(answer);
        assert_eq!(fields.difficulty, 4);
        assert_eq!(fields.replication_score, 6);
        assert_eq!(fields.budget_usd, 45);
        assert_eq!(fields.beginner_assessment, BeginnerAssessment::Yes);
    }
}
