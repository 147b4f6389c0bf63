//! Script composition.
//!
//! Turns a prior analysis and a product profile into a five-section script
//! with one model call, then slices the answer by its literal headings.

use std::sync::Arc;

use tracing::info;

use clipscope_ml_client::{GenerativeModel, MlError};
use clipscope_models::{AnalysisResult, ProductProfile, ScriptResult, ScriptSection};

use crate::error::{PipelineError, PipelineResult};
use crate::metrics::record_quota_error;

/// Characters of the prior analysis text carried into the prompt.
pub const MAX_ANALYSIS_CHARS: usize = 6000;

/// Markup that may follow a heading on its own line.
const HEADING_SUFFIX: &[char] = &['#', '*', ':', '-', ' ', '\t'];

/// Markup that may precede the next heading on its line.
const HEADING_PREFIX: &[char] = &['#', '*', ' ', '\t'];

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "not specified"
    } else {
        value.trim()
    }
}

/// Build the script prompt.
pub fn build_script_prompt(analysis: &AnalysisResult, profile: &ProductProfile) -> String {
    let structured = &analysis.structured;
    let headings: Vec<&str> = ScriptSection::ORDER.iter().map(|s| s.heading()).collect();

    format!(
        r#"You are a short-form video director. Write a production-ready script that recreates the format of the analyzed video for a new product.

PRODUCT:
- Name: {name}
- Description: {description}
- Target audience: {audience}
- Unique selling point: {usp}
- Video length: {length} seconds
- Tone: {tone}

REFERENCE VIDEO ANALYSIS:
- Replication score: {score}/10
- Difficulty: {difficulty}/10
- Budget: ${budget}
- Beginner friendly: {beginner}

{analysis_text}

Answer with exactly these five sections, in this order. Put each heading on its own line, in capitals, without numbering:
{heading_list}

Under MASTER SCRIPT give a second-by-second script with a timestamp on every line (0:00, 0:01, ...). Under SHOT LIST give every shot with framing and duration. Under DIALOGUE SCRIPT give a word-for-word transcript of everything that is spoken. Under DIRECTOR'S NOTES give lighting, pacing and performance guidance. Under ALTERNATIVE VERSIONS give three alternative script variants, each with a different hook.
"#,
        name = profile.name.trim(),
        description = profile.description.trim(),
        audience = or_unspecified(&profile.target_audience),
        usp = or_unspecified(&profile.unique_selling_point),
        length = profile.length_seconds,
        tone = or_unspecified(&profile.tone),
        score = structured.replication_score,
        difficulty = structured.difficulty,
        budget = structured.budget_usd,
        beginner = structured.beginner_assessment.as_str(),
        analysis_text = truncate_chars(&analysis.raw_text, MAX_ANALYSIS_CHARS),
        heading_list = headings.join("\n"),
    )
}

/// Slice a script answer into its sections.
///
/// Each heading is found as a literal substring; its section runs to the
/// nearest other heading found after it, or to the end of the text. Missing
/// headings yield empty sections. `full_text` is always the input.
pub fn extract_sections(text: &str) -> ScriptResult {
    let mut result = ScriptResult {
        full_text: text.to_string(),
        ..ScriptResult::default()
    };

    for section in ScriptSection::ORDER {
        let Some(start) = text.find(section.heading()) else {
            continue;
        };
        let content_start = start + section.heading().len();
        let rest = &text[content_start..];

        let end = ScriptSection::ORDER
            .iter()
            .filter(|other| **other != section)
            .filter_map(|other| rest.find(other.heading()))
            .min()
            .unwrap_or(rest.len());

        result.set_section(section, section_body(&rest[..end]).to_string());
    }

    result
}

/// Drop heading markup around a section body. Only the rest of the heading
/// line and a trailing line holding the next heading's markup are removed;
/// markdown inside the body is kept.
fn section_body(raw: &str) -> &str {
    let body = raw.trim_start_matches(HEADING_SUFFIX);
    let body = match body.rfind('\n') {
        Some(idx) if body[idx + 1..].chars().all(|c| HEADING_PREFIX.contains(&c)) => &body[..idx],
        _ => body,
    };
    body.trim()
}

/// Composes scripts with the generative model.
pub struct ScriptComposer {
    model: Arc<dyn GenerativeModel>,
}

impl ScriptComposer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn compose(&self, analysis: &AnalysisResult, profile: &ProductProfile) -> PipelineResult<ScriptResult> {
        let prompt = build_script_prompt(analysis, profile);

        let text = match self.model.generate(&prompt, &[]).await {
            Ok(text) => text,
            Err(MlError::QuotaExceeded(detail)) => {
                record_quota_error("script", &detail);
                return Err(PipelineError::ProviderQuota(detail));
            }
            Err(e) => return Err(e.into()),
        };

        let script = extract_sections(&text);
        let found = ScriptSection::ORDER
            .iter()
            .filter(|s| !script.section(**s).is_empty())
            .count();
        info!(
            product = %profile.name,
            sections_found = found,
            chars = text.len(),
            "Script composed"
        );
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::test_support::FakeModel;
    use clipscope_models::{FrameSource, MetadataSource, StructuredFields, VideoMetadata};

    const FULL_ANSWER: &str = "## MASTER SCRIPT\n0:00 Hook with the lamp off.\n\n## SHOT LIST\n1. Close-up, 2s\n\n## DIALOGUE SCRIPT\n\"Your desk deserves better.\"\n\n## DIRECTOR'S NOTES\n**Warm key light**, fast cuts.\n\n## ALTERNATIVE VERSIONS\n- A: start with the reveal\n";

    fn analysis(raw_text: &str) -> AnalysisResult {
        AnalysisResult::new(
            VideoMetadata::new("https://www.tiktok.com/@a/video/1", MetadataSource::Embed),
            raw_text,
            StructuredFields::default(),
            FrameSource::Cover,
            1,
        )
    }

    fn profile() -> ProductProfile {
        ProductProfile {
            name: "GlowDesk Lamp".to_string(),
            description: "Clamp-on LED lamp".to_string(),
            target_audience: String::new(),
            unique_selling_point: "three color temperatures".to_string(),
            length_seconds: 45,
            tone: "energetic".to_string(),
        }
    }

    #[test]
    fn test_extract_all_sections() {
        let script = extract_sections(FULL_ANSWER);
        assert_eq!(script.master_script, "0:00 Hook with the lamp off.");
        assert_eq!(script.shot_list, "1. Close-up, 2s");
        assert_eq!(script.dialogue_script, "\"Your desk deserves better.\"");
        assert_eq!(script.directors_notes, "**Warm key light**, fast cuts.");
        assert_eq!(script.alternatives, "- A: start with the reveal");
        assert_eq!(script.full_text, FULL_ANSWER);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let text = "MASTER SCRIPT: open on the desk\nSHOT LIST: one wide\nDIALOGUE SCRIPT: hi\nALTERNATIVE VERSIONS: none";
        let script = extract_sections(text);
        assert_eq!(script.directors_notes, "");
        assert_eq!(script.master_script, "open on the desk");
        assert_eq!(script.dialogue_script, "hi");
        assert_eq!(script.alternatives, "none");
    }

    #[test]
    fn test_no_headings() {
        let script = extract_sections("just some prose");
        assert!(ScriptSection::ORDER.iter().all(|s| script.section(*s).is_empty()));
        assert_eq!(script.full_text, "just some prose");
    }

    #[test]
    fn test_prompt_truncates_analysis() {
        let long = "x".repeat(MAX_ANALYSIS_CHARS + 500);
        let prompt = build_script_prompt(&analysis(&long), &profile());
        assert!(prompt.contains(&"x".repeat(MAX_ANALYSIS_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_ANALYSIS_CHARS + 1)));
        assert!(prompt.contains("GlowDesk Lamp"));
        assert!(prompt.contains("45 seconds"));
        assert!(prompt.contains("Target audience: not specified"));
        assert!(prompt.contains("DIRECTOR'S NOTES"));
    }

    #[test]
    fn test_prompt_asks_for_timed_script_transcript_and_three_variants() {
        let prompt = build_script_prompt(&analysis("Overall: 8/10"), &profile());
        assert!(prompt.contains("second-by-second"));
        assert!(prompt.contains("word-for-word transcript"));
        assert!(prompt.contains("three alternative script variants"));
    }

    #[test]
    fn test_body_markdown_is_preserved() {
        let text = "**MASTER SCRIPT**\n**0:00** Lamp *clicks* on\n\n**SHOT LIST**\n- Wide: 2s\n- Close-up: 1s -\n\n### DIRECTOR'S NOTES:\nKeep it **bright**\n";
        let script = extract_sections(text);
        assert_eq!(script.master_script, "**0:00** Lamp *clicks* on");
        assert_eq!(script.shot_list, "- Wide: 2s\n- Close-up: 1s -");
        assert_eq!(script.directors_notes, "Keep it **bright**");
    }

    #[tokio::test]
    async fn test_compose() {
        let model = Arc::new(FakeModel::answering(FULL_ANSWER));
        let composer = ScriptComposer::new(model.clone());

        let script = composer.compose(&analysis("Overall: 8/10"), &profile()).await.unwrap();
        assert_eq!(script.shot_list, "1. Close-up, 2s");
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.last_image_count(), 0);
        assert!(model.last_prompt().contains("Overall: 8/10"));
    }

    #[tokio::test]
    async fn test_compose_quota() {
        let model = Arc::new(FakeModel::failing(MlError::QuotaExceeded("exhausted".to_string())));
        let composer = ScriptComposer::new(model);

        let err = composer.compose(&analysis(""), &profile()).await.unwrap_err();
        assert!(err.is_quota_exceeded());
    }
}
