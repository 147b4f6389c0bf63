//! Product profile and composed script models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product the script is written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductProfile {
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 2000, message = "Product description is required"))]
    pub description: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub target_audience: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub unique_selling_point: String,

    /// Desired video length in seconds
    #[serde(default = "default_length_seconds")]
    #[validate(range(min = 5, max = 180))]
    pub length_seconds: u32,

    #[serde(default = "default_tone")]
    #[validate(length(max = 100))]
    pub tone: String,
}

fn default_length_seconds() -> u32 {
    30
}

fn default_tone() -> String {
    "casual".to_string()
}

/// The fixed sections of a composed script, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSection {
    MasterScript,
    ShotList,
    DialogueScript,
    DirectorsNotes,
    Alternatives,
}

impl ScriptSection {
    pub const ORDER: [ScriptSection; 5] = [
        ScriptSection::MasterScript,
        ScriptSection::ShotList,
        ScriptSection::DialogueScript,
        ScriptSection::DirectorsNotes,
        ScriptSection::Alternatives,
    ];

    /// Literal heading the model is asked to echo.
    pub fn heading(&self) -> &'static str {
        match self {
            ScriptSection::MasterScript => "MASTER SCRIPT",
            ScriptSection::ShotList => "SHOT LIST",
            ScriptSection::DialogueScript => "DIALOGUE SCRIPT",
            ScriptSection::DirectorsNotes => "DIRECTOR'S NOTES",
            ScriptSection::Alternatives => "ALTERNATIVE VERSIONS",
        }
    }
}

/// Script sliced into its sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    pub master_script: String,
    pub shot_list: String,
    pub dialogue_script: String,
    pub directors_notes: String,
    pub alternatives: String,
    /// Unsliced model answer
    pub full_text: String,
}

impl ScriptResult {
    pub fn section(&self, section: ScriptSection) -> &str {
        match section {
            ScriptSection::MasterScript => &self.master_script,
            ScriptSection::ShotList => &self.shot_list,
            ScriptSection::DialogueScript => &self.dialogue_script,
            ScriptSection::DirectorsNotes => &self.directors_notes,
            ScriptSection::Alternatives => &self.alternatives,
        }
    }

    pub fn set_section(&mut self, section: ScriptSection, text: String) {
        match section {
            ScriptSection::MasterScript => self.master_script = text,
            ScriptSection::ShotList => self.shot_list = text,
            ScriptSection::DialogueScript => self.dialogue_script = text,
            ScriptSection::DirectorsNotes => self.directors_notes = text,
            ScriptSection::Alternatives => self.alternatives = text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProductProfile {
        ProductProfile {
            name: "GlowDesk Lamp".to_string(),
            description: "Clamp-on LED lamp".to_string(),
            target_audience: "students".to_string(),
            unique_selling_point: "three color temperatures".to_string(),
            length_seconds: 30,
            tone: "energetic".to_string(),
        }
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile().validate().is_ok());

        let mut missing_name = profile();
        missing_name.name = String::new();
        assert!(missing_name.validate().is_err());

        let mut too_long = profile();
        too_long.length_seconds = 600;
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_profile_defaults_from_json() {
        let parsed: ProductProfile =
            serde_json::from_str(r#"{"name":"Mug","description":"Ceramic"}"#).unwrap();
        assert_eq!(parsed.length_seconds, 30);
        assert_eq!(parsed.tone, "casual");
        assert!(parsed.target_audience.is_empty());
    }

    #[test]
    fn test_section_accessors() {
        let mut result = ScriptResult::default();
        result.set_section(ScriptSection::DirectorsNotes, "notes".to_string());
        assert_eq!(result.section(ScriptSection::DirectorsNotes), "notes");
        assert_eq!(result.section(ScriptSection::ShotList), "");
    }
}
