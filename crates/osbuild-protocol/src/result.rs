//! Build result records
//!
//! osbuild prints exactly one JSON object on stdout when it finishes. The
//! record says whether the build succeeded and lists the stages it ran, in
//! order. A failed build still prints a record covering the stages that ran
//! before the failure.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Structured record describing what the build engine did.
///
/// Only `success` is required. Fields not modelled here are kept in
/// [`BuildResult::extra`] so that re-serializing a record loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Whether the whole build succeeded
    pub success: bool,

    /// Per-stage outcomes, in execution order
    #[serde(default)]
    pub stages: Vec<StageOutcome>,

    /// Content hash of the tree the stages produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,

    /// Content hash of the assembled output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_id: Option<String>,

    /// Result of the build-root pipeline, if the manifest had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Box<BuildResult>>,

    /// Outcome of the assembler stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembler: Option<StageOutcome>,

    /// Any other fields the engine reported
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BuildResult {
    /// Create a result with the given success flag and stages
    pub fn new(success: bool, stages: Vec<StageOutcome>) -> Self {
        Self {
            success,
            stages,
            tree_id: None,
            output_id: None,
            build: None,
            assembler: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Parse a result record from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a single well-formed record
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a result record from raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a single well-formed record
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Names of the reported stages, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(StageOutcome::name).collect()
    }

    /// First stage that reported failure, if any
    pub fn failed_stage(&self) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .chain(self.assembler.as_ref())
            .find(|stage| stage.success() == Some(false))
    }

    /// Stages that did not report failure
    ///
    /// Bare stage names carry no status of their own; the engine only lists
    /// stages it got to, so they count as completed.
    pub fn completed_stages(&self) -> impl Iterator<Item = &StageOutcome> {
        self.stages
            .iter()
            .filter(|stage| stage.success() != Some(false))
    }
}

/// Outcome of a single stage.
///
/// The engine may report a stage as a bare name or as a full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageOutcome {
    /// Stage reported by name only
    Named(String),

    /// Stage reported with status and output
    Detailed(StageResult),
}

impl StageOutcome {
    /// Stage name, falling back to its type or id when unnamed
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Detailed(result) => result.label(),
        }
    }

    /// Reported success, if the stage carries a status
    pub fn success(&self) -> Option<bool> {
        match self {
            Self::Named(_) => None,
            Self::Detailed(result) => result.success,
        }
    }
}

impl From<&str> for StageOutcome {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<StageResult> for StageOutcome {
    fn from(result: StageResult) -> Self {
        Self::Detailed(result)
    }
}

/// Detailed stage record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name, e.g. `org.osbuild.rpm`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Stage type, used by engines that report `type` instead of `name`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Stage identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether the stage succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Captured stage output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Options the stage ran with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,

    /// Stage-specific metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Any other fields the engine reported
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StageResult {
    /// Create a named stage record with the given status
    pub fn new(name: impl Into<String>, success: bool) -> Self {
        Self {
            name: name.into(),
            success: Some(success),
            ..Default::default()
        }
    }

    /// Attach captured output
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    fn label(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.kind
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_bare_stage_names() {
        let result =
            BuildResult::from_json_str(r#"{"success":true,"stages":["stageA","stageB"]}"#).unwrap();
        assert!(result.success);
        assert_eq!(result.stage_names(), vec!["stageA", "stageB"]);
        assert!(result.failed_stage().is_none());
        assert_eq!(result.completed_stages().count(), 2);
    }

    #[test]
    fn test_detailed_partial_result() {
        let result = BuildResult::from_json_str(
            r#"{
                "tree_id": "abc",
                "success": false,
                "stages": [
                    {"name": "org.osbuild.rpm", "success": true, "output": "installed"},
                    {"name": "org.osbuild.selinux", "success": false, "output": "denied"}
                ]
            }"#,
        )
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.tree_id.as_deref(), Some("abc"));
        assert_eq!(result.failed_stage().map(StageOutcome::name), Some("org.osbuild.selinux"));
        let completed: Vec<_> = result.completed_stages().map(StageOutcome::name).collect();
        assert_eq!(completed, vec!["org.osbuild.rpm"]);
    }

    #[test]
    fn test_failed_assembler_is_reported() {
        let mut result = BuildResult::new(false, vec![StageResult::new("org.osbuild.rpm", true).into()]);
        result.assembler = Some(StageResult::new("org.osbuild.qemu", false).into());
        assert_eq!(result.failed_stage().map(StageOutcome::name), Some("org.osbuild.qemu"));
    }

    #[test]
    fn test_nested_build_result() {
        let result = BuildResult::from_json_str(
            r#"{"success": true, "build": {"success": true, "stages": ["org.osbuild.rpm"]}}"#,
        )
        .unwrap();
        let build = result.build.as_deref().unwrap();
        assert_eq!(build.stage_names(), vec!["org.osbuild.rpm"]);
        assert!(result.stages.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let input = json!({
            "success": true,
            "stages": [{"type": "org.osbuild.mkdir", "id": "s1", "timing": 12}],
            "log": {"stage": "done"}
        });
        let result: BuildResult = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(result.stage_names(), vec!["org.osbuild.mkdir"]);
        assert_eq!(serde_json::to_value(&result).unwrap(), input);
    }

    #[rstest]
    #[case::empty_object("{}")]
    #[case::array(r#"["stageA"]"#)]
    #[case::truncated(r#"{"success":true,"stages":["stageA""#)]
    #[case::trailing_garbage(r#"{"success":true} {"success":false}"#)]
    #[case::wrong_type(r#"{"success":"yes"}"#)]
    fn test_malformed_records_are_rejected(#[case] input: &str) {
        assert!(BuildResult::from_json_str(input).is_err());
    }

    #[test]
    fn test_stage_label_fallbacks() {
        let by_id = StageResult {
            id: Some("f00".to_string()),
            ..Default::default()
        };
        assert_eq!(StageOutcome::from(by_id).name(), "f00");
        assert_eq!(StageOutcome::from(StageResult::default()).name(), "");
        assert_eq!(StageOutcome::from("stageA").success(), None);
    }
}
