use crate::error::ErrorPayload;
use crate::guide::GuideStep;
use crate::mode::AccessibilityMode;
use crate::remediation::{CheckKind, ContrastCheck, RemediationReport};
use crate::types::DomSnapshot;
use serde::{Deserialize, Serialize};

/// Schema version for output payloads.
pub const SHADOWLIGHT_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ShadowOutput {
    Contrast(ContrastOutput),
    Apply(ApplyOutput),
    Audit(AuditOutput),
    Summarize(SummarizeOutput),
    Guide(GuideOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastOutput {
    pub version: String,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub required: f64,
    pub large_text: bool,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutput {
    pub version: String,
    pub site: String,
    pub previous_mode: AccessibilityMode,
    pub active_mode: AccessibilityMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RemediationReport>,
    pub snapshot: DomSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub nodes: usize,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AuditFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub node: String,
    pub tag: String,
    pub kind: CheckKind,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub required: f64,
}

impl AuditFinding {
    pub fn new(node: &str, tag: &str, check: &ContrastCheck) -> Self {
        Self {
            node: node.to_string(),
            tag: tag.to_string(),
            kind: check.kind,
            foreground: check.foreground.to_hex(),
            background: check.background.to_hex(),
            ratio: check.ratio,
            required: check.required,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideOutput {
    pub version: String,
    pub intent: String,
    /// Set when the request names an accessibility mode instead of a task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_mode: Option<AccessibilityMode>,
    #[serde(default)]
    pub steps: Vec<GuideStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::ErrorCategory;

    #[test]
    fn contrast_output_serializes() {
        let output = ShadowOutput::Contrast(ContrastOutput {
            version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
            foreground: "#FFFFFF".into(),
            background: "#FFFF00".into(),
            ratio: 1.07,
            required: 4.5,
            large_text: false,
            passed: false,
            suggestion: Some("#111111".into()),
        });

        let json = serde_json::to_string(&output).expect("serialize contrast output");
        assert!(json.contains("\"mode\":\"contrast\""));
        assert!(json.contains("\"largeText\":false"));
        assert!(json.contains("\"suggestion\":\"#111111\""));
    }

    #[test]
    fn apply_output_uses_kebab_case_modes() {
        let output = ShadowOutput::Apply(ApplyOutput {
            version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
            site: "example.com".into(),
            previous_mode: AccessibilityMode::None,
            active_mode: AccessibilityMode::AutoFix,
            stylesheet: None,
            report: Some(RemediationReport::default()),
            snapshot: DomSnapshot::default(),
        });

        let json = serde_json::to_string(&output).expect("serialize apply output");
        assert!(json.contains("\"mode\":\"apply\""));
        assert!(json.contains("\"activeMode\":\"auto-fix\""));
        assert!(json.contains("\"textFixed\":0"));
    }

    #[test]
    fn audit_finding_renders_hex_colors() {
        let check = ContrastCheck {
            kind: CheckKind::Border,
            foreground: Color::new(238, 238, 238),
            background: Color::WHITE,
            ratio: 1.16,
            required: 3.0,
        };
        let finding = AuditFinding::new("field", "input", &check);
        let json = serde_json::to_string(&finding).unwrap();
        assert!(json.contains("\"kind\":\"border\""));
        assert!(json.contains("\"foreground\":\"#EEEEEE\""));
    }

    #[test]
    fn error_output_serializes() {
        let output = ShadowOutput::Error(ErrorOutput {
            version: SHADOWLIGHT_OUTPUT_VERSION.to_string(),
            message: Some("boom".into()),
            error: ErrorPayload::new(ErrorCategory::Store, "boom".into(), "fix it"),
        });
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"mode\":\"error\""));
        assert!(json.contains("\"category\":\"store\""));
    }
}
