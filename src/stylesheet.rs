//! Declarative override stylesheets for the static accessibility modes.

use crate::mode::AccessibilityMode;

/// Element id the injected `<style>` carries in the page.
pub const STYLESHEET_ID: &str = "shadowlight-accessibility-style";

const HIGH_CONTRAST_LIGHT: &str = r#"
* {
    background-color: #ffffff !important;
    color: #000000 !important;
    border-color: #000000 !important;
    text-shadow: none !important;
    box-shadow: none !important;
}
a, a * { color: #0000ee !important; text-decoration: underline !important; }
a:visited, a:visited * { color: #551a8b !important; }
img, video { opacity: 1 !important; }
"#;

const HIGH_CONTRAST_DARK: &str = r#"
* {
    background-color: #000000 !important;
    color: #ffffff !important;
    border-color: #ffffff !important;
    text-shadow: none !important;
    box-shadow: none !important;
}
a, a * { color: #ffff00 !important; text-decoration: underline !important; }
img, video { opacity: 0.8; }
"#;

const COLOR_BLIND_ASSIST: &str = r#"
html {
    filter: saturate(1.4) hue-rotate(-15deg) contrast(1.1) !important;
}
a { text-decoration: underline !important; }
"#;

/// The fixed stylesheet of a static mode; `None` for `none` and `auto-fix`.
pub fn stylesheet_for(mode: AccessibilityMode) -> Option<&'static str> {
    match mode {
        AccessibilityMode::HighContrastLight => Some(HIGH_CONTRAST_LIGHT),
        AccessibilityMode::HighContrastDark => Some(HIGH_CONTRAST_DARK),
        AccessibilityMode::ColorBlindAssist => Some(COLOR_BLIND_ASSIST),
        AccessibilityMode::None | AccessibilityMode::AutoFix => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_modes_have_stylesheets() {
        let light = stylesheet_for(AccessibilityMode::HighContrastLight).unwrap();
        assert!(light.contains("#0000ee"));
        assert!(light.contains("background-color: #ffffff !important"));

        let dark = stylesheet_for(AccessibilityMode::HighContrastDark).unwrap();
        assert!(dark.contains("#ffff00"));
        assert!(dark.contains("color: #ffffff !important"));

        let cb = stylesheet_for(AccessibilityMode::ColorBlindAssist).unwrap();
        assert!(cb.contains("hue-rotate"));
        assert!(cb.contains("saturate"));
    }

    #[test]
    fn adaptive_and_off_modes_have_none() {
        assert!(stylesheet_for(AccessibilityMode::None).is_none());
        assert!(stylesheet_for(AccessibilityMode::AutoFix).is_none());
    }
}
