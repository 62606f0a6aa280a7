//! Per-site accessibility mode controller.
//!
//! Every transition first reverts whatever the previous mode did (injected
//! stylesheet and remediated nodes), then applies the new mode, then
//! persists it under the site's key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{Result, ShadowError};
use crate::remediation::{self, ContrastThresholds, RemediationReport};
use crate::store::KeyValueStore;
use crate::stylesheet::stylesheet_for;
use crate::tree::NodeMutate;

const STORE_KEY_PREFIX: &str = "accessibility_mode_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessibilityMode {
    #[default]
    None,
    HighContrastLight,
    HighContrastDark,
    ColorBlindAssist,
    AutoFix,
}

impl AccessibilityMode {
    pub fn all() -> [AccessibilityMode; 5] {
        [
            AccessibilityMode::None,
            AccessibilityMode::HighContrastLight,
            AccessibilityMode::HighContrastDark,
            AccessibilityMode::ColorBlindAssist,
            AccessibilityMode::AutoFix,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessibilityMode::None => "none",
            AccessibilityMode::HighContrastLight => "high-contrast-light",
            AccessibilityMode::HighContrastDark => "high-contrast-dark",
            AccessibilityMode::ColorBlindAssist => "color-blind-assist",
            AccessibilityMode::AutoFix => "auto-fix",
        }
    }

    pub fn is_static(self) -> bool {
        stylesheet_for(self).is_some()
    }

    /// Recognizes a mode request in free-form chat text.
    pub fn from_intent(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["auto fix", "auto-fix", "default fix"]) {
            Some(AccessibilityMode::AutoFix)
        } else if has(&["high light", "light mode"]) {
            Some(AccessibilityMode::HighContrastLight)
        } else if has(&["high dark", "dark mode"]) {
            Some(AccessibilityMode::HighContrastDark)
        } else if has(&["color-blind", "color blind", "colour blind"]) {
            Some(AccessibilityMode::ColorBlindAssist)
        } else if has(&["turn off", "disable", "reset"]) {
            Some(AccessibilityMode::None)
        } else {
            None
        }
    }
}

impl fmt::Display for AccessibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessibilityMode {
    type Err = ShadowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(AccessibilityMode::None),
            "high-contrast-light" => Ok(AccessibilityMode::HighContrastLight),
            "high-contrast-dark" => Ok(AccessibilityMode::HighContrastDark),
            "color-blind-assist" | "color-blind" => Ok(AccessibilityMode::ColorBlindAssist),
            "auto-fix" | "default-fix" => Ok(AccessibilityMode::AutoFix),
            other => Err(ShadowError::Config(format!(
                "Unknown accessibility mode '{other}'"
            ))),
        }
    }
}

/// What the active mode has done to the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ActiveOverride {
    #[default]
    Clean,
    Stylesheet {
        mode: AccessibilityMode,
        css: &'static str,
    },
    Remediation(RemediationReport),
}

/// Store key for a site's mode.
pub fn store_key(site: &str) -> String {
    format!("{STORE_KEY_PREFIX}{site}")
}

/// Host part of a page URL, used as the site identity.
pub fn site_from_url(page_url: &str) -> Option<String> {
    url::Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

pub struct ModeController<S> {
    site: String,
    store: S,
    thresholds: ContrastThresholds,
    mode: AccessibilityMode,
    active: ActiveOverride,
}

impl<S: KeyValueStore> ModeController<S> {
    pub fn new(site: impl Into<String>, store: S) -> Self {
        Self {
            site: site.into(),
            store,
            thresholds: ContrastThresholds::default(),
            mode: AccessibilityMode::None,
            active: ActiveOverride::Clean,
        }
    }

    pub fn with_thresholds(mut self, thresholds: ContrastThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn get_mode(&self) -> AccessibilityMode {
        self.mode
    }

    pub fn active_override(&self) -> &ActiveOverride {
        &self.active
    }

    /// Stylesheet currently injected, if any.
    pub fn active_stylesheet(&self) -> Option<&'static str> {
        match self.active {
            ActiveOverride::Stylesheet { css, .. } => Some(css),
            _ => None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Requests `requested`; asking for the mode that is already active
    /// turns it off. Returns the mode in effect afterwards.
    pub fn set_mode<T: NodeMutate>(
        &mut self,
        tree: &mut T,
        requested: AccessibilityMode,
    ) -> AccessibilityMode {
        let next = if requested == self.mode {
            AccessibilityMode::None
        } else {
            requested
        };
        self.apply(tree, next);
        self.persist();
        next
    }

    /// Re-applies the site's persisted mode, e.g. on page load. Unknown
    /// stored values fall back to `none`.
    pub fn restore<T: NodeMutate>(&mut self, tree: &mut T) -> Result<AccessibilityMode> {
        let stored = self.store.get(&store_key(&self.site))?;
        let mode = match stored.as_deref() {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(site = %self.site, value, error = %e, "ignoring unknown stored mode");
                AccessibilityMode::None
            }),
            None => AccessibilityMode::None,
        };
        self.apply(tree, mode);
        Ok(mode)
    }

    /// Removes every mutation made by the current mode. Always safe to call.
    pub fn revert<T: NodeMutate>(&mut self, tree: &mut T) {
        self.active = ActiveOverride::Clean;
        remediation::revert(tree);
        self.mode = AccessibilityMode::None;
    }

    fn apply<T: NodeMutate>(&mut self, tree: &mut T, mode: AccessibilityMode) {
        let previous = self.mode;
        self.revert(tree);

        self.active = match mode {
            AccessibilityMode::None => ActiveOverride::Clean,
            AccessibilityMode::AutoFix => {
                ActiveOverride::Remediation(remediation::remediate(tree, &self.thresholds))
            }
            static_mode => match stylesheet_for(static_mode) {
                Some(css) => ActiveOverride::Stylesheet {
                    mode: static_mode,
                    css,
                },
                None => ActiveOverride::Clean,
            },
        };
        self.mode = mode;
        info!(site = %self.site, from = %previous, to = %mode, "accessibility mode applied");
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.set(&store_key(&self.site), self.mode.as_str()) {
            warn!(site = %self.site, error = %e, "failed to persist accessibility mode");
        }
    }
}
