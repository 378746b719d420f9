//! App-package selection: a fixed option list with a custom-text fallback.

use crate::model::Scenario;

pub const CUSTOM_VALUE: &str = "custom";

/// Fixed selector entries. The first is the default ("Auto" lets the backend
/// discover the package), the last is the custom-text escape hatch.
const FIXED_OPTIONS: &[(&str, &str)] = &[
    ("", "Auto (discover)"),
    ("com.android.settings", "Android Settings"),
    ("com.android.chrome", "Chrome"),
    ("com.google.android.calculator", "Calculator"),
    (CUSTOM_VALUE, "Custom…"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOption {
    pub value: String,
    pub label: String,
}

/// Snapshot of the selector pair handed to the run controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChoice {
    pub option: String,
    pub custom: String,
}

impl PackageChoice {
    /// Effective package: custom text (trimmed) when the custom option is
    /// selected, the option value verbatim otherwise.
    pub fn resolve(&self) -> String {
        if self.option == CUSTOM_VALUE {
            self.custom.trim().to_string()
        } else {
            self.option.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageField {
    options: Vec<PackageOption>,
    selected: usize,
    custom_text: String,
    custom_visible: bool,
}

impl Default for PackageField {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageField {
    pub fn new() -> Self {
        Self::with_options(
            FIXED_OPTIONS
                .iter()
                .map(|(value, label)| PackageOption {
                    value: (*value).to_string(),
                    label: (*label).to_string(),
                })
                .collect(),
        )
    }

    pub fn with_options(options: Vec<PackageOption>) -> Self {
        Self {
            options,
            selected: 0,
            custom_text: String::new(),
            custom_visible: false,
        }
    }

    pub fn selected_label(&self) -> &str {
        self.options
            .get(self.selected)
            .map(|o| o.label.as_str())
            .unwrap_or("")
    }

    pub fn selected_value(&self) -> &str {
        self.options
            .get(self.selected)
            .map(|o| o.value.as_str())
            .unwrap_or("")
    }

    pub fn is_custom(&self) -> bool {
        self.selected_value() == CUSTOM_VALUE
    }

    pub fn custom_visible(&self) -> bool {
        self.custom_visible
    }

    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    pub fn push_custom_char(&mut self, c: char) {
        self.custom_text.push(c);
    }

    pub fn pop_custom_char(&mut self) {
        self.custom_text.pop();
    }

    /// Cycle the selector; mirrors the dropdown's onchange handling of the
    /// custom field's visibility.
    pub fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.select((self.selected + 1) % self.options.len());
        }
    }

    pub fn select_prev(&mut self) {
        if !self.options.is_empty() {
            self.select((self.selected + self.options.len() - 1) % self.options.len());
        }
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        if self.is_custom() {
            self.custom_visible = true;
        } else {
            self.custom_visible = false;
            self.custom_text.clear();
        }
    }

    /// Reconcile the selector with a chosen scenario's package: exact match
    /// against the fixed list selects that option and hides the custom field;
    /// no match selects "custom" and reveals the package in the custom field.
    /// Linear scan, first exact match wins.
    pub fn apply_scenario(&mut self, scenario: &Scenario) {
        self.apply_package(&scenario.package);
    }

    pub fn apply_package(&mut self, package: &str) {
        if let Some(i) = self.options.iter().position(|o| o.value == package) {
            self.selected = i;
            self.custom_visible = false;
            self.custom_text.clear();
        } else if let Some(i) = self.options.iter().position(|o| o.value == CUSTOM_VALUE) {
            self.selected = i;
            self.custom_text = package.to_string();
            self.custom_visible = true;
        }
    }

    /// Revert to the default option with the custom field cleared and hidden.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.custom_text.clear();
        self.custom_visible = false;
    }

    pub fn choice(&self) -> PackageChoice {
        PackageChoice {
            option: self.selected_value().to_string(),
            custom: self.custom_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(package: &str) -> Scenario {
        Scenario {
            id: "s1".into(),
            name: "Login flow".into(),
            package: package.into(),
            goal: "Log in as test user".into(),
            steps: Vec::new(),
        }
    }

    #[test]
    fn resolve_returns_option_verbatim() {
        let choice = PackageChoice {
            option: "com.android.settings".into(),
            custom: "ignored".into(),
        };
        assert_eq!(choice.resolve(), "com.android.settings");
    }

    #[test]
    fn resolve_trims_custom_text() {
        let choice = PackageChoice {
            option: CUSTOM_VALUE.into(),
            custom: "  com.app.login  ".into(),
        };
        assert_eq!(choice.resolve(), "com.app.login");
    }

    #[test]
    fn scenario_package_matching_fixed_option_hides_custom_field() {
        let mut field = PackageField::new();
        field.apply_scenario(&scenario("com.android.chrome"));
        assert_eq!(field.selected_value(), "com.android.chrome");
        assert!(!field.custom_visible());
        assert!(field.custom_text().is_empty());
    }

    #[test]
    fn scenario_package_without_match_reveals_custom_field() {
        let mut field = PackageField::new();
        field.apply_scenario(&scenario("com.app.login"));
        assert_eq!(field.selected_value(), CUSTOM_VALUE);
        assert!(field.custom_visible());
        assert_eq!(field.custom_text(), "com.app.login");
        assert_eq!(field.choice().resolve(), "com.app.login");
    }

    #[test]
    fn reset_restores_default_option() {
        let mut field = PackageField::new();
        field.apply_scenario(&scenario("com.app.login"));
        field.reset();
        assert_eq!(field.selected_value(), "");
        assert!(!field.custom_visible());
        assert!(field.custom_text().is_empty());
    }

    #[test]
    fn cycling_off_custom_clears_the_text() {
        let mut field = PackageField::new();
        field.apply_package("com.app.login");
        assert!(field.is_custom());
        field.select_next(); // wraps to the default option
        assert!(!field.custom_visible());
        assert!(field.custom_text().is_empty());
    }

    #[test]
    fn empty_option_list_is_inert_not_a_panic() {
        let mut field = PackageField::with_options(Vec::new());
        assert_eq!(field.selected_value(), "");
        assert_eq!(field.selected_label(), "");
        field.select_next();
        field.select_prev();
        field.apply_package("com.app.login");
        assert_eq!(field.choice().resolve(), "");
    }

    #[test]
    fn reconciliation_is_deterministic_first_match_wins() {
        let options = vec![
            PackageOption {
                value: "com.dup".into(),
                label: "First".into(),
            },
            PackageOption {
                value: "com.dup".into(),
                label: "Second".into(),
            },
            PackageOption {
                value: CUSTOM_VALUE.into(),
                label: "Custom…".into(),
            },
        ];
        let mut field = PackageField::with_options(options);
        field.apply_package("com.dup");
        assert_eq!(field.selected_label(), "First");
    }
}
