// The parameter bundle a build step hands to the launcher.
// The launcher never parses configuration files; whoever hosts the step
// (the CLI in `commands::execute`, or a test) fills this struct in.

/// Inputs of one `execute` build step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepConfig {
    /// Katalon Studio version to fetch, compared to manifest entries by equality.
    pub version: String,
    /// Pre-installed package root. When set and non-blank, nothing is downloaded.
    pub location: Option<String>,
    /// Katalon project handed over as `-projectPath=<path>`.
    pub project_path: String,
    /// Raw extra arguments for Katalon Studio (e.g. `-retry=0 -testSuitePath="Test Suites/Smoke"`).
    pub execute_args: String,
    /// X display for headless Unix agents (e.g. `:99`).
    pub x11_display: Option<String>,
    /// Options for `xvfb-run` (e.g. `-a -s "-screen 0 1024x768x24"`).
    pub xvfb_configuration: Option<String>,
}

impl StepConfig {
    /// The override location, if one was given and is not blank.
    pub fn override_location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn x11_display(&self) -> Option<&str> {
        non_blank(self.x11_display.as_deref())
    }

    pub fn xvfb_configuration(&self) -> Option<&str> {
        non_blank(self.xvfb_configuration.as_deref())
    }
}

/// `None` for missing, empty or whitespace-only values. Other values pass through untouched.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
