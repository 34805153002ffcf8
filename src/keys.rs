//! Property names shared with the browser, database and reporting layers.

use std::fmt;

/// Well-known property keys.
///
/// Any string works as a key; these are the names other parts of a harness
/// agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownKey {
    /// Active environment, e.g. `CloudStage`.
    Environment,
    /// Browser selection for the driver bootstrap.
    Browser,
    /// Tag expression of the scenarios to run.
    TagToRun,
    /// Database selector; mirrors the active environment.
    Database,
    /// Application base URL.
    GoogleUrl,
    /// Sauce Labs user name.
    SauceUsername,
    /// Sauce Labs access key.
    SauceKey,
    /// Tag recorded in run reports.
    TagName,
    /// Deployed build under test.
    DeploymentVersion,
    /// Run summary: scenario count.
    TotalTests,
    /// Run summary: passed scenarios.
    PassedTests,
    /// Run summary: skipped scenarios.
    SkippedTests,
    /// Run summary: failed scenarios.
    FailedTests,
    /// Run summary: overall status.
    BuildStatus,
}

impl WellKnownKey {
    /// Keys copied from the file store into system properties at startup.
    pub const STARTUP_DEFAULTS: [WellKnownKey; 3] = [Self::Environment, Self::TagToRun, Self::Browser];

    /// The property name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "Environment",
            Self::Browser => "Browser",
            Self::TagToRun => "tagToRun",
            Self::Database => "Database",
            Self::GoogleUrl => "GOOGLEURL",
            Self::SauceUsername => "SAUCE_USERNAME",
            Self::SauceKey => "SAUCE_KEY",
            Self::TagName => "TagName",
            Self::DeploymentVersion => "DeploymentVersion",
            Self::TotalTests => "TotalTests",
            Self::PassedTests => "PassedTests",
            Self::SkippedTests => "SkippedTests",
            Self::FailedTests => "FailedTests",
            Self::BuildStatus => "BuildStatus",
        }
    }
}

impl AsRef<str> for WellKnownKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WellKnownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
