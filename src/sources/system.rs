//! System property source: process environment and `-Dkey=value` arguments.

use super::PropertySource;
use crate::error::Result;
use std::collections::HashMap;

/// System properties that take precedence over every file-backed value.
///
/// Values come from environment variables sharing a prefix, from
/// `-Dkey=value` style arguments, or from explicit pairs. Keys keep their case.
///
/// # Examples
///
/// ```rust
/// use harness_config::sources::{PropertySource, SystemSource};
///
/// // HARNESS_Environment=CloudStage -> Environment = CloudStage
/// let from_env = SystemSource::from_env("HARNESS_");
///
/// let from_args = SystemSource::from_args(["-DEnvironment=CloudStage", "--quiet"]);
/// assert_eq!(from_args.load().unwrap()["Environment"], "CloudStage");
/// ```
#[derive(Debug, Clone)]
pub struct SystemSource {
    kind: Kind,
    priority: i32,
}

#[derive(Debug, Clone)]
enum Kind {
    Env { prefix: String },
    Fixed { label: &'static str, values: HashMap<String, String> },
}

impl SystemSource {
    /// Read environment variables starting with `prefix`, with the prefix stripped.
    ///
    /// Variables are read when [`PropertySource::load`] is called.
    pub fn from_env(prefix: impl Into<String>) -> Self {
        Self {
            kind: Kind::Env {
                prefix: prefix.into(),
            },
            priority: 300,
        }
    }

    /// Collect `-Dkey=value` arguments; anything else is ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = args
            .into_iter()
            .filter_map(|arg| parse_define(arg.as_ref()))
            .collect();
        Self::fixed("args", values)
    }

    /// Use explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::fixed("pairs", values)
    }

    fn fixed(label: &'static str, values: HashMap<String, String>) -> Self {
        Self {
            kind: Kind::Fixed { label, values },
            priority: 300,
        }
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

fn parse_define(arg: &str) -> Option<(String, String)> {
    let body = arg.strip_prefix("-D")?;
    let (key, value) = body.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

impl PropertySource for SystemSource {
    fn load(&self) -> Result<HashMap<String, String>> {
        match &self.kind {
            // Non-UTF-8 variables are skipped.
            Kind::Env { prefix } => Ok(std::env::vars_os()
                .filter_map(|(name, value)| {
                    let name = name.into_string().ok()?;
                    let value = value.into_string().ok()?;
                    let key = name.strip_prefix(prefix.as_str())?;
                    (!key.is_empty()).then(|| (key.to_string(), value))
                })
                .collect()),
            Kind::Fixed { values, .. } => Ok(values.clone()),
        }
    }

    fn name(&self) -> String {
        match &self.kind {
            Kind::Env { prefix } => format!("env:{}*", prefix),
            Kind::Fixed { label, .. } => format!("system:{}", label),
        }
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
