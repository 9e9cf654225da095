//! Core check trait and result types

use std::time::Duration;

use colored::Colorize;

use super::context::CheckContext;

/// Status of a diagnostic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckStatus {
    /// Check has not run yet
    Pending,
    /// No fail or warn messages were recorded
    Ok,
    /// Only warn messages were recorded
    Warning,
    /// At least one fail message was recorded
    Fail,
}

impl CheckStatus {
    /// Combined status of several checks: the worst one wins
    pub fn overall<I: IntoIterator<Item = CheckStatus>>(statuses: I) -> CheckStatus {
        statuses
            .into_iter()
            .filter(|s| *s != CheckStatus::Pending)
            .max()
            .unwrap_or(CheckStatus::Ok)
    }

    /// Icon shown in progress and summary lines
    pub fn icon(&self) -> String {
        match self {
            CheckStatus::Pending => "⏳".to_string(),
            CheckStatus::Ok => "✔".green().to_string(),
            CheckStatus::Warning => "⚠️".yellow().to_string(),
            CheckStatus::Fail => "❌".red().to_string(),
        }
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        match self {
            CheckStatus::Pending => "PENDING".dimmed().to_string(),
            CheckStatus::Ok => "OK".green().to_string(),
            CheckStatus::Warning => "WARNING".yellow().to_string(),
            CheckStatus::Fail => "FAIL".red().to_string(),
        }
    }
}

/// Severity of a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Fail,
    Warn,
}

impl MessageKind {
    pub fn icon(&self) -> String {
        match self {
            MessageKind::Fail => CheckStatus::Fail.icon(),
            MessageKind::Warn => CheckStatus::Warning.icon(),
        }
    }
}

/// One finding of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// Messages accumulated while a check body runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    messages: Vec<CheckMessage>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure
    pub fn fail(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Fail, text.into());
    }

    /// Records a warning
    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(MessageKind::Warn, text.into());
    }

    fn push(&mut self, kind: MessageKind, text: String) {
        self.messages.push(CheckMessage { kind, text });
    }

    pub fn messages(&self) -> &[CheckMessage] {
        &self.messages
    }

    /// Status implied by the recorded messages
    pub fn status(&self) -> CheckStatus {
        if self.messages.iter().any(|m| m.kind == MessageKind::Fail) {
            CheckStatus::Fail
        } else if self.messages.is_empty() {
            CheckStatus::Ok
        } else {
            CheckStatus::Warning
        }
    }

    pub fn into_messages(self) -> Vec<CheckMessage> {
        self.messages
    }
}

/// Outcome of one check
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Check label
    pub label: &'static str,
    /// Pending until the check has run
    pub status: CheckStatus,
    /// Fail and warn messages in the order they were recorded
    pub messages: Vec<CheckMessage>,
    /// How long the check took
    pub duration: Duration,
}

impl CheckResult {
    /// A result for a check that has not run yet
    pub fn pending(label: &'static str) -> Self {
        Self {
            label,
            status: CheckStatus::Pending,
            messages: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Records the findings of the (single) execution
    pub fn complete(&mut self, findings: Findings, duration: Duration) {
        debug_assert_eq!(self.status, CheckStatus::Pending, "check ran twice");
        self.status = findings.status();
        self.messages = findings.into_messages();
        self.duration = duration;
    }

    /// Messages of the given kind
    pub fn messages_of(&self, kind: MessageKind) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.kind == kind)
            .map(|m| m.text.as_str())
    }
}

/// Trait for diagnostic checks
pub trait SystemCheck {
    /// Label printed in progress and summary lines
    fn name(&self) -> &'static str;

    /// Perform the check.
    ///
    /// Must not panic on missing data; missing inputs become fail messages.
    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&'static str> {
        None
    }
}
