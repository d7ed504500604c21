//! Console front-end for resolver progress.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use indicatif::ProgressBar;
use sdm_resolver::{ResolveEvent, Reporter};
use sdm_util::errors::SdmError;
use sdm_util::progress;

/// How console messages are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Coloured status labels and a spinner.
    #[default]
    Human,
    /// `note:`/`warning:`/`error:` lines that IDE build logs pick up.
    Xcode,
}

impl FromStr for OutputFormat {
    type Err = SdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "xcode" => Ok(Self::Xcode),
            other => Err(SdmError::Config {
                message: format!("unknown output format '{other}' (expected human or xcode)"),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => f.write_str("human"),
            Self::Xcode => f.write_str("xcode"),
        }
    }
}

/// Prints resolver events and operation status to stderr.
#[derive(Debug)]
pub struct ConsoleReporter {
    format: OutputFormat,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            spinner: Mutex::new(None),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// A status line such as `   Installing libA 1.2.0`.
    pub fn status(&self, label: &str, message: &str) {
        match self.format {
            OutputFormat::Human => self.above_spinner(|| progress::status(label, message)),
            OutputFormat::Xcode => progress::ide_line("note", &format!("{label} {message}")),
        }
    }

    /// Like [`ConsoleReporter::status`] for messages that report no change.
    pub fn info(&self, label: &str, message: &str) {
        match self.format {
            OutputFormat::Human => self.above_spinner(|| progress::status_info(label, message)),
            OutputFormat::Xcode => progress::ide_line("note", &format!("{label} {message}")),
        }
    }

    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Human => self.above_spinner(|| progress::status_warn("warning", message)),
            OutputFormat::Xcode => progress::ide_line("warning", message),
        }
    }

    /// Stop any spinner after a failure. In xcode format the failure is also
    /// printed as an `error:` line.
    pub fn fail(&self, message: &str) {
        self.finish_spinner();
        if self.format == OutputFormat::Xcode {
            progress::ide_line("error", message);
        }
    }

    fn above_spinner(&self, print: impl FnOnce()) {
        let spinner = self.spinner.lock().ok().and_then(|guard| guard.clone());
        match spinner {
            Some(pb) => pb.suspend(print),
            None => print(),
        }
    }

    fn start_spinner(&self, message: &str) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(old) = guard.replace(progress::spinner(message)) {
                old.finish_and_clear();
            }
        }
    }

    fn spinner_message(&self, message: String) {
        if let Ok(guard) = self.spinner.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message);
            }
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: ResolveEvent<'_>) {
        match (self.format, event) {
            (
                OutputFormat::Human,
                ResolveEvent::Started {
                    package,
                    dependencies,
                },
            ) => self.start_spinner(&format!(
                "Resolving {dependencies} direct dependencies of {package}..."
            )),
            (OutputFormat::Human, ResolveEvent::Resolving { dependency }) => {
                self.spinner_message(format!("Resolving {} ({})", dependency.name, dependency.version))
            }
            (OutputFormat::Human, ResolveEvent::Resolved { node }) => {
                self.status("Resolved", &node.to_string())
            }
            (OutputFormat::Human, ResolveEvent::Finished { packages }) => {
                self.finish_spinner();
                self.status("Finished", &format!("{packages} packages resolved"));
            }
            (OutputFormat::Xcode, ResolveEvent::Started { package, .. }) => {
                progress::ide_line("note", &format!("resolving dependencies of {package}"))
            }
            (OutputFormat::Xcode, ResolveEvent::Resolved { node }) => {
                progress::ide_line("note", &format!("resolved {node}"))
            }
            (OutputFormat::Xcode, ResolveEvent::Finished { packages }) => {
                progress::ide_line("note", &format!("{packages} packages resolved"))
            }
            (_, ResolveEvent::Reused { node, requested_by }) => {
                tracing::trace!("{node} reused for {requested_by}");
            }
            (OutputFormat::Xcode, ResolveEvent::Resolving { .. }) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("xcode".parse::<OutputFormat>().unwrap(), OutputFormat::Xcode);
        assert!("json".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Xcode.to_string(), "xcode");
    }

    #[test]
    fn spinner_lifecycle() {
        let reporter = ConsoleReporter::new(OutputFormat::Human);
        reporter.report(ResolveEvent::Started {
            package: "app",
            dependencies: 2,
        });
        assert!(reporter.spinner.lock().unwrap().is_some());
        reporter.report(ResolveEvent::Finished { packages: 2 });
        assert!(reporter.spinner.lock().unwrap().is_none());

        reporter.start_spinner("again");
        reporter.fail("boom");
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
