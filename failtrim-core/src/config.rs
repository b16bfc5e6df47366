// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for failtrim.
//!
//! Configuration is read from `.config/failtrim.toml`, layered on top of the defaults embedded
//! in this crate (see `default-config.toml`).

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    identity::LibraryPathMatcher,
    ledger::{LedgerScope, RunLedger},
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, File, FileFormat};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::{collections::BTreeSet, num::NonZeroUsize};
use tracing::warn;

/// Overall configuration for failtrim.
#[derive(Clone, Debug)]
pub struct TrimConfig {
    report: ReportConfig,
    library_paths: LibraryPathMatcher,
}

impl TrimConfig {
    /// The default location of the config within a workspace.
    pub const CONFIG_PATH: &'static str = ".config/failtrim.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from `.config/failtrim.toml`
    /// in the workspace root.
    ///
    /// If no config file is specified and the workspace doesn't have `.config/failtrim.toml`,
    /// the default config is used. Unknown keys are reported as warnings.
    pub fn from_sources(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(workspace_root, config_file, |config_file, unknown| {
            let mut unknown_str = String::new();
            for ignored_key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(ignored_key);
            }
            warn!("ignoring unknown configuration keys in config file {config_file}:{unknown_str}");
        })
    }

    // A custom unknown_callback can be passed in while testing.
    fn from_sources_impl(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let workspace_root = workspace_root.into();
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (deserialized, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(config_file.clone(), kind))?;
        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        deserialized
            .into_config()
            .map_err(|kind| ConfigParseError::new(config_file, kind))
    }

    /// Returns settings for the final report.
    pub fn report(&self) -> &ReportConfig {
        &self.report
    }

    /// Replaces the report settings.
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    /// Returns the classifier used to recognize library frames.
    pub fn frame_classifier(&self) -> &LibraryPathMatcher {
        &self.library_paths
    }

    /// Creates an empty ledger with the configured scope.
    pub fn new_ledger(&self) -> RunLedger {
        RunLedger::new(self.report.ledger_scope)
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(TrimConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: TrimConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // serde_path_to_error already reports the key, so drop it from the config error.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

impl Default for TrimConfig {
    /// Returns a config equivalent to the embedded default config.
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            library_paths: LibraryPathMatcher::new(GlobSet::empty()),
        }
    }
}

/// Settings that control the final report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportConfig {
    separator_width: NonZeroUsize,
    ledger_scope: LedgerScope,
    show_captured_output: bool,
}

impl ReportConfig {
    /// The separator width used by the default config.
    pub const DEFAULT_SEPARATOR_WIDTH: NonZeroUsize =
        NonZeroUsize::new(70).expect("70 is non-zero");

    /// Returns the width of separator lines.
    pub fn separator_width(&self) -> usize {
        self.separator_width.get()
    }

    /// Returns whether errors and failures share an occurrence ledger.
    pub fn ledger_scope(&self) -> LedgerScope {
        self.ledger_scope
    }

    /// Returns whether captured output is printed below recorded failures.
    pub fn show_captured_output(&self) -> bool {
        self.show_captured_output
    }

    /// Sets the separator width.
    pub fn with_separator_width(mut self, separator_width: NonZeroUsize) -> Self {
        self.separator_width = separator_width;
        self
    }

    /// Sets the ledger scope.
    pub fn with_ledger_scope(mut self, ledger_scope: LedgerScope) -> Self {
        self.ledger_scope = ledger_scope;
        self
    }

    /// Sets whether captured output is printed.
    pub fn with_show_captured_output(mut self, show_captured_output: bool) -> Self {
        self.show_captured_output = show_captured_output;
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            separator_width: Self::DEFAULT_SEPARATOR_WIDTH,
            ledger_scope: LedgerScope::Shared,
            show_captured_output: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TrimConfigDeserialize {
    report: ReportDeserialize,
    frames: FramesDeserialize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportDeserialize {
    separator_width: usize,
    ledger_scope: LedgerScope,
    show_captured_output: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FramesDeserialize {
    library_paths: Vec<String>,
}

impl TrimConfigDeserialize {
    fn into_config(self) -> Result<TrimConfig, ConfigParseErrorKind> {
        let separator_width = NonZeroUsize::new(self.report.separator_width)
            .ok_or(ConfigParseErrorKind::InvalidSeparatorWidth)?;

        let mut builder = GlobSetBuilder::new();
        for pattern in self.frames.library_paths {
            let glob = Glob::new(&pattern)
                .map_err(|err| ConfigParseErrorKind::InvalidLibraryPath { pattern, err })?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|err| ConfigParseErrorKind::InvalidLibraryPath {
                pattern: String::new(),
                err,
            })?;

        Ok(TrimConfig {
            report: ReportConfig {
                separator_width,
                ledger_scope: self.report.ledger_scope,
                show_captured_output: self.report.show_captured_output,
            },
            library_paths: LibraryPathMatcher::new(globs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FrameClassifier;
    use camino_tempfile::Utf8TempDir;
    use failtrim_metadata::StackFrame;
    use indoc::indoc;

    fn write_config(contents: &str) -> Utf8TempDir {
        let dir = camino_tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("failtrim.toml"), contents).unwrap();
        dir
    }

    fn read_config(dir: &Utf8TempDir) -> (Result<TrimConfig, ConfigParseError>, BTreeSet<String>) {
        let mut unknown_keys = BTreeSet::new();
        let config = TrimConfig::from_sources_impl(dir.path(), None, |_, unknown| {
            unknown_keys.extend(unknown.iter().cloned());
        });
        (config, unknown_keys)
    }

    #[test]
    fn test_default_config_matches_default_impl() {
        let dir = camino_tempfile::tempdir().unwrap();
        let (config, unknown) = read_config(&dir);
        let config = config.expect("default config is always valid");
        assert!(unknown.is_empty(), "default config has unknown keys: {unknown:?}");
        assert_eq!(config.report(), TrimConfig::default().report());
        assert!(config.frame_classifier().is_empty());
    }

    #[test]
    fn test_overrides() {
        let dir = write_config(indoc! {r#"
            [report]
            separator-width = 40
            ledger-scope = "per-bucket"

            [frames]
            library-paths = ["**/unittest/**"]
        "#});
        let (config, unknown) = read_config(&dir);
        let config = config.expect("config is valid");
        assert!(unknown.is_empty());

        let report = config.report();
        assert_eq!(report.separator_width(), 40);
        assert_eq!(report.ledger_scope(), LedgerScope::PerBucket);
        assert!(report.show_captured_output(), "default is preserved");
        assert_eq!(config.new_ledger().scope(), LedgerScope::PerBucket);

        let classifier = config.frame_classifier();
        assert!(classifier.is_library_frame(&StackFrame::new("lib/unittest/case.py", 1)));
        assert!(!classifier.is_library_frame(&StackFrame::new("app/module_a.py", 1)));
    }

    #[test]
    fn test_unknown_keys() {
        let dir = write_config(indoc! {r#"
            [report]
            separator-widht = 40
        "#});
        let (config, unknown) = read_config(&dir);
        config.expect("unknown keys are not an error");
        assert_eq!(
            unknown,
            BTreeSet::from(["report.separator-widht".to_owned()])
        );
    }

    #[test]
    fn test_invalid_separator_width() {
        let dir = write_config(indoc! {r#"
            [report]
            separator-width = 0
        "#});
        let (config, _) = read_config(&dir);
        let error = config.expect_err("zero width is invalid");
        assert!(matches!(
            error.kind(),
            ConfigParseErrorKind::InvalidSeparatorWidth
        ));
        assert_eq!(
            error.config_file(),
            dir.path().join(TrimConfig::CONFIG_PATH).as_path()
        );
    }

    #[test]
    fn test_invalid_library_path() {
        let dir = write_config(indoc! {r#"
            [frames]
            library-paths = ["unittest/[case.py"]
        "#});
        let (config, _) = read_config(&dir);
        let error = config.expect_err("unclosed character class is invalid");
        match error.kind() {
            ConfigParseErrorKind::InvalidLibraryPath { pattern, .. } => {
                assert_eq!(pattern, "unittest/[case.py");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_ledger_scope() {
        let dir = write_config(indoc! {r#"
            [report]
            ledger-scope = "global"
        "#});
        let (config, _) = read_config(&dir);
        let error = config.expect_err("unknown scope is invalid");
        assert!(matches!(
            error.kind(),
            ConfigParseErrorKind::DeserializeError(_)
        ));
    }

    #[test]
    fn test_explicit_config_file_is_required() {
        let dir = camino_tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let error = TrimConfig::from_sources(dir.path(), Some(&missing))
            .expect_err("explicit config file must exist");
        assert_eq!(error.config_file(), missing.as_path());
        assert!(matches!(error.kind(), ConfigParseErrorKind::BuildError(_)));
    }

    #[test]
    fn test_report_config_builders() {
        let report = ReportConfig::default();
        assert_eq!(
            report.separator_width(),
            ReportConfig::DEFAULT_SEPARATOR_WIDTH.get()
        );

        let report = report
            .with_separator_width(NonZeroUsize::new(40).unwrap())
            .with_ledger_scope(LedgerScope::PerBucket)
            .with_show_captured_output(false);
        assert_eq!(report.separator_width(), 40);
        assert_eq!(report.ledger_scope(), LedgerScope::PerBucket);
        assert!(!report.show_captured_output());
    }
}
