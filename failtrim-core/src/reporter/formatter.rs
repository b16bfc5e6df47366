// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::helpers::{DisplayBanner, DisplaySeparator, Styles};
use crate::{
    collector::RecordedEntry,
    config::ReportConfig,
    errors::ReportError,
    ledger::RunLedger,
    write_str::WriteStr,
};
use failtrim_metadata::FailureKind;
use owo_colors::OwoColorize;
use std::{cmp::Ordering, num::NonZeroUsize};

/// Renders recorded failures into the final report.
///
/// Each bucket is printed separately, failures before errors. Within a bucket, entries are
/// ordered by their final occurrence count (ascending), then by description. Entries that
/// occurred more than once are followed by a `+ N more` block.
#[derive(Clone, Debug)]
pub struct ReportFormatter {
    separator_width: usize,
    show_captured_output: bool,
    styles: Styles,
}

impl ReportFormatter {
    /// Creates a new formatter from the given report settings.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            separator_width: config.separator_width(),
            show_captured_output: config.show_captured_output(),
            styles: Styles::default(),
        }
    }

    /// Colorizes the output.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Renders the report into a string.
    pub fn render(
        &self,
        errors: &[RecordedEntry],
        failures: &[RecordedEntry],
        ledger: &RunLedger,
    ) -> Result<String, ReportError> {
        let mut out = String::new();
        self.write_report(errors, failures, ledger, &mut out)?;
        Ok(out)
    }

    /// Writes the report to the given writer.
    pub fn write_report(
        &self,
        errors: &[RecordedEntry],
        failures: &[RecordedEntry],
        ledger: &RunLedger,
        writer: &mut dyn WriteStr,
    ) -> Result<(), ReportError> {
        for kind in FailureKind::REPORT_ORDER {
            let bucket = match kind {
                FailureKind::Error => errors,
                FailureKind::Failure => failures,
            };
            for (count, entry) in sorted_with_counts(kind, bucket, ledger)? {
                self.write_entry(kind, count, entry, writer)
                    .map_err(ReportError::Write)?;
            }
        }
        writer.write_str_flush().map_err(ReportError::Write)
    }

    // ---
    // Helper methods
    // ---

    fn write_entry(
        &self,
        kind: FailureKind,
        count: NonZeroUsize,
        entry: &RecordedEntry,
        writer: &mut dyn WriteStr,
    ) -> std::io::Result<()> {
        let primary = DisplaySeparator {
            ch: '=',
            width: self.separator_width,
        };
        let secondary = DisplaySeparator {
            ch: '-',
            width: self.separator_width,
        };
        let flavor_style = match kind {
            FailureKind::Error => self.styles.error,
            FailureKind::Failure => self.styles.fail,
        };

        writeln!(writer, "{primary}")?;
        writeln!(
            writer,
            "{}: {}",
            kind.label().style(flavor_style),
            entry.description
        )?;
        writeln!(writer, "{secondary}")?;
        writeln!(writer, "{}", entry.rendered_trace)?;

        let more = count.get() - 1;
        if more > 0 {
            writeln!(writer, "{secondary}")?;
            writeln!(writer, "+ {} more", more.style(self.styles.count))?;
            writeln!(writer, "{secondary}")?;
            writeln!(writer)?;
        }

        if self.show_captured_output
            && let Some(captured) = entry.captured_output.as_deref().filter(|s| !s.is_empty())
        {
            let width = self.separator_width;
            writeln!(
                writer,
                "{}",
                DisplayBanner {
                    label: ">> begin captured stdout <<",
                    width,
                }
            )?;
            writeln!(writer, "{captured}")?;
            writeln!(
                writer,
                "{}",
                DisplayBanner {
                    label: ">> end captured stdout <<",
                    width,
                }
            )?;
        }

        Ok(())
    }
}

/// Joins each entry with its final count and sorts by (count, description).
///
/// The sort is stable, so entries that tie on both keys keep the order they were recorded in.
fn sorted_with_counts<'a>(
    kind: FailureKind,
    bucket: &'a [RecordedEntry],
    ledger: &RunLedger,
) -> Result<Vec<(NonZeroUsize, &'a RecordedEntry)>, ReportError> {
    let mut joined = bucket
        .iter()
        .map(|entry| {
            let count = ledger.count_of(kind, &entry.identity).map_err(|err| {
                ReportError::MissingCount {
                    test_id: entry.test_id.clone(),
                    err,
                }
            })?;
            Ok((count, entry))
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    joined.sort_by(|(a_count, a), (b_count, b)| compare_entries(*a_count, a, *b_count, b));
    Ok(joined)
}

fn compare_entries(
    a_count: NonZeroUsize,
    a: &RecordedEntry,
    b_count: NonZeroUsize,
    b: &RecordedEntry,
) -> Ordering {
    a_count
        .cmp(&b_count)
        .then_with(|| a.description.cmp(&b.description))
}
