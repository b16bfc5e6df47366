// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;
use std::fmt;

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) count: Style,
    pub(super) fail: Style,
    pub(super) error: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.fail = Style::new().red().bold();
        self.error = Style::new().magenta().bold();
    }
}

/// A separator line made of `width` copies of `ch`.
pub(super) struct DisplaySeparator {
    pub(super) ch: char,
    pub(super) width: usize,
}

impl fmt::Display for DisplaySeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.width {
            write!(f, "{}", self.ch)?;
        }
        Ok(())
    }
}

/// A label centered within a line of dashes, e.g. `----- >> begin captured stdout << -----`.
pub(super) struct DisplayBanner<'a> {
    pub(super) label: &'a str,
    pub(super) width: usize,
}

impl fmt::Display for DisplayBanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_len = self.label.chars().count();
        // One space on either side of the label.
        let chunk = self.width.saturating_sub(label_len + 2) / 2;
        let dashes = DisplaySeparator {
            ch: '-',
            width: chunk,
        };
        write!(f, "{dashes} {} {dashes}", self.label)?;

        // Odd widths leave one column over, which goes at the end.
        let written = 2 * chunk + label_len + 2;
        let pad = DisplaySeparator {
            ch: '-',
            width: self.width.saturating_sub(written),
        };
        write!(f, "{pad}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator() {
        let sep = DisplaySeparator { ch: '=', width: 5 };
        assert_eq!(sep.to_string(), "=====");

        let sep = DisplaySeparator { ch: '-', width: 0 };
        assert_eq!(sep.to_string(), "");
    }

    #[test]
    fn test_banner() {
        let tests: &[(&str, usize, &str)] = &[
            ("ab", 10, "--- ab ---"),
            ("ab", 11, "--- ab ----"),
            ("abc", 11, "--- abc ---"),
            ("long label", 4, " long label "),
        ];

        for &(label, width, expected) in tests {
            let actual = DisplayBanner { label, width }.to_string();
            assert_eq!(actual, expected, "for label {label:?} and width {width}");
        }
    }

    #[test]
    fn test_banner_width() {
        let banner = DisplayBanner {
            label: ">> begin captured stdout <<",
            width: 70,
        }
        .to_string();
        assert_eq!(banner.len(), 70);
        assert!(banner.starts_with(&format!("{} >> begin", "-".repeat(20))));
        assert!(banner.ends_with(&format!("<< {}", "-".repeat(21))));
    }
}
