//! Formatted output helpers for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use metasuite_config::record::PackageRecord;

/// A horizontal rule of `width` box-drawing characters.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// `KEY=VALUE` lines, indented by `indent` spaces. Multi-line values are
/// continued on following lines at the same indent.
#[must_use]
pub fn format_vars(vars: &BTreeMap<String, String>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let mut out = String::new();
    for (key, value) in vars {
        let value = value.replace('\n', &format!("\n{pad}  "));
        let _ = writeln!(out, "{pad}{key}={value}");
    }
    out
}

/// Plan-style listing of one resolved package.
#[must_use]
pub fn format_record(record: &PackageRecord) -> String {
    let mut out = format!("  + {} {}\n", record.package, record.version);
    out.push_str(&format_vars(&record.params, 6));
    if !record.actions.is_empty() {
        out.push_str("      actions:\n");
        for (n, action) in record.actions.iter().enumerate() {
            let _ = writeln!(out, "        {}. {action}", n + 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_has_requested_width() {
        assert_eq!(rule(3), "\u{2550}\u{2550}\u{2550}");
    }

    #[test]
    fn format_vars_indents_and_continues() {
        let vars: BTreeMap<String, String> = [
            ("b".to_owned(), "2".to_owned()),
            ("a".to_owned(), "x\ny".to_owned()),
        ]
        .into_iter()
        .collect();
        assert_eq!(format_vars(&vars, 2), "  a=x\n    y\n  b=2\n");
    }

    #[test]
    fn format_record_lists_actions_in_order() {
        let record = PackageRecord {
            package: "zlib".into(),
            version: "1.2.8".into(),
            suite: "s".into(),
            tags: Vec::new(),
            params: [("prefix".to_owned(), "/opt".to_owned())].into_iter().collect(),
            actions: vec!["fetch".into(), "make".into()],
        };
        assert_eq!(
            format_record(&record),
            "  + zlib 1.2.8\n      prefix=/opt\n      actions:\n        1. fetch\n        2. make\n"
        );
    }
}
