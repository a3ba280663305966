//! Prometheus text exposition format.
//!
//! Renders gathered gauge families into the text format (version 0.0.4)
//! scraped by a Prometheus server or compatible agent.

use std::fmt::Write;

use crate::registry::FamilySnapshot;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render gauge families into Prometheus text format.
///
/// Every family gets its HELP and TYPE lines, even with no samples.
pub fn render_prometheus(families: &[FamilySnapshot]) -> String {
    let mut out = String::new();

    for family in families {
        let name = family.desc.name;
        let _ = writeln!(out, "# HELP {name} {}", escape_help(family.desc.help));
        let _ = writeln!(out, "# TYPE {name} gauge");

        for (labels, value) in &family.samples {
            out.push_str(name);
            out.push('{');
            for (i, (key, val)) in labels.pairs().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{key}=\"{}\"", escape_label_value(val));
            }
            out.push_str("} ");
            out.push_str(&format_value(*value));
            out.push('\n');
        }
    }

    out
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
