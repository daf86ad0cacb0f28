//! Date pattern translation and drawtext text escaping.
//!
//! Patterns use the custom date/time letters users already know from
//! spreadsheet and .NET formatting (`yyyy-MM-dd hh:mm tt`). FFmpeg's
//! `%{pts:gmtime:...}` expansion wants strftime, so runs of identical
//! letters are mapped through a fixed table.

use tracing::{debug, trace};

/// strftime equivalent of a run of identical pattern characters.
///
/// Only exact runs are matched: `yyy` has no entry and stays literal.
pub fn strftime_token(run: &str) -> Option<&'static str> {
    let token = match run {
        "yyyy" => "%Y",
        "yy" => "%y",
        "MMMM" => "%B",
        "MMM" => "%b",
        "MM" => "%m",
        "M" => "%#m",
        "dddd" => "%A",
        "ddd" => "%a",
        "dd" => "%d",
        "d" => "%#d",
        "HH" => "%H",
        "H" => "%#H",
        "hh" => "%I",
        "h" => "%#I",
        "mm" => "%M",
        "m" => "%#M",
        "ss" => "%S",
        "s" => "%#S",
        "tt" => "%p",
        _ => return None,
    };
    Some(token)
}

/// Translate a custom date/time pattern into strftime tokens.
///
/// The pattern is scanned left to right in maximal runs of the same
/// character. Runs without a table entry are copied verbatim.
pub fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut run = String::new();
    let mut last: Option<char> = None;

    for c in pattern.chars() {
        if last == Some(c) {
            run.push(c);
            continue;
        }
        flush_run(&run, &mut out);
        run.clear();
        run.push(c);
        last = Some(c);
    }
    flush_run(&run, &mut out);

    debug!(pattern = %pattern, strftime = %out, "Translated date pattern");
    out
}

fn flush_run(run: &str, out: &mut String) {
    if run.is_empty() {
        return;
    }
    match strftime_token(run) {
        Some(token) => {
            trace!(run = %run, token = token, "Date token matched");
            out.push_str(token);
        }
        None => {
            trace!(run = %run, "No date token, keeping literal");
            out.push_str(run);
        }
    }
}

/// Escape literal text for a single-quoted `drawtext` value.
///
/// Each source character is mapped once, so backslashes introduced for one
/// character are never escaped again by a later rule.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\\\\\"),
            ':' => out.push_str("\\\\\\:"),
            ',' => out.push_str("\\\\,"),
            '/' => out.push_str("\\\\/"),
            _ => out.push(c),
        }
    }
    out
}

/// Split text into non-empty lines on `\r\n`, `\n` or `\r`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect()
}
