use std::cmp::Ordering;

use crate::LabelPair;

pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub fn escape_label_value(buf: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '"' => buf.push_str("\\\""),
            '\n' => buf.push_str("\\n"),
            c => buf.push(c),
        }
    }
}

pub fn unescape_label_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Walks two sorted label slices as a single sorted sequence with unique names.
/// On equal names the label from `b` replaces the one from `a`.
pub fn merge_labels<'a>(a: &'a [LabelPair], b: &'a [LabelPair]) -> impl Iterator<Item = &'a LabelPair> {
    let mut a = a.iter().peekable();
    let mut b = b.iter().peekable();
    std::iter::from_fn(move || match (a.peek(), b.peek()) {
        (Some(x), Some(y)) => match x.name.cmp(&y.name) {
            Ordering::Less => a.next(),
            Ordering::Greater => b.next(),
            Ordering::Equal => {
                a.next();
                b.next()
            }
        },
        (Some(_), None) => a.next(),
        (None, Some(_)) => b.next(),
        (None, None) => None,
    })
}

/// Renders `{name="value",...}`, or nothing when there are no labels.
pub fn render_label_values<'a, I>(buf: &mut String, labels: I)
where
    I: IntoIterator<Item = &'a LabelPair>,
{
    let mut first = true;
    for pair in labels {
        buf.push(if first { '{' } else { ',' });
        first = false;
        buf.push_str(&pair.name);
        buf.push_str("=\"");
        escape_label_value(buf, &pair.value);
        buf.push('"');
    }

    if !first {
        buf.push('}');
    }
}
