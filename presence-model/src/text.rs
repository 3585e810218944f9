//! Fixed-budget template rendering
//!
//! Substitutes `{field}` placeholders and, when the rendered result exceeds
//! its character budget, shrinks the field values proportionally to a fixed
//! per-field weight so that important fields (titles) keep more of their
//! text than incidental ones.

use std::collections::HashMap;

/// Appended to a value that had to be cut.
const ELLIPSIS: char = '…';

/// Inserted between adjacent placeholders during the measurement pass so
/// that consecutive numeric weights do not merge into one number. Never
/// appears in final output.
const WEIGHT_SEPARATOR: char = '\0';

/// Relative shrink resistance of a field. Template literals are expected to
/// stay digit-free; digits in literals would be counted into the weight sum.
fn field_weight(field: &str) -> u32 {
    match field {
        "title" | "xesam_title" => 4,
        "artist" | "albumartist" | "album" | "xesam_album" => 2,
        _ => 1,
    }
}

/// Substitute every `{field}` in `template`; unknown fields render empty.
fn render<F: Fn(&str) -> String>(template: &str, value_of: F) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut field = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                field.push(c);
            }
            out.push_str(&value_of(&field));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Render `template` against `values`, truncating field values so the
/// result fits `max_len` characters.
///
/// When the plain rendering fits, it is returned unchanged. Otherwise each
/// field value is shortened to `floor(weight * factor)` characters, where
/// `factor` distributes the budget left over by the template's literal
/// characters across the total weight in use.
pub fn format_budgeted(template: &str, values: &HashMap<String, String>, max_len: usize) -> String {
    let lookup = |field: &str| values.get(field).cloned().unwrap_or_default();

    let full = render(template, lookup);
    if full.chars().count() <= max_len {
        return full;
    }

    // Measurement pass: render weights in place of values and scan the
    // result for the weight sum and the literal (non-digit) character count.
    let spaced = template.replace("}{", "}\u{0}{");
    let weighted = render(&spaced, |field| field_weight(field).to_string());

    let mut total_weight = 0u64;
    let mut literal_chars = 0usize;
    let mut current = 0u64;
    let mut in_number = false;
    for ch in weighted.chars() {
        if let Some(digit) = ch.to_digit(10) {
            current = current * 10 + u64::from(digit);
            in_number = true;
        } else {
            if in_number {
                total_weight += current;
                current = 0;
                in_number = false;
            }
            if ch != WEIGHT_SEPARATOR {
                literal_chars += 1;
            }
        }
    }
    if in_number {
        total_weight += current;
    }

    if total_weight == 0 {
        // No placeholders at all; the literals alone overflow the budget.
        return shorten(&full, max_len);
    }

    let factor = max_len.saturating_sub(literal_chars) as f64 / total_weight as f64;
    render(template, |field| {
        let width = (f64::from(field_weight(field)) * factor).floor() as usize;
        shorten(&lookup(field), width)
    })
}

/// Whitespace-aware truncation to at most `max_width` characters.
///
/// Internal whitespace runs collapse to single spaces. When the collapsed
/// text still overflows, whole words are dropped from the end and a single
/// ellipsis marks the cut.
pub fn shorten(text: &str, max_width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= max_width {
        return collapsed;
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for word in &words {
        let word_len = word.chars().count();
        let space = usize::from(!out.is_empty());
        // reserve one character for the ellipsis
        if used + space + word_len + 1 > max_width {
            break;
        }
        if space == 1 {
            out.push(' ');
        }
        out.push_str(word);
        used += space + word_len;
    }
    out.push(ELLIPSIS);
    out
}
