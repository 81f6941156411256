//! Plain-text cleanup and word counting for extracted articles.

/// Normalize extracted text.
///
/// Line endings become `\n`, control characters other than newline and tab
/// are dropped, runs of other whitespace collapse to one space, lines are
/// trimmed, and blank-line runs are capped at one empty line. Idempotent.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let stripped: String = unified
        .chars()
        .filter(|&c| !is_stripped_control(c))
        .collect();

    let mut lines: Vec<String> = stripped.split('\n').map(collapse_line).collect();

    // Cap runs of empty lines at one, i.e. at most two consecutive '\n'.
    lines.dedup_by(|next, prev| next.is_empty() && prev.is_empty());

    lines.join("\n").trim().to_string()
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

fn collapse_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count words in mixed CJK/Latin text.
///
/// Every CJK ideograph counts as one word and every maximal run of Latin
/// letters counts as one word. Digits, punctuation and whitespace are ignored.
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_latin_run = false;

    for c in text.chars() {
        if is_cjk_ideograph(c) {
            count += 1;
            in_latin_run = false;
        } else if is_latin_letter(c) {
            if !in_latin_run {
                count += 1;
                in_latin_run = true;
            }
        } else {
            in_latin_run = false;
        }
    }

    count
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c,
        '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
            | '\u{3400}'..='\u{4DBF}' // Extension A
            | '\u{F900}'..='\u{FAFF}' // Compatibility Ideographs
    )
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (('\u{00C0}'..='\u{024F}').contains(&c) && c.is_alphabetic())
}
