//! Text cleanup and inline text collection.

use unicode_normalization::UnicodeNormalization;

use super::dom::DomNode;

/// Map a whitespace or dash code point to its ASCII equivalent.
///
/// `Some("")` drops the character, `None` keeps it unchanged.
fn ascii_equivalent(ch: char) -> Option<&'static str> {
    match ch {
        // nbsp, ensp, emsp, thinsp, narrow nbsp, figure space
        '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{202F}' | '\u{2007}' => Some(" "),
        // zero-width space, zero-width no-break space, soft hyphen
        '\u{200B}' | '\u{FEFF}' | '\u{00AD}' => Some(""),
        // figure dash, en dash, em dash, non-breaking hyphen
        '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2011}' => Some("-"),
        _ => None,
    }
}

/// Replace whitespace and dash entities with plain ASCII.
pub fn normalize_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ascii_equivalent(ch) {
            Some(rep) => out.push_str(rep),
            None => out.push(ch),
        }
    }
    out
}

/// Clean extracted text.
///
/// Entities are normalized, the text is NFC-normalized, whitespace runs
/// within a line collapse to one space, single newlines are kept and runs
/// of blank lines collapse to one. Leading and trailing blank lines are
/// removed.
pub fn clean_text(text: &str) -> String {
    let normalized: String = normalize_entities(text).nfc().collect();

    let mut lines: Vec<String> = Vec::new();
    for line in normalized.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Accumulates raw text with whitespace collapsed as it is appended.
///
/// Line breaks are not counted toward `limit`.
#[derive(Debug, Default)]
struct TextSink {
    out: String,
    chars: usize,
    limit: Option<usize>,
    pending_space: bool,
}

impl TextSink {
    fn is_full(&self) -> bool {
        self.limit.is_some_and(|max| self.chars > max)
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if self.is_full() {
                return;
            }
            if ch.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && !self.out.is_empty() && !self.out.ends_with('\n') {
                self.out.push(' ');
                self.chars += 1;
            }
            self.pending_space = false;
            self.out.push(ch);
            self.chars += 1;
        }
    }

    /// Explicit line break (`<br>`).
    fn hard_break(&mut self) {
        self.out.push('\n');
        self.pending_space = false;
    }

    /// Block boundary: a newline unless one is already there.
    fn soft_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.hard_break();
        }
    }

    fn separator(&mut self) {
        self.pending_space = true;
    }
}

enum Item<N> {
    Node(N),
    BlockEnd,
    CellEnd,
}

/// Collect the cleaned text of `nodes` and their descendants.
///
/// `<br>` is a line break and block elements sit on their own lines. Table
/// cells are separated by a space and rows by a newline, which flattens
/// nested tables. Elements for which `skip` returns true are left out.
pub fn collect_text<N, F>(nodes: &[N], skip: F) -> String
where
    N: DomNode,
    F: Fn(&N) -> bool,
{
    let (text, _) = collect(nodes, None, skip);
    text
}

/// Collect text like [`collect_text`], giving up past `limit` characters.
///
/// Returns `None` when the text is longer than `limit`. Only visible
/// characters count, so a title followed by a stack of `<br>`s is still
/// measured by the text that comes after them.
pub fn collect_text_within<N, F>(nodes: &[N], limit: usize, skip: F) -> Option<String>
where
    N: DomNode,
    F: Fn(&N) -> bool,
{
    match collect(nodes, Some(limit), skip) {
        (text, false) => Some(text),
        (_, true) => None,
    }
}

/// Collected text and whether collection stopped at the limit.
fn collect<N, F>(nodes: &[N], limit: Option<usize>, skip: F) -> (String, bool)
where
    N: DomNode,
    F: Fn(&N) -> bool,
{
    let mut sink = TextSink {
        limit,
        ..Default::default()
    };
    let mut stack: Vec<Item<N>> = nodes.iter().rev().map(|&n| Item::Node(n)).collect();

    while let Some(item) = stack.pop() {
        if sink.is_full() {
            break;
        }
        let node = match item {
            Item::Node(node) => node,
            Item::BlockEnd => {
                sink.soft_break();
                continue;
            }
            Item::CellEnd => {
                sink.separator();
                continue;
            }
        };

        if let Some(text) = node.text() {
            sink.push_text(text);
            continue;
        }
        let Some(tag) = node.tag_name() else {
            continue;
        };
        if skip(&node) {
            continue;
        }

        match tag {
            "br" => {
                sink.hard_break();
                continue;
            }
            "td" | "th" => {
                sink.separator();
                stack.push(Item::CellEnd);
            }
            _ if node.is_block() => {
                sink.soft_break();
                stack.push(Item::BlockEnd);
            }
            _ => {}
        }
        stack.extend(node.children().into_iter().rev().map(Item::Node));
    }

    (clean_text(&sink.out), sink.is_full())
}
