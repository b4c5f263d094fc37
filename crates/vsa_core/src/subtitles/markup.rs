//! Override-block markup handling.
//!
//! Cue text is a sequence of plain runs and `{...}` override blocks, each
//! block holding `\tag` entries. Positioning tags (`\an`, `\a`, `\pos`,
//! `\move`, `\org`) are removed in one left-to-right pass; blocks left empty
//! disappear and adjacent kept blocks are fused. Stray `}` are dropped. A `{`
//! that is never closed is dropped and the text after it stays plain, so a
//! `{` inside an open block starts a new block.

/// Remove positioning tags and redundant markup from cue text.
pub fn strip_positioning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // tags of consecutive blocks waiting to be written as one block
    let mut pending = String::new();
    // body start of the block currently open
    let mut open: Option<usize> = None;
    let mut plain_start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                let from = open.unwrap_or(plain_start);
                push_plain(&mut out, &mut pending, &text[from..i]);
                open = Some(i + 1);
            }
            '}' => {
                match open.take() {
                    Some(body) => keep_non_positioning(&text[body..i], &mut pending),
                    None => push_plain(&mut out, &mut pending, &text[plain_start..i]),
                }
                plain_start = i + 1;
            }
            _ => {}
        }
    }

    let from = open.unwrap_or(plain_start);
    push_plain(&mut out, &mut pending, &text[from..]);
    flush_block(&mut out, &mut pending);

    out
}

/// The single directive placed in front of every projected cue.
pub fn alignment_directive(alignment: u8) -> String {
    format!("{{\\an{}}}", alignment)
}

/// Cleaned text prefixed with exactly one alignment directive.
pub fn with_alignment(text: &str, alignment: u8) -> String {
    let mut out = alignment_directive(alignment);
    out.push_str(&strip_positioning(text));
    out
}

/// Convert SubRip inline markup to ASS: `<i>`, `<b>`, `<u>`, `<s>` become
/// override tags, `<font>` is dropped and line breaks become `\N`.
pub fn srt_to_ass_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let Some(end) = tail.find('>') else {
            out.push_str(tail);
            rest = "";
            break;
        };

        let tag = tail[1..end].trim().to_ascii_lowercase();
        let (closing, name) = match tag.strip_prefix('/') {
            Some(n) => (true, n.trim()),
            None => (false, tag.as_str()),
        };
        let name = name.split_whitespace().next().unwrap_or("");

        match name {
            "i" | "b" | "u" | "s" => {
                out.push_str(&format!("{{\\{}{}}}", name, if closing { 0 } else { 1 }));
            }
            "font" => {}
            _ => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);

    out.replace("\r\n", "\n").replace('\n', "\\N")
}

fn push_plain(out: &mut String, pending: &mut String, plain: &str) {
    if plain.is_empty() {
        return;
    }
    flush_block(out, pending);
    out.push_str(plain);
}

fn flush_block(out: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    out.push('{');
    out.push_str(pending);
    out.push('}');
    pending.clear();
}

/// Append the non-positioning content of one block body to `pending`.
fn keep_non_positioning(body: &str, pending: &mut String) {
    let (comment, tags) = match body.find('\\') {
        Some(pos) => body.split_at(pos),
        None => (body, ""),
    };
    let comment = comment.trim();
    if !comment.is_empty() {
        pending.push_str(comment);
    }

    for tag in split_tags(tags) {
        if !is_positioning(tag) {
            pending.push_str(tag);
        }
    }
}

/// Split `\a\b(\c)` into `\a`, `\b(\c)`; backslashes inside parentheses
/// belong to the enclosing tag.
fn split_tags(tags: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in tags.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '\\' if depth == 0 && i > start => {
                result.push(&tags[start..i]);
                start = i;
            }
            _ => {}
        }
    }
    if start < tags.len() {
        result.push(&tags[start..]);
    }
    result
}

fn is_positioning(tag: &str) -> bool {
    let name = tag.trim_start_matches('\\').trim_start();
    let digit_after = |prefix: &str| {
        name.strip_prefix(prefix)
            .and_then(|r| r.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    };

    digit_after("an")
        || digit_after("a")
        || name.starts_with("pos(")
        || name.starts_with("move(")
        || name.starts_with("org(")
}
