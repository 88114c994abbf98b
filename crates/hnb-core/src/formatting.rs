//! Formatting utilities (HN item HTML → Telegram HTML, message splitting).

use std::sync::OnceLock;

use regex::Regex;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape only what Telegram's parser treats as markup in text content.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?([A-Za-z][A-Za-z0-9]*)(?:\s[^<>]*)?/?>").expect("valid regex")
    })
}

/// Turn the HTML body of an HN comment into Telegram HTML.
///
/// `<p>` becomes a blank line and `</p>` disappears. Entities in text are
/// decoded, then `&`, `<` and `>` are re-escaped so the result still parses.
/// Every other tag (`<i>`, `<a href>`, `<pre>`, `<code>`) is kept verbatim.
pub fn render_body(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0usize;

    for caps in tag_re().captures_iter(raw) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        push_text(&mut out, &raw[last..m.start()]);
        last = m.end();

        let tag = m.as_str();
        let is_paragraph = caps
            .get(1)
            .is_some_and(|name| name.as_str().eq_ignore_ascii_case("p"));
        if !is_paragraph {
            out.push_str(tag);
        } else if !tag.starts_with("</") {
            out.push_str("\n\n");
        }
    }
    push_text(&mut out, &raw[last..]);

    out
}

fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(text);
    out.push_str(&escape_text(&decoded));
}

/// Split Telegram HTML into chunks of at most `limit` bytes.
///
/// Formatting tags open at a split point are closed at the end of one chunk and
/// reopened at the start of the next. Text prefers to break after a newline or
/// a space and never inside an entity. Chunks without visible text are
/// dropped.
pub fn split_html(html: &str, limit: usize) -> Vec<String> {
    if html.len() <= limit {
        return vec![html.to_string()];
    }

    let mut splitter = Splitter {
        limit,
        out: Vec::new(),
        chunk: String::new(),
        open: Vec::new(),
    };
    for token in tokenize(html) {
        match token {
            Token::Tag(t) => splitter.push_tag(t),
            Token::Text(t) => splitter.push_text(t),
        }
    }
    splitter.finish()
}

#[derive(Clone, Copy, Debug)]
enum Token<'a> {
    Tag(&'a str),
    Text(&'a str),
}

fn tokenize(mut s: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    while !s.is_empty() {
        let Some(start) = s.find('<') else {
            out.push(Token::Text(s));
            break;
        };
        if start > 0 {
            out.push(Token::Text(&s[..start]));
            s = &s[start..];
        }
        let Some(end) = s.find('>') else {
            out.push(Token::Text(s));
            break;
        };
        out.push(Token::Tag(&s[..=end]));
        s = &s[end + 1..];
    }
    out
}

enum TagKind {
    Open(String),
    Close(String),
    Void,
}

fn classify(tag: &str) -> TagKind {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();

    if name.is_empty() || inner.ends_with('/') {
        TagKind::Void
    } else if closing {
        TagKind::Close(name)
    } else {
        TagKind::Open(name)
    }
}

struct OpenTag<'a> {
    name: String,
    raw: &'a str,
}

struct Splitter<'a> {
    limit: usize,
    out: Vec<String>,
    chunk: String,
    open: Vec<OpenTag<'a>>,
}

impl<'a> Splitter<'a> {
    fn closers_len(&self) -> usize {
        self.open.iter().map(|t| t.name.len() + 3).sum()
    }

    fn has_visible_text(&self) -> bool {
        tokenize(&self.chunk)
            .iter()
            .any(|t| matches!(t, Token::Text(s) if !s.trim().is_empty()))
    }

    fn flush(&mut self) {
        if self.has_visible_text() {
            let mut msg = std::mem::take(&mut self.chunk);
            for t in self.open.iter().rev() {
                msg.push_str("</");
                msg.push_str(&t.name);
                msg.push('>');
            }
            self.out.push(msg);
        }
        self.chunk.clear();
        for t in &self.open {
            self.chunk.push_str(t.raw);
        }
    }

    fn push_tag(&mut self, tag: &'a str) {
        let kind = classify(tag);
        // Closing an open tag costs nothing: its closer is already reserved.
        let (tag_cost, extra_close) = match &kind {
            TagKind::Open(name) => (tag.len(), name.len() + 3),
            TagKind::Close(name) if self.open.iter().any(|t| &t.name == name) => (0, 0),
            _ => (tag.len(), 0),
        };
        let needed = self.chunk.len() + tag_cost + self.closers_len() + extra_close;
        if needed > self.limit && self.has_visible_text() {
            self.flush();
        }

        self.chunk.push_str(tag);
        match kind {
            TagKind::Open(name) => self.open.push(OpenTag { name, raw: tag }),
            TagKind::Close(name) => {
                if let Some(pos) = self.open.iter().rposition(|t| t.name == name) {
                    self.open.truncate(pos);
                }
            }
            TagKind::Void => {}
        }
    }

    fn push_text(&mut self, mut text: &'a str) {
        while !text.is_empty() {
            let room = self
                .limit
                .saturating_sub(self.chunk.len() + self.closers_len());
            if text.len() <= room {
                self.chunk.push_str(text);
                return;
            }

            let cut = break_point(text, room);
            if cut == 0 {
                if self.has_visible_text() {
                    self.flush();
                    continue;
                }
                // Reopened tags alone fill the limit; emit oversized rather than loop.
                self.chunk.push_str(text);
                return;
            }

            self.chunk.push_str(&text[..cut]);
            text = &text[cut..];
            self.flush();
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}

/// Largest prefix length of `text` within `room` bytes that ends on a char
/// boundary outside an entity, preferring a newline or space break.
fn break_point(text: &str, room: usize) -> usize {
    let mut max = room.min(text.len());
    while !text.is_char_boundary(max) {
        max -= 1;
    }

    if let Some(amp) = text[..max].rfind('&') {
        if !text[amp..max].contains(';') {
            max = amp;
        }
    }
    if max == 0 {
        return 0;
    }

    let head = &text[..max];
    if let Some(nl) = head.rfind('\n') {
        return nl + 1;
    }
    if let Some(sp) = head.rfind(' ') {
        return sp + 1;
    }
    max
}
