//! Typst markup emission.
//!
//! The report is consumed by the Typst compiler; every directive below is
//! written exactly as the downstream templates expect it.

use std::fmt::Write as _;

/// Characters with a meaning in Typst markup mode.
const TYPST_SPECIAL: &[char] = &['\\', '#', '[', ']', '*', '_', '$', '<', '>', '@', '`'];

/// Append-only builder for a Typst document.
#[derive(Debug, Default)]
pub struct TypstWriter {
    buf: String,
    escape_text: bool,
}

impl TypstWriter {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape Typst special characters in user-provided text.
    #[must_use]
    pub fn with_escaping(mut self, escape_text: bool) -> Self {
        self.escape_text = escape_text;
        self
    }

    /// Section heading at `depth` (1 = `=`, 4 = `====`).
    pub fn heading(&mut self, depth: usize, title: &str) {
        self.buf.push_str(&"=".repeat(depth));
        self.buf.push(' ');
        self.push_text(title);
        self.buf.push('\n');
    }

    /// A plain line of text.
    pub fn line(&mut self, text: &str) {
        self.push_text(text);
        self.buf.push('\n');
    }

    /// Horizontal spacing between blocks.
    pub fn spacing(&mut self) {
        self.buf.push_str("\n#h(1em)\n");
    }

    /// Open a `#list[...]` block.
    pub fn open_list(&mut self) {
        self.buf.push_str("#list[\n");
    }

    /// A bullet item inside an open list.
    pub fn bullet(&mut self, text: &str) {
        self.buf.push_str("  * ");
        self.push_text(text);
        self.buf.push('\n');
    }

    /// Spacing between an item and its images.
    pub fn item_spacing(&mut self) {
        self.buf.push_str("    #h(0.5em)\n");
    }

    /// An embedded image, `width_percent` of the text width.
    pub fn image(&mut self, path: &str, width_percent: u8) {
        let _ = writeln!(self.buf, "    #image(\"{path}\", width: {width_percent}%)");
    }

    /// A Typst line comment inside a list. Must not contain line breaks.
    pub fn comment(&mut self, text: &str) {
        self.buf.push_str("    // ");
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Close the current list block.
    pub fn close_list(&mut self) {
        self.buf.push_str("]\n");
    }

    /// Page break.
    pub fn pagebreak(&mut self) {
        self.buf.push_str("\n#pagebreak()\n");
    }

    /// The document so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer and return the document.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }

    fn push_text(&mut self, text: &str) {
        if self.escape_text {
            self.buf.push_str(&escape(text));
        } else {
            self.buf.push_str(text);
        }
    }
}

/// Escape characters that Typst would interpret as markup.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if TYPST_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        let mut w = TypstWriter::new();
        w.heading(1, "Titre");
        w.heading(4, "Observations du Mur");
        assert_eq!(w.as_str(), "= Titre\n==== Observations du Mur\n");
    }

    #[test]
    fn test_list_with_image() {
        let mut w = TypstWriter::new();
        w.open_list();
        w.bullet("crack");
        w.item_spacing();
        w.image("images/obs_o1_0.png", 50);
        w.item_spacing();
        w.close_list();

        assert_eq!(
            w.finish(),
            "#list[\n  * crack\n    #h(0.5em)\n    #image(\"images/obs_o1_0.png\", width: 50%)\n    #h(0.5em)\n]\n"
        );
    }

    #[test]
    fn test_spacing_and_pagebreak() {
        let mut w = TypstWriter::new();
        w.spacing();
        w.pagebreak();
        assert_eq!(w.as_str(), "\n#h(1em)\n\n#pagebreak()\n");
    }

    #[test]
    fn test_comment() {
        let mut w = TypstWriter::new();
        w.comment("note");
        assert_eq!(w.as_str(), "    // note\n");
    }

    #[test]
    fn test_text_is_verbatim_by_default() {
        let mut w = TypstWriter::new();
        w.bullet("fissure #2 [mur]");
        assert_eq!(w.as_str(), "  * fissure #2 [mur]\n");
    }

    #[test]
    fn test_text_escaping() {
        let mut w = TypstWriter::new().with_escaping(true);
        w.bullet("fissure #2 [mur] *large*");
        w.heading(3, "Espace : a_b");
        assert_eq!(
            w.as_str(),
            "  * fissure \\#2 \\[mur\\] \\*large\\*\n=== Espace : a\\_b\n"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain text"), "plain text");
        assert_eq!(escape("$5 @ref <lbl> `code` \\"), "\\$5 \\@ref \\<lbl\\> \\`code\\` \\\\");
    }
}
