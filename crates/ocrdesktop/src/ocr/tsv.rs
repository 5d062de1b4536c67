//! Parsing of Tesseract's TSV output.
//!
//! Tesseract emits one row per layout element (page, block, paragraph,
//! line, word) with the hierarchy encoded in the `level` column. Only
//! word-level rows carry text; the page/block/paragraph/line numbers are
//! kept because text assembly needs them for line breaks.

/// TSV row level for words.
pub const TSV_WORD_LEVEL: u32 = 5;
/// Minimum number of tab-separated fields in a valid row.
pub const TSV_MIN_FIELDS: usize = 12;

/// A word-level row from Tesseract TSV output.
///
/// Coordinates are in pixels of the image that was handed to tesseract,
/// i.e. the *preprocessed* (upscaled) image.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub page: u32,
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f64,
    pub text: String,
}

impl WordBox {
    /// Center of the bounding box, in preprocessed-image pixels.
    /// Saturates rather than overflowing on absurd parsed geometry.
    pub fn center(&self) -> (u32, u32) {
        (
            self.left.saturating_add(self.width / 2),
            self.top.saturating_add(self.height / 2),
        )
    }

    /// True when this word starts a new output line relative to `prev`:
    /// any change of page, block, paragraph, or line number.
    pub fn breaks_line_after(&self, prev: &WordBox) -> bool {
        self.page != prev.page
            || self.block != prev.block
            || self.paragraph != prev.paragraph
            || self.line != prev.line
    }
}

/// Extract word boxes from Tesseract TSV output.
///
/// Non-word rows, blank text, and malformed lines are skipped; tesseract
/// interleaves them freely and they carry no recognizable content.
pub fn parse_tsv(tsv_data: &str) -> Vec<WordBox> {
    let mut words = Vec::new();

    for (line_num, line) in tsv_data.lines().enumerate() {
        // Header row
        if line_num == 0 {
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        words.push(WordBox {
            page: fields[1].parse().unwrap_or(0),
            block: fields[2].parse().unwrap_or(0),
            paragraph: fields[3].parse().unwrap_or(0),
            line: fields[4].parse().unwrap_or(0),
            left: fields[6].parse().unwrap_or(0),
            top: fields[7].parse().unwrap_or(0),
            width: fields[8].parse().unwrap_or(0),
            height: fields[9].parse().unwrap_or(0),
            confidence: fields[10].parse().unwrap_or(-1.0),
            text: text.to_string(),
        });
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_basic_words() {
        let data = tsv(&[
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello",
            "5\t1\t1\t1\t1\t2\t190\t50\t70\t30\t92.3\tWorld",
        ]);

        let words = parse_tsv(&data);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].left, 100);
        assert_eq!(words[0].top, 50);
        assert_eq!(words[0].confidence, 95.5);
        assert_eq!(words[1].text, "World");
    }

    #[test]
    fn test_parse_skips_non_word_levels() {
        let data = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t",
            "3\t1\t1\t0\t0\t0\t90\t40\t200\t50\t-1\t",
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello",
        ]);

        let words = parse_tsv(&data);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Hello");
    }

    #[test]
    fn test_parse_skips_blank_text() {
        let data = tsv(&[
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.0\t ",
            "5\t1\t1\t1\t1\t2\t190\t50\t70\t30\t92.3\tWorld",
        ]);

        let words = parse_tsv(&data);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "World");
    }

    #[test]
    fn test_parse_tolerates_malformed_lines() {
        let data = tsv(&[
            "garbage line without tabs",
            "5\t1\t1",
            "5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello",
        ]);

        let words = parse_tsv(&data);
        assert_eq!(words.len(), 1);
    }

    #[test]
    fn test_center() {
        let word = WordBox {
            page: 1,
            block: 1,
            paragraph: 1,
            line: 1,
            left: 100,
            top: 50,
            width: 80,
            height: 30,
            confidence: 95.0,
            text: "Hello".to_string(),
        };
        assert_eq!(word.center(), (140, 65));
    }

    #[test]
    fn test_breaks_line_after() {
        let base = WordBox {
            page: 1,
            block: 1,
            paragraph: 1,
            line: 1,
            left: 0,
            top: 0,
            width: 10,
            height: 10,
            confidence: 90.0,
            text: "a".to_string(),
        };
        let same_line = WordBox { left: 20, ..base.clone() };
        let next_line = WordBox { line: 2, ..base.clone() };
        let next_block = WordBox { block: 2, ..base.clone() };

        assert!(!same_line.breaks_line_after(&base));
        assert!(next_line.breaks_line_after(&base));
        assert!(next_block.breaks_line_after(&base));
    }

    #[test]
    fn test_center_saturates_on_huge_geometry() {
        let word = WordBox {
            page: 1,
            block: 1,
            paragraph: 1,
            line: 1,
            left: u32::MAX - 2,
            top: u32::MAX - 2,
            width: u32::MAX,
            height: u32::MAX,
            confidence: 0.0,
            text: "x".to_string(),
        };
        assert_eq!(word.center(), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_parse_preserves_negative_confidence() {
        let data = tsv(&["5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t-1\tx"]);
        let words = parse_tsv(&data);
        assert_eq!(words[0].confidence, -1.0);
    }
}
