use std::fmt::Write;

use quick_xml::escape::escape;

use crate::leaderboard::word_frequencies;

pub trait WordCloudRenderer {
    /// Renders the titles into an image document, or `None` when there is
    /// nothing to draw.
    fn render(&self, titles: &[&str]) -> Option<String>;
}

/// Flow-layout SVG cloud: words sized by frequency, packed left to right.
#[derive(Debug, Clone)]
pub struct SvgWordCloud {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font: f64,
    pub max_font: f64,
}

impl Default for SvgWordCloud {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 60,
            min_font: 12.0,
            max_font: 64.0,
        }
    }
}

const PALETTE: [&str; 5] = ["#1f4e79", "#2e7d32", "#8e24aa", "#c62828", "#ef6c00"];
const MARGIN: f64 = 10.0;
const SVG_NS: &str = "http://www.w3.org/2000/svg";

impl WordCloudRenderer for SvgWordCloud {
    fn render(&self, titles: &[&str]) -> Option<String> {
        let words = word_frequencies(titles.iter().copied());
        let top = &words[..words.len().min(self.max_words)];
        let highest = top.first()?.count as f64;
        let lowest = top.last()?.count as f64;

        let mut svg = String::new();
        let (w, h) = (self.width, self.height);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="{SVG_NS}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        let (mut x, mut baseline, mut row_height) = (MARGIN, MARGIN, 0.0_f64);
        for (i, entry) in top.iter().enumerate() {
            let weight = if highest > lowest {
                (entry.count as f64 - lowest) / (highest - lowest)
            } else {
                1.0
            };
            let size = self.min_font + weight * (self.max_font - self.min_font);
            // rough advance width for a sans-serif face
            let advance = size * 0.6 * entry.word.chars().count() as f64;

            if x + advance > f64::from(self.width) - MARGIN && x > MARGIN {
                x = MARGIN;
                baseline += row_height;
                row_height = 0.0;
            }
            if row_height == 0.0 {
                row_height = size * 1.2;
            }
            if baseline + row_height > f64::from(self.height) {
                break;
            }

            let _ = write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" "#,
                x,
                baseline + size
            );
            let _ = writeln!(
                svg,
                r#"font-size="{:.1}" fill="{}">{}</text>"#,
                size,
                PALETTE[i % PALETTE.len()],
                escape(entry.word.as_str())
            );
            x += advance + size * 0.3;
        }

        svg.push_str("</svg>\n");
        Some(svg)
    }
}
