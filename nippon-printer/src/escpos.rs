//! Print payload builders
//!
//! Two payload styles reach `NPrint`:
//! - the vendor's command-string notation (hex byte tokens with quoted
//!   text), produced by [`render_text`]
//! - raw ESC/POS bytes, produced by [`EscPosBuilder`] and [`Receipt`]

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Line feeds appended when a feed is requested without a count
pub const DEFAULT_FEED_LINES: u8 = 3;

/// Receipt width for 80mm paper
pub const DEFAULT_RECEIPT_WIDTH: usize = 48;

// ============================================================================
// Command-string text jobs
// ============================================================================

/// Horizontal alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn code(self) -> u8 {
        match self {
            Align::Left => 0,
            Align::Center => 1,
            Align::Right => 2,
        }
    }
}

/// Paper cut after a text job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cut {
    Full,
    Partial,
}

/// Extra line feeds after a text job
///
/// Accepts a line count or a flag; `true` means [`DEFAULT_FEED_LINES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feed {
    Lines(u8),
    Flag(bool),
}

impl Feed {
    pub fn lines(self) -> u8 {
        match self {
            Feed::Lines(n) => n,
            Feed::Flag(true) => DEFAULT_FEED_LINES,
            Feed::Flag(false) => 0,
        }
    }
}

impl From<u8> for Feed {
    fn from(lines: u8) -> Self {
        Feed::Lines(lines)
    }
}

impl From<bool> for Feed {
    fn from(flag: bool) -> Self {
        Feed::Flag(flag)
    }
}

/// Formatting for [`render_text`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOptions {
    /// Send ESC @ first
    pub initialize: bool,
    pub align: Align,
    /// Width multiplier (1-8)
    pub width: Option<u8>,
    /// Height multiplier (1-8)
    pub height: Option<u8>,
    pub bold: bool,
    pub underline: bool,
    pub feed: Option<Feed>,
    pub cut: Option<Cut>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            initialize: true,
            align: Align::Left,
            width: None,
            height: None,
            bold: false,
            underline: false,
            feed: None,
            cut: None,
        }
    }
}

impl TextOptions {
    /// `FS ! n` size code; the printer only knows normal, 2x2 and large
    fn size_code(&self) -> Option<u8> {
        if self.width.is_none() && self.height.is_none() {
            return None;
        }
        let w = self.width.unwrap_or(1);
        let h = self.height.unwrap_or(1);
        Some(if w >= 3 || h >= 3 {
            0x20
        } else if w == 2 && h == 2 {
            0x06
        } else {
            0x00
        })
    }
}

/// Render text into the vendor's command-string notation
///
/// Hex tokens carry control bytes and the text itself is wrapped in double
/// quotes. Quotes inside `text` are not escaped.
pub fn render_text(text: &str, options: &TextOptions) -> String {
    let mut out = String::new();

    if options.initialize {
        out.push_str("1B40");
    }
    let _ = write!(out, "1B61{:02X}", options.align.code());

    let size = options.size_code();
    if let Some(code) = size {
        let _ = write!(out, "1C21{:02X}", code);
    }
    if options.bold {
        out.push_str("1B4501");
    }
    if options.underline {
        out.push_str("1B2D01");
    }

    out.push('"');
    out.push_str(text);
    out.push('"');

    if options.bold {
        out.push_str("1B4500");
    }
    if options.underline {
        out.push_str("1B2D00");
    }
    if size.is_some() {
        out.push_str("1C2100");
    }
    out.push_str("1B6100");

    out.push_str("0A");
    for _ in 0..options.feed.map_or(0, Feed::lines) {
        out.push_str("0A");
    }

    match options.cut {
        Some(Cut::Full) => out.push_str("1B4A601B69"),
        Some(Cut::Partial) => out.push_str("1B4A601B6D"),
        None => {}
    }

    out
}

// ============================================================================
// Raw ESC/POS builder
// ============================================================================

/// Line feeds before the cut at the end of a receipt
const RECEIPT_FEED_LINES: u8 = 5;

/// ESC/POS byte builder for receipts
///
/// Text is written as UTF-8 and passed through untouched. Every job starts
/// with ESC @.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Start a job on paper `width` characters wide (32 for 58mm, 48 for 80mm)
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.newline()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// ESC a n
    pub fn align(&mut self, align: Align) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, align.code()]);
        self
    }

    /// ESC E n
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, u8::from(on)]);
        self
    }

    /// GS ! n, double width and height when `on`
    pub fn double_size(&mut self, on: bool) -> &mut Self {
        let size = if on { 0x11 } else { 0x00 };
        self.buf.extend_from_slice(&[0x1D, 0x21, size]);
        self
    }

    /// Dashes across the full width
    pub fn separator(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    /// Name on the left, price on the right
    pub fn item(&mut self, name: &str, price: &Price) -> &mut Self {
        let line = format_receipt_line(name, price, self.width);
        self.line(&line)
    }

    /// Print and feed `lines` (ESC d n), then partial cut (GS V 1)
    pub fn feed_and_cut(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, lines, 0x1D, 0x56, 0x01]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

// ============================================================================
// Receipts
// ============================================================================

/// Item or total price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// Rendered as `$x.xx`
    Amount(f64),
    /// Rendered verbatim
    Text(String),
}

impl Price {
    fn render(&self) -> String {
        match self {
            Price::Amount(value) => format!("${:.2}", value),
            Price::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::Amount(value)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Price::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub price: Price,
}

/// Receipt sections, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    /// Centered, double size
    pub header: Option<String>,
    pub subheader: Option<String>,
    pub items: Vec<ReceiptItem>,
    /// Bold TOTAL line
    pub total: Option<Price>,
    /// Centered
    pub footer: Option<String>,
    /// Line width in characters (48 when unset)
    pub width: Option<usize>,
}

impl Receipt {
    /// Render to ESC/POS bytes, ending with a feed and partial cut
    pub fn render(&self) -> Vec<u8> {
        let width = self.width.unwrap_or(DEFAULT_RECEIPT_WIDTH);
        let mut b = EscPosBuilder::new(width);

        if let Some(header) = &self.header {
            b.align(Align::Center).double_size(true).line(header);
            b.double_size(false).align(Align::Left).newline();
        }

        if let Some(subheader) = &self.subheader {
            b.line(subheader).newline();
        }

        if !self.items.is_empty() {
            for item in &self.items {
                b.item(&item.name, &item.price);
            }
            b.newline().separator();
        }

        if let Some(total) = &self.total {
            b.bold(true).item("TOTAL", total).bold(false);
        }

        if let Some(footer) = &self.footer {
            b.newline().align(Align::Center).line(footer);
            b.align(Align::Left);
        }

        b.newline().newline().feed_and_cut(RECEIPT_FEED_LINES);
        b.build()
    }
}

/// Format `name` and `price` on one line of `width` characters
///
/// Names that do not fit are cut short with `...`; at least one space
/// always separates the two.
pub fn format_receipt_line(name: &str, price: &Price, width: usize) -> String {
    let price = price.render();
    let price_len = price.chars().count();
    let max_name = width.saturating_sub(price_len + 2);

    let mut name: String = name.to_string();
    if name.chars().count() > max_name {
        name = name.chars().take(max_name.saturating_sub(3)).collect();
        name.push_str("...");
    }

    let spaces = width
        .saturating_sub(name.chars().count() + price_len)
        .max(1);
    format!("{}{}{}", name, " ".repeat(spaces), price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_defaults() {
        let out = render_text("Hello", &TextOptions::default());
        assert_eq!(out, "1B401B6100\"Hello\"1B61000A");
    }

    #[test]
    fn test_render_text_all_options() {
        let options = TextOptions {
            initialize: false,
            align: Align::Center,
            width: Some(2),
            height: Some(2),
            bold: true,
            underline: true,
            feed: Some(Feed::Lines(4)),
            cut: Some(Cut::Full),
        };
        let out = render_text("TOTAL", &options);
        assert_eq!(
            out,
            "1B61011C21061B45011B2D01\"TOTAL\"1B45001B2D001C21001B61000A0A0A0A0A1B4A601B69"
        );
    }

    #[test]
    fn test_size_codes() {
        let size = |width, height| TextOptions {
            width,
            height,
            ..Default::default()
        }
        .size_code();

        assert_eq!(size(None, None), None);
        assert_eq!(size(Some(1), None), Some(0x00));
        assert_eq!(size(Some(2), Some(2)), Some(0x06));
        assert_eq!(size(Some(2), None), Some(0x00));
        assert_eq!(size(None, Some(3)), Some(0x20));
        assert_eq!(size(Some(8), Some(1)), Some(0x20));
    }

    #[test]
    fn test_partial_cut() {
        let options = TextOptions {
            cut: Some(Cut::Partial),
            ..Default::default()
        };
        assert!(render_text("x", &options).ends_with("0A1B4A601B6D"));
    }

    #[test]
    fn test_feed_flag_uses_default_lines() {
        let options: TextOptions = serde_json::from_str(r#"{"feed":true}"#).unwrap();
        assert_eq!(options.feed, Some(Feed::Flag(true)));
        assert!(render_text("x", &options).ends_with("\"1B61000A0A0A0A"));

        let options: TextOptions = serde_json::from_str(r#"{"feed":false}"#).unwrap();
        assert!(render_text("x", &options).ends_with("\"1B61000A"));

        let options: TextOptions = serde_json::from_str(r#"{"feed":2}"#).unwrap();
        assert_eq!(options.feed, Some(Feed::Lines(2)));
        assert!(render_text("x", &options).ends_with("\"1B61000A0A0A"));
    }

    #[test]
    fn test_format_receipt_line() {
        let line = format_receipt_line("Coffee", &Price::Amount(3.5), 20);
        assert_eq!(line, "Coffee         $3.50");
        assert_eq!(line.len(), 20);

        let line = format_receipt_line("Extremely long item name", &"12,00 €".into(), 20);
        assert_eq!(line, "Extremel...  12,00 €");
        assert_eq!(line.chars().count(), 20);
    }

    #[test]
    fn test_format_receipt_line_never_glues() {
        let line = format_receipt_line("A", &"1234567890".into(), 5);
        assert_eq!(line, "... 1234567890");
    }

    #[test]
    fn test_receipt_render() {
        let receipt = Receipt {
            header: Some("SHOP".into()),
            items: vec![
                ReceiptItem {
                    name: "Tea".into(),
                    price: 2.0.into(),
                },
                ReceiptItem {
                    name: "Cake".into(),
                    price: 4.25.into(),
                },
            ],
            total: Some(6.25.into()),
            footer: Some("Thanks".into()),
            width: Some(16),
            ..Default::default()
        };

        let data = receipt.render();
        let s = String::from_utf8_lossy(&data);

        assert!(data.starts_with(&[0x1B, 0x40, 0x1B, 0x61, 0x01, 0x1D, 0x21, 0x11]));
        assert!(s.contains("SHOP\n"));
        assert!(s.contains("Tea        $2.00\n"));
        assert!(s.contains("Cake       $4.25\n"));
        assert!(s.contains(&format!("{}\n", "-".repeat(16))));
        assert!(s.contains("\x1BE\x01TOTAL      $6.25\n\x1BE\x00"));
        assert!(s.contains("\x1Ba\x01Thanks\n\x1Ba\x00"));
        assert!(data.ends_with(&[b'\n', b'\n', 0x1B, 0x64, 0x05, 0x1D, 0x56, 0x01]));
    }

    #[test]
    fn test_empty_receipt() {
        let data = Receipt::default().render();
        assert_eq!(
            data,
            vec![0x1B, 0x40, b'\n', b'\n', 0x1B, 0x64, 0x05, 0x1D, 0x56, 0x01]
        );
    }

    #[test]
    fn test_receipt_from_json() {
        let receipt: Receipt = serde_json::from_str(
            r#"{"header":"SHOP","items":[{"name":"Tea","price":2},{"name":"Gift","price":"free"}]}"#,
        )
        .unwrap();
        assert_eq!(receipt.items[0].price, Price::Amount(2.0));
        assert_eq!(receipt.items[1].price, Price::Text("free".into()));
        assert_eq!(receipt.width, None);
    }
}
