//! PDF backend abstraction layer.
//!
//! The parser only sees the document through [`PdfBackend`]: page geometry,
//! raw outline entries, destination lookups and positioned text. The
//! lopdf-backed implementation lives here as well; rasterization is left
//! to a caller-supplied [`Rasterizer`].

use std::collections::HashSet;
use std::path::Path;

use image::RgbImage;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::pdf_version;
use crate::error::{Error, Result};
use crate::model::{BBox, Destination, ObjectRef, RawOutlineEntry};

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page `(width, height)` in points, which equal pixels at zoom 1.
    fn page_size(&self, page_index: usize) -> Result<(f32, f32)>;

    /// Outline entries in declaration order with one-based levels.
    fn outline_entries(&self) -> Result<Vec<RawOutlineEntry>>;

    /// Vertical offset (PDF space, bottom-up) of the GoTo action behind the
    /// outline item `xref`.
    fn resolve_fit_h(&self, xref: ObjectRef) -> Result<f32>;

    /// Embedded text whose glyphs fall inside `rect` (top-left origin),
    /// with line breaks removed.
    fn text_in_rect(&self, page_index: usize, rect: BBox) -> Result<String>;

    /// All embedded text of a page.
    fn page_text(&self, page_index: usize) -> Result<String>;
}

/// Renders pages to RGB rasters.
pub trait Rasterizer: Send + Sync {
    /// Render the zero-based page at `zoom` (1.0 = one pixel per point).
    fn rasterize(&self, page_index: usize, zoom: f32) -> Result<RgbImage>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    page_ids: Vec<ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let version = pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        log::debug!("loaded PDF {} with {} pages", version, doc.get_pages().len());
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self { doc, page_ids }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(page_index, self.page_ids.len()))
    }

    fn page_number_of(&self, id: ObjectId) -> Option<usize> {
        self.page_ids.iter().position(|p| *p == id).map(|i| i + 1)
    }

    /// Follow a reference, or return the object itself.
    fn deref<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn deref_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.deref(obj)?.as_dict().ok()
    }

    /// Resolve a destination object (array, name or string) to its array.
    fn dest_array<'a>(&'a self, dest: &'a Object) -> Option<&'a Vec<Object>> {
        match self.deref(dest)? {
            Object::Array(arr) => Some(arr),
            Object::Name(name) => self.named_dest(name),
            Object::String(name, _) => self.named_dest(name),
            Object::Dictionary(dict) => self.dest_array(dict.get(b"D").ok()?),
            _ => None,
        }
    }

    /// Look a named destination up in `/Dests` or the `/Names /Dests` tree.
    fn named_dest(&self, name: &[u8]) -> Option<&Vec<Object>> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog.get(b"Dests").ok().and_then(|d| self.deref_dict(d)) {
            if let Some(arr) = dests.get(name).ok().and_then(|v| self.dest_value(v)) {
                return Some(arr);
            }
        }

        let names = catalog.get(b"Names").ok().and_then(|n| self.deref_dict(n))?;
        let root = names.get(b"Dests").ok().and_then(|d| self.deref_dict(d))?;

        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| self.deref(n))
            {
                for pair in pairs.chunks(2) {
                    if let [Object::String(key, _), value] = pair {
                        if key.as_slice() == name {
                            return self.dest_value(value);
                        }
                    }
                }
            }
            if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| self.deref(k)) {
                pending.extend(kids.iter().filter_map(|kid| self.deref_dict(kid)));
            }
        }
        None
    }

    fn dest_value<'a>(&'a self, value: &'a Object) -> Option<&'a Vec<Object>> {
        match self.deref(value)? {
            Object::Array(arr) => Some(arr),
            Object::Dictionary(dict) => match self.deref(dict.get(b"D").ok()?)? {
                Object::Array(arr) => Some(arr),
                _ => None,
            },
            _ => None,
        }
    }

    /// One-based page number a destination array points to.
    fn dest_page(&self, dest: &[Object]) -> Option<usize> {
        match dest.first()? {
            Object::Reference(id) => self.page_number_of(*id),
            Object::Integer(n) => usize::try_from(*n).ok()?.checked_add(1),
            _ => None,
        }
    }

    /// Turn a destination array into a top-left position on its page.
    fn dest_position(&self, dest: &[Object], page: usize) -> (f32, f32) {
        let height = self
            .page_size(page - 1)
            .map(|(_, h)| h)
            .unwrap_or(DEFAULT_PAGE_SIZE.1);
        let left = dest.get(2).and_then(get_number).unwrap_or(0.0);

        match dest_top(dest) {
            Some(top) => {
                let x = match dest_kind(dest) {
                    Some(b"FitH") | Some(b"FitBH") => 0.0,
                    _ => left,
                };
                (x, height - top)
            }
            None => match dest_kind(dest) {
                Some(b"FitV") | Some(b"FitBV") => (left, 0.0),
                _ => (0.0, 0.0),
            },
        }
    }

    /// Classify an outline item into its target page and destination kind.
    fn classify_item(&self, id: ObjectId, item: &Dictionary) -> (i64, Destination) {
        if let Ok(dest) = item.get(b"Dest") {
            return match self.dest_array(dest) {
                Some(arr) => match self.dest_page(arr) {
                    Some(page) => {
                        let (x, y) = self.dest_position(arr, page);
                        (page as i64, Destination::Goto { x, y })
                    }
                    None => (-1, Destination::Other),
                },
                None => (-1, Destination::Other),
            };
        }

        let Some(action) = item.get(b"A").ok().and_then(|a| self.deref_dict(a)) else {
            return (-1, Destination::Other);
        };
        let is_goto = action
            .get(b"S")
            .ok()
            .and_then(|s| s.as_name().ok())
            .is_some_and(|s| s == b"GoTo");
        if !is_goto {
            return (-1, Destination::Other);
        }

        let page = action
            .get(b"D")
            .ok()
            .and_then(|d| self.dest_array(d))
            .and_then(|arr| self.dest_page(arr))
            .map_or(-1, |p| p as i64);
        (page, Destination::Named { xref: id })
    }

    /// Text spans of one page, in content-stream order.
    fn page_spans(&self, page_id: ObjectId) -> Result<Vec<PositionedText>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    matrix = TextMatrix {
                        leading: matrix.leading,
                        ..TextMatrix::default()
                    };
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let [Object::Name(name), size, ..] = op.operands.as_slice() {
                        font_name = name.clone();
                        font_size = get_number(size).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            matrix.leading = -ty;
                        }
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op
                            .operands
                            .iter()
                            .take(6)
                            .map(|o| get_number(o).unwrap_or(0.0))
                            .collect();
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if !in_text_block {
                        continue;
                    }
                    if op.operator != "Tj" && op.operator != "TJ" {
                        matrix.next_line();
                    }
                    let encoding = lopdf_fonts
                        .get(&font_name)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());
                    let decode = |bytes: &[u8]| match encoding {
                        Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                            .unwrap_or_else(|_| REPLACEMENT.to_string()),
                        None => decode_text_simple(bytes),
                    };

                    let mut text = String::new();
                    for operand in &op.operands {
                        match operand {
                            Object::String(bytes, _) => text.push_str(&decode(bytes)),
                            Object::Array(items) => {
                                for item in items {
                                    if let Object::String(bytes, _) = item {
                                        text.push_str(&decode(bytes));
                                    } else if get_number(item).is_some_and(|n| n < -200.0)
                                        && !text.ends_with(' ')
                                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                                    {
                                        text.push(' ');
                                    }
                                }
                            }
                            _ => {}
                        }
                    }

                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(PositionedText {
                            text,
                            x,
                            baseline: y,
                            size: font_size * matrix.scale(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);
const REPLACEMENT: char = '\u{FFFD}';

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        let mut node = self.doc.get_dictionary(self.page_id(page_index)?)?;
        let mut seen = HashSet::new();

        // MediaBox is inheritable from the page tree.
        loop {
            if let Some(Object::Array(array)) = node.get(b"MediaBox").ok().and_then(|m| self.deref(m))
            {
                if let [x1, y1, x2, y2, ..] = array.as_slice() {
                    let nums = [x1, y1, x2, y2].map(|o| get_number(o).unwrap_or(0.0));
                    return Ok(((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs()));
                }
            }
            match node.get(b"Parent").ok().and_then(|p| p.as_reference().ok()) {
                Some(parent) if seen.insert(parent) => node = self.doc.get_dictionary(parent)?,
                _ => break,
            }
        }

        Ok(DEFAULT_PAGE_SIZE)
    }

    fn outline_entries(&self) -> Result<Vec<RawOutlineEntry>> {
        let mut entries = Vec::new();

        let catalog = self.doc.catalog()?;
        let Some(first) = catalog
            .get(b"Outlines")
            .ok()
            .and_then(|o| self.deref_dict(o))
            .and_then(|root| root.get(b"First").ok())
            .and_then(|f| f.as_reference().ok())
        else {
            return Ok(entries);
        };

        // Explicit stack so deep or malformed outlines cannot overflow.
        let mut pending: Vec<(ObjectId, u32)> = vec![(first, 1)];
        let mut visited = HashSet::new();

        while let Some((id, level)) = pending.pop() {
            if !visited.insert(id) {
                log::warn!("outline cycle at object {:?}, skipping", id);
                continue;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                continue;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|t| self.deref(t))
                .and_then(|t| match t {
                    Object::String(bytes, _) => Some(decode_text_simple(bytes)),
                    _ => None,
                })
                .unwrap_or_default();
            let (page, destination) = self.classify_item(id, item);
            entries.push(RawOutlineEntry {
                level,
                title,
                page,
                destination,
            });

            if let Ok(next) = item.get(b"Next").and_then(Object::as_reference) {
                pending.push((next, level));
            }
            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                pending.push((child, level + 1));
            }
        }

        Ok(entries)
    }

    fn resolve_fit_h(&self, xref: ObjectRef) -> Result<f32> {
        let item = self.doc.get_dictionary(xref)?;
        let action_ref = item
            .get(b"A")
            .and_then(Object::as_reference)
            .map_err(|_| Error::Destination(format!("{:?} has no action reference", xref)))?;
        let action = self.doc.get_dictionary(action_ref)?;
        let dest = action
            .get(b"D")
            .ok()
            .and_then(|d| self.deref(d))
            .ok_or_else(|| Error::Destination(format!("action {:?} has no /D", action_ref)))?;

        match dest {
            Object::Array(arr) => dest_top(arr).ok_or_else(|| {
                Error::Destination(format!("action {:?} has no vertical offset", action_ref))
            }),
            _ => Err(Error::Destination(format!(
                "action {:?} uses a named destination",
                action_ref
            ))),
        }
    }

    fn text_in_rect(&self, page_index: usize, rect: BBox) -> Result<String> {
        let (_, height) = self.page_size(page_index)?;
        let spans = self.page_spans(self.page_id(page_index)?)?;

        let mut text = String::new();
        let mut last_baseline: Option<f32> = None;
        for span in spans.iter().filter(|s| rect.contains_center(s, height)) {
            let same_line = last_baseline.is_some_and(|b| (b - span.baseline).abs() < span.size / 2.0);
            if same_line
                && !text.ends_with(' ')
                && !text.chars().last().is_some_and(is_spaceless_script_char)
            {
                text.push(' ');
            }
            text.push_str(span.text.trim_end_matches(['\n', '\r']));
            last_baseline = Some(span.baseline);
        }

        Ok(text.replace(['\n', '\r'], ""))
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        let page_number = page_index as u32 + 1;
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", page_number, e)))
    }
}

/// A run of text drawn by one show-text operator.
#[derive(Debug, Clone)]
struct PositionedText {
    text: String,
    x: f32,
    /// Baseline in PDF space (bottom-up)
    baseline: f32,
    size: f32,
}

impl PositionedText {
    fn width(&self) -> f32 {
        self.text
            .chars()
            .map(|c| if is_spaceless_script_char(c) { 1.0 } else { 0.5 })
            .sum::<f32>()
            * self.size
    }
}

impl BBox {
    /// Whether the centre of a span (converted to top-left origin) is inside.
    fn contains_center(&self, span: &PositionedText, page_height: f32) -> bool {
        let cx = span.x + span.width() / 2.0;
        let cy = page_height - span.baseline - span.size / 2.0;
        self.contains(cx, cy)
    }
}

struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    line_x: f32,
    line_y: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_x: 0.0,
            line_y: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_x = e;
        self.line_y = f;
    }

    /// Td moves relative to the start of the current line.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_x += tx * self.a + ty * self.c;
        self.line_y += tx * self.b + ty * self.d;
        self.e = self.line_x;
        self.f = self.line_y;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt().max(f32::EPSILON)
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn dest_kind(dest: &[Object]) -> Option<&[u8]> {
    dest.get(1)?.as_name().ok()
}

/// The `top` operand of a destination array (PDF space), if its type has one.
fn dest_top(dest: &[Object]) -> Option<f32> {
    let position = match dest_kind(dest)? {
        b"XYZ" => 3,
        b"FitH" | b"FitBH" => 2,
        b"FitR" => 5,
        _ => return None,
    };
    dest.get(position).and_then(get_number)
}

/// Whether a character belongs to a script written without word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK punctuation and full-width forms
        || (0x3000..=0x303F).contains(&code)
        || (0xFF00..=0xFFEF).contains(&code)
}
