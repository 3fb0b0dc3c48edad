//! # PDF Sink
//!
//! A [`DocumentSink`] that writes PDF 1.7. Drawing calls append operators
//! to a per-page content stream; [`PdfSink::finish`] assembles the object
//! table, compresses the streams and writes the cross-reference table.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, pages, streams
//! xref                <- byte offset of every object
//! trailer             <- points to the catalog and the info dictionary
//! %%EOF
//! ```
//!
//! Text uses the standard Type1 fonts with WinAnsiEncoding, so nothing is
//! embedded and widths match [`crate::font::FontContext`] exactly. Because
//! every page keeps its own stream until the end, switching back to an
//! earlier page and drawing over it is just appending more operators.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use chrono::{DateTime, Local};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::SinkError;
use crate::font::{FontContext, StandardFont};
use crate::image_loader::{load_image, LoadedImage, Pixels};
use crate::sink::{DocumentSink, LineStyle, Rect, TextOptions};
use crate::style::{Color, TextAlign};
use crate::text::TextLayout;

/// Ascent of the standard fonts as a fraction of the font size.
const ASCENT: f64 = 0.718;

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub created: Option<DateTime<Local>>,
}

#[derive(Default)]
struct PageContent {
    stream: String,
    /// Indices into `PdfSink::images` drawn on this page.
    images: Vec<usize>,
}

pub struct PdfSink {
    width: f64,
    height: f64,
    pages: Vec<PageContent>,
    current: Option<usize>,
    fonts: FontContext,
    layout: TextLayout,
    /// Resource order: font `i` is `/F{i}`.
    used_fonts: Vec<StandardFont>,
    /// Image `i` is `/Im{i}`; loaded once per source.
    images: Vec<(String, LoadedImage)>,
    metadata: Metadata,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfSink {
    /// A sink producing pages of `width` x `height` points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
            current: None,
            fonts: FontContext::new(),
            layout: TextLayout::new(),
            used_fonts: Vec::new(),
            images: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    fn page_mut(&mut self) -> Result<&mut PageContent, SinkError> {
        let index = self.current.ok_or(SinkError::NoPage)?;
        Ok(&mut self.pages[index])
    }

    /// Flip a top-down y coordinate into PDF user space.
    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn font_index(&mut self, font: StandardFont) -> usize {
        match self.used_fonts.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.used_fonts.push(font);
                self.used_fonts.len() - 1
            }
        }
    }

    fn image_index(&mut self, src: &str) -> Result<usize, SinkError> {
        if let Some(i) = self.images.iter().position(|(s, _)| s == src) {
            return Ok(i);
        }
        let image = load_image(src)?;
        self.images.push((src.to_string(), image));
        Ok(self.images.len() - 1)
    }

    /// Escape a string for a PDF literal, mapping to WinAnsiEncoding.
    fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match unicode_to_winansi(ch).unwrap_or(b'?') {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                b @ 0x20..=0x7E => out.push(b as char),
                b => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    fn write_string(s: &str) -> String {
        format!("({})", Self::encode_text(s))
    }

    fn write_image_xobject(objects: &mut Vec<PdfObject>, image: &LoadedImage) -> usize {
        let (filter, color_space, payload, smask) = match &image.pixels {
            Pixels::Jpeg { data, gray } => {
                let cs = if *gray { "/DeviceGray" } else { "/DeviceRGB" };
                ("/DCTDecode", cs, data.clone(), None)
            }
            Pixels::Rgb { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    push_stream(
                        objects,
                        &format!(
                            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 \
                             /Filter /FlateDecode /Length {} >>",
                            image.width_px,
                            image.height_px,
                            compressed.len()
                        ),
                        &compressed,
                    )
                });
                (
                    "/FlateDecode",
                    "/DeviceRGB",
                    compress_to_vec_zlib(rgb, 6),
                    smask,
                )
            }
        };

        let smask_ref = smask
            .map(|id| format!(" /SMask {} 0 R", id))
            .unwrap_or_default();
        push_stream(
            objects,
            &format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace {} /BitsPerComponent 8 /Filter {} /Length {}{} >>",
                image.width_px,
                image.height_px,
                color_space,
                filter,
                payload.len(),
                smask_ref
            ),
            &payload,
        )
    }

    fn info_dictionary(&self) -> Option<String> {
        let m = &self.metadata;
        if m.title.is_none() && m.subject.is_none() && m.created.is_none() {
            return None;
        }
        let mut info = String::from("<< ");
        if let Some(ref title) = m.title {
            let _ = write!(info, "/Title {} ", Self::write_string(title));
        }
        if let Some(ref subject) = m.subject {
            let _ = write!(info, "/Subject {} ", Self::write_string(subject));
        }
        if let Some(created) = m.created {
            let _ = write!(
                info,
                "/CreationDate (D:{}) ",
                created.format("%Y%m%d%H%M%S")
            );
        }
        info.push_str("/Producer (inspection-report) >>");
        Some(info)
    }

    fn serialize(objects: &[PdfObject], info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

/// Append a stream object and return its id.
fn push_stream(objects: &mut Vec<PdfObject>, dict: &str, payload: &[u8]) -> usize {
    let id = objects.len();
    let mut data = Vec::with_capacity(dict.len() + payload.len() + 20);
    data.extend_from_slice(dict.as_bytes());
    data.extend_from_slice(b"\nstream\n");
    data.extend_from_slice(payload);
    data.extend_from_slice(b"\nendstream");
    objects.push(PdfObject { data });
    id
}

fn push_object(objects: &mut Vec<PdfObject>, data: String) -> usize {
    objects.push(PdfObject {
        data: data.into_bytes(),
    });
    objects.len() - 1
}

fn set_fill(stream: &mut String, c: Color) {
    let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", c.r, c.g, c.b);
}

impl DocumentSink for PdfSink {
    fn add_page(&mut self) -> Result<(), SinkError> {
        self.pages.push(PageContent::default());
        self.current = Some(self.pages.len() - 1);
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, fill: Color) -> Result<(), SinkError> {
        let y = self.flip(rect.bottom());
        let page = self.page_mut()?;
        page.stream.push_str("q\n");
        set_fill(&mut page.stream, fill);
        let _ = write!(
            page.stream,
            "{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
            rect.x, y, rect.width, rect.height
        );
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        options: &TextOptions,
    ) -> Result<(), SinkError> {
        let font = &options.font;
        let lines = match options.width {
            Some(width) => self.layout.break_into_lines(&self.fonts, text, font, width),
            None => self.layout.break_into_lines(&self.fonts, text, font, f64::INFINITY),
        };
        let standard = self.fonts.resolve(font);
        let font_idx = self.font_index(standard);
        let advance = font.line_advance();
        // Center the glyph box inside the line box.
        let baseline_offset = (advance - font.size) / 2.0 + font.size * ASCENT;

        let mut ops = String::new();
        ops.push_str("BT\n");
        set_fill(&mut ops, options.color);
        let _ = writeln!(ops, "/F{} {:.1} Tf", font_idx, font.size);
        for (k, line) in lines.iter().enumerate() {
            let slack = options.width.map(|w| w - line.width).unwrap_or(0.0);
            let line_x = match options.align {
                TextAlign::Left => x,
                TextAlign::Center => x + slack / 2.0,
                TextAlign::Right => x + slack,
            };
            let baseline = self.flip(y + k as f64 * advance + baseline_offset);
            let _ = writeln!(
                ops,
                "1 0 0 1 {:.2} {:.2} Tm\n{} Tj",
                line_x,
                baseline,
                Self::write_string(&line.text)
            );
        }
        ops.push_str("ET\n");

        self.page_mut()?.stream.push_str(&ops);
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    ) -> Result<(), SinkError> {
        let (y1, y2) = (self.flip(from.1), self.flip(to.1));
        let page = self.page_mut()?;
        let c = style.color;
        let _ = write!(
            page.stream,
            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            c.r, c.g, c.b, style.width, from.0, y1, to.0, y2
        );
        Ok(())
    }

    fn draw_image(&mut self, src: &str, x: f64, y: f64, width: f64) -> Result<(), SinkError> {
        if self.current.is_none() {
            return Err(SinkError::NoPage);
        }
        let index = self.image_index(src)?;
        let height = self.images[index].1.height_for_width(width);
        let pdf_y = self.flip(y + height);
        let page = self.page_mut()?;
        if !page.images.contains(&index) {
            page.images.push(index);
        }
        let _ = write!(
            page.stream,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            width, height, x, pdf_y, index
        );
        Ok(())
    }

    fn switch_to_page(&mut self, index: usize) -> Result<(), SinkError> {
        if index >= self.pages.len() {
            return Err(SinkError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = Some(index);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> Option<usize> {
        self.current
    }

    fn finish(self) -> Result<Vec<u8>, SinkError> {
        if self.pages.is_empty() {
            return Err(SinkError::Finalize("document has no pages".into()));
        }

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut objects: Vec<PdfObject> = vec![
            PdfObject { data: vec![] },
            PdfObject {
                data: b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            },
            PdfObject { data: vec![] },
        ];

        let font_ids: Vec<usize> = self
            .used_fonts
            .iter()
            .map(|font| {
                push_object(
                    &mut objects,
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    ),
                )
            })
            .collect();
        let font_resources = font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|(_, image)| Self::write_image_xobject(&mut objects, image))
            .collect();

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let compressed = compress_to_vec_zlib(page.stream.as_bytes(), 6);
            let content_id = push_stream(
                &mut objects,
                &format!("<< /Length {} /Filter /FlateDecode >>", compressed.len()),
                &compressed,
            );

            let mut resources = format!("/Font << {} >>", font_resources);
            if !page.images.is_empty() {
                let xobjects = page
                    .images
                    .iter()
                    .map(|&i| format!("/Im{} {} 0 R", i, image_ids[i]))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            page_ids.push(push_object(
                &mut objects,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << {} >> >>",
                    self.width, self.height, content_id, resources
                ),
            ));
        }

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let info_id = self
            .info_dictionary()
            .map(|info| push_object(&mut objects, info));

        Ok(Self::serialize(&objects, info_id))
    }
}

/// Map a Unicode codepoint to a WinAnsiEncoding (Windows-1252) byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    let byte = match cp {
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}
