//! # Font Management
//!
//! Resolving a [`FontSpec`] to one of the standard PDF fonts and measuring
//! strings with its metrics.
//!
//! Only standard fonts are supported; they need no embedding, so the PDF
//! sink and the measurer agree on widths by construction. Unknown families
//! fall back to Helvetica.

pub mod metrics;

use std::collections::HashMap;

pub use metrics::StandardFontMetrics;

use crate::style::FontSpec;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    /// Snapped to 400 or 700.
    pub weight: u32,
}

/// The standard PDF fonts the engine can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold => StandardFontMetrics::COURIER,
        }
    }
}

/// Maps family + weight to a standard font.
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let standard_mappings = [
            (("Helvetica", 400), StandardFont::Helvetica),
            (("Helvetica", 700), StandardFont::HelveticaBold),
            (("Courier", 400), StandardFont::Courier),
            (("Courier", 700), StandardFont::CourierBold),
        ];

        let fonts = standard_mappings
            .into_iter()
            .map(|((family, weight), font)| {
                (
                    FontKey {
                        family: family.to_string(),
                        weight,
                    },
                    font,
                )
            })
            .collect();

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if the family is unknown.
    pub fn resolve(&self, family: &str, weight: u32) -> StandardFont {
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
        };
        match self.fonts.get(&key) {
            Some(font) => *font,
            None if snapped_weight == 700 => StandardFont::HelveticaBold,
            None => StandardFont::Helvetica,
        }
    }
}

/// Shared font context used by measurement and PDF output.
#[derive(Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, font: &FontSpec) -> StandardFont {
        self.registry.resolve(&font.family, font.weight)
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: &FontSpec) -> f64 {
        self.resolve(font).metrics().char_width(ch, font.size)
    }

    /// Measure the width of a single-line string in points.
    pub fn measure_string(&self, text: &str, font: &FontSpec) -> f64 {
        self.resolve(font).metrics().measure_string(text, font.size)
    }
}
