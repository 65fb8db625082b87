//! Resource interning: stable `/Fnt<n>`, `/Img<n>` and `/Trp<n>` ids for
//! fonts, image XObjects and transparency levels used by the page.

use super::object::{ObjId, PdfDict, PdfValue};
use crate::graphics::FontSpec;

pub(crate) struct Resources {
    fonts: Vec<(FontSpec, String)>,
    /// Keyed by raster identity (the `Arc` pointer), not content.
    images: Vec<(usize, String, ObjId)>,
    transparencies: Vec<(u64, String)>,
}

impl Resources {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            images: Vec::new(),
            transparencies: Vec::new(),
        }
    }

    /// Id for a font, interned by value equality.
    pub fn font_id(&mut self, font: &FontSpec) -> String {
        if let Some((_, id)) = self.fonts.iter().find(|(known, _)| known == font) {
            return id.clone();
        }
        let id = format!("Fnt{}", self.fonts.len());
        self.fonts.push((font.clone(), id.clone()));
        id
    }

    /// Id of an already-registered raster, by identity.
    pub fn image_id(&self, key: usize) -> Option<String> {
        self.images
            .iter()
            .find(|(known, _, _)| *known == key)
            .map(|(_, id, _)| id.clone())
    }

    pub fn register_image(&mut self, key: usize, object: ObjId) -> String {
        let id = format!("Img{}", self.images.len());
        self.images.push((key, id.clone(), object));
        id
    }

    /// Id for an ExtGState carrying a constant-alpha level.
    pub fn transparency_id(&mut self, alpha: f64) -> String {
        let key = alpha.to_bits();
        if let Some((_, id)) = self.transparencies.iter().find(|(known, _)| *known == key) {
            return id.clone();
        }
        let id = format!("Trp{}", self.transparencies.len());
        self.transparencies.push((key, id.clone()));
        id
    }

    pub fn to_dict(&self) -> PdfDict {
        let mut dict = PdfDict::new();
        dict.set(
            "ProcSet",
            PdfValue::Array(
                ["PDF", "Text", "ImageB", "ImageC", "ImageI"]
                    .into_iter()
                    .map(PdfValue::name)
                    .collect(),
            ),
        );
        if !self.fonts.is_empty() {
            let mut fonts = PdfDict::new();
            for (font, id) in &self.fonts {
                let mut entry = PdfDict::new();
                entry.set("Type", PdfValue::name("Font"));
                entry.set("Subtype", PdfValue::name("TrueType"));
                entry.set("Encoding", PdfValue::name("WinAnsiEncoding"));
                entry.set("BaseFont", PdfValue::name(font.ps_name()));
                fonts.set(id.clone(), PdfValue::Dict(entry));
            }
            dict.set("Font", PdfValue::Dict(fonts));
        }
        if !self.transparencies.is_empty() {
            let mut states = PdfDict::new();
            for (bits, id) in &self.transparencies {
                let alpha = f64::from_bits(*bits);
                let mut entry = PdfDict::new();
                entry.set("Type", PdfValue::name("ExtGState"));
                entry.set("ca", PdfValue::Real(alpha));
                entry.set("CA", PdfValue::Real(alpha));
                states.set(id.clone(), PdfValue::Dict(entry));
            }
            dict.set("ExtGState", PdfValue::Dict(states));
        }
        if !self.images.is_empty() {
            let mut xobjects = PdfDict::new();
            for (_, id, object) in &self.images {
                xobjects.set(id.clone(), PdfValue::Ref(*object));
            }
            dict.set("XObject", PdfValue::Dict(xobjects));
        }
        dict
    }
}
