//! Format selection and the document contract shared by all backends.

use crate::{command::CommandSequence, page::PageSize};
use std::io::{self, Write};

/// A fully built output document.
pub trait Document {
    /// Serializes the complete document. On error the partially written
    /// output is the caller's to discard; no cleanup is attempted here.
    fn write(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Whether internal streams are Flate-compressed.
    fn is_compressed(&self) -> bool;
}

/// Builds a [`Document`] from a recorded command sequence and a page size.
pub trait Processor {
    fn process(
        &self,
        commands: &CommandSequence,
        page_size: PageSize,
    ) -> Result<Box<dyn Document>, ProcessorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("unknown format {0:?}")]
    UnknownFormat(String),
    #[error(transparent)]
    Pdf(#[from] crate::pdf::PdfError),
}

/// Maps a format name to its processor: `"eps"`, `"pdf"` (compressed) or
/// `"svg"`.
pub fn processor(format: &str) -> Result<Box<dyn Processor>, ProcessorError> {
    match format {
        "eps" => Ok(Box::new(crate::eps::EpsProcessor)),
        "pdf" => Ok(Box::new(crate::pdf::PdfProcessor::new(true))),
        "svg" => Ok(Box::new(crate::svg::SvgProcessor)),
        other => Err(ProcessorError::UnknownFormat(other.to_owned())),
    }
}

#[cfg(test)]
mod tests;
