//! The backend-local PDF object model: a tiny value tree plus the flat
//! object arena whose 1-based indices double as object numbers in the
//! cross-reference table.

use crate::fmt;
use std::io::{self, Write};

/// Handle into the document's object arena; the wrapped index is the
/// 1-based PDF object number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub(crate) usize);

impl ObjId {
    pub fn number(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Name(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    Array(Vec<PdfValue>),
    Dict(PdfDict),
    Ref(ObjId),
}

impl PdfValue {
    pub fn name(name: impl Into<String>) -> Self {
        PdfValue::Name(name.into())
    }

    pub(crate) fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            PdfValue::Name(name) => write!(out, "/{name}"),
            PdfValue::Int(value) => write!(out, "{value}"),
            PdfValue::Real(value) => write!(out, "{}", fmt::num(*value)),
            PdfValue::Bool(value) => write!(out, "{value}"),
            PdfValue::Array(items) => {
                out.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.write_all(b" ")?;
                    }
                    item.write(out)?;
                }
                out.write_all(b"]")
            }
            PdfValue::Dict(dict) => dict.write(out),
            PdfValue::Ref(id) => write!(out, "{} 0 R", id.0),
        }
    }
}

/// Insertion-ordered dictionary; PDF consumers do not care about key
/// order but deterministic output keeps documents diffable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfDict(Vec<(String, PdfValue)>);

impl PdfDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: PdfValue) {
        let key = key.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&PdfValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(b"<<\n")?;
        for (key, value) in &self.0 {
            write!(out, "/{key} ")?;
            value.write(out)?;
            out.write_all(b"\n")?;
        }
        out.write_all(b">>")
    }
}

/// One arena slot: a plain dictionary object or a stream object. Stream
/// dictionaries receive their `/Length` (and `/Filter`) entries at write
/// time so construction never has to back-patch byte counts.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Dict(PdfDict),
    Stream {
        dict: PdfDict,
        data: Vec<u8>,
        flate: bool,
    },
}

impl PdfObject {
    pub(crate) fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            PdfObject::Dict(dict) => {
                dict.write(out)?;
                out.write_all(b"\n")
            }
            PdfObject::Stream { dict, data, flate } => {
                let mut dict = dict.clone();
                dict.set("Length", PdfValue::Int(data.len() as i64));
                if *flate {
                    dict.set("Filter", PdfValue::name("FlateDecode"));
                }
                dict.write(out)?;
                out.write_all(b"\nstream\n")?;
                out.write_all(data)?;
                out.write_all(b"\nendstream\n")
            }
        }
    }
}
