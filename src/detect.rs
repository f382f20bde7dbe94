//! PDF header sniffing, run before a document is handed to lopdf.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Read the `%PDF-x.y` header of a file and return the version string.
pub fn pdf_version_of_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = [0u8; 16];
    let read = File::open(path)?.read(&mut header)?;
    pdf_version(&header[..read])
}

/// Return the version string from the header bytes of a PDF.
///
/// Fails with [`Error::UnknownFormat`] when the magic is missing and with
/// [`Error::UnsupportedVersion`] when the version is not `<digit>.<digit>`.
pub fn pdf_version(data: &[u8]) -> Result<String> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version = rest.get(..3).ok_or(Error::UnknownFormat)?;

    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).into_owned())
        }
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).into_owned(),
        )),
    }
}

/// Whether the bytes start with a usable PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}
