use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, RosterError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode `bytes` with the first encoding in `labels` that accepts them
/// without replacement characters. Returns the text and the label used.
///
/// `utf-8-sig` strips a leading BOM before strict UTF-8 decoding; every
/// other label goes through `encoding_rs`'s WHATWG label lookup, so
/// `latin-1` and `iso-8859-1` both resolve to windows-1252.
pub fn decode_bytes<'a>(bytes: &[u8], labels: &'a [String]) -> Result<Option<(String, &'a str)>> {
    for label in labels {
        if let Some(text) = decode_with(bytes, label)? {
            return Ok(Some((text.into_owned(), label.as_str())));
        }
        debug!(encoding = %label, "Encoding rejected input");
    }
    Ok(None)
}

fn decode_with<'b>(bytes: &'b [u8], label: &str) -> Result<Option<Cow<'b, str>>> {
    let normalized = label.trim().to_ascii_lowercase();
    if normalized == "utf-8-sig" || normalized == "utf8-sig" {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        return Ok(UTF_8.decode_without_bom_handling_and_without_replacement(body));
    }
    let encoding = Encoding::for_label(normalized.as_bytes())
        .ok_or_else(|| RosterError::Config(format!("Unknown encoding label '{label}'")))?;
    Ok(encoding.decode_without_bom_handling_and_without_replacement(bytes))
}

/// Read a file and decode it through the encoding fallback chain
pub fn read_text(path: &Path, labels: &[String]) -> Result<String> {
    let bytes = fs::read(path)?;
    match decode_bytes(&bytes, labels)? {
        Some((text, used)) => {
            if labels.first().map(String::as_str) != Some(used) {
                warn!(path = %path.display(), encoding = used, "Decoded with fallback encoding");
            }
            Ok(text)
        }
        None => Err(RosterError::Encoding {
            path: path.display().to_string(),
            tried: labels.join(", "),
        }),
    }
}
