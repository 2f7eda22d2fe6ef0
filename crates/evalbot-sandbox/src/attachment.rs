//! Python source files attached to an eval command.
//!
//! Discord reports a `.py` upload as `text/x-python; charset=<name>`. When the
//! command has no inline code, such an attachment is run as-is without going
//! through markdown extraction.

use tracing::warn;

const PYTHON_CONTENT_TYPE: &str = "text/x-python; charset=";

/// The charset named by a Python-source content type, or `None` when the
/// content type is something else.
pub fn python_charset(content_type: &str) -> Option<&str> {
    let rest = content_type.strip_prefix(PYTHON_CONTENT_TYPE)?;
    let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-' || *b == b'_')
        .count();
    (len > 0).then(|| &rest[..len])
}

/// Decode attachment bytes with the charset Discord declared.
///
/// Charset names are normalised the way Python codec lookup does it
/// (lowercase, separators folded to `_`), so `utf-8`, `utf_8` and `utf8` are
/// one codec. Only `utf-8-sig` and `utf-16` consume a byte-order mark.
/// Undecodable bytes or an unsupported charset yield `None`.
pub fn decode_source(bytes: &[u8], charset: &str) -> Option<String> {
    let name = normalize_charset(charset);
    let decoded = match name.as_str() {
        "utf_8" | "utf8" | "u8" | "utf" | "cp65001" => decode_utf8(bytes),
        "utf_8_sig" => decode_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)),
        "ascii" | "us_ascii" | "646" => bytes
            .is_ascii()
            .then(|| bytes.iter().map(|&b| b as char).collect()),
        "latin_1" | "latin1" | "latin" | "l1" | "iso8859_1" | "iso_8859_1" | "8859"
        | "cp819" => Some(bytes.iter().map(|&b| b as char).collect()),
        "cp1252" | "windows_1252" | "1252" => decode_cp1252(bytes),
        "utf_16" | "utf16" | "u16" => decode_utf16_with_bom(bytes),
        "utf_16_le" | "utf_16le" => decode_utf16(bytes, u16::from_le_bytes),
        "utf_16_be" | "utf_16be" => decode_utf16(bytes, u16::from_be_bytes),
        _ => {
            warn!(charset, "unsupported attachment charset");
            return None;
        }
    };
    if decoded.is_none() {
        warn!(charset, "attachment does not decode with its declared charset");
    }
    decoded
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn normalize_charset(charset: &str) -> String {
    charset
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// Code points for 0x80..=0x9F; zero marks bytes the codec leaves undefined.
const CP1252_HIGH: [u16; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => match CP1252_HIGH[usize::from(b - 0x80)] {
                0 => None,
                cp => char::from_u32(u32::from(cp)),
            },
            _ => Some(b as char),
        })
        .collect()
}

fn decode_utf16_with_bom(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => decode_utf16(bytes, u16::from_le_bytes),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Code from one attachment, if it is a decodable Python source file.
pub fn code_from_attachment(content_type: Option<&str>, bytes: &[u8]) -> Option<String> {
    let charset = python_charset(content_type?)?;
    decode_source(bytes, charset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_python_content_type() {
        assert_eq!(python_charset("text/x-python; charset=utf-8"), Some("utf-8"));
        assert_eq!(python_charset("text/x-python; charset=iso-8859-1"), Some("iso-8859-1"));
    }

    #[test]
    fn other_content_types_are_rejected() {
        assert_eq!(python_charset("text/plain; charset=utf-8"), None);
        assert_eq!(python_charset("text/x-python"), None);
        assert_eq!(python_charset("text/x-python; charset="), None);
        assert_eq!(python_charset("TEXT/X-PYTHON; charset=utf-8"), None);
    }

    #[test]
    fn utf8_source_keeps_bom_like_the_plain_codec() {
        let bytes = "\u{FEFF}print('é')".as_bytes();
        assert_eq!(decode_source(bytes, "utf-8").as_deref(), Some("\u{FEFF}print('é')"));
        assert_eq!(decode_source(bytes, "utf-8-sig").as_deref(), Some("print('é')"));
    }

    #[test]
    fn charset_spellings_share_a_codec() {
        for name in ["utf-8", "utf_8", "utf8", "u8"] {
            assert_eq!(decode_source(b"x = 1", name).as_deref(), Some("x = 1"), "{name}");
        }
        assert_eq!(decode_source(&[0xe9], "iso-8859-1").as_deref(), Some("é"));
    }

    #[test]
    fn utf16_follows_byte_order_mark() {
        let le = [0xFF, 0xFE, b'h', 0, b'i', 0];
        let be = [0xFE, 0xFF, 0, b'h', 0, b'i'];
        assert_eq!(decode_source(&le, "utf-16").as_deref(), Some("hi"));
        assert_eq!(decode_source(&be, "utf-16").as_deref(), Some("hi"));
        assert_eq!(decode_source(&[b'h', 0], "utf-16").as_deref(), Some("h"));
        assert_eq!(decode_source(&[0, b'h'], "utf-16-be").as_deref(), Some("h"));
        assert_eq!(decode_source(&[b'h', 0, b'i'], "utf-16-le"), None);
    }

    #[test]
    fn cp1252_maps_high_bytes_and_rejects_holes() {
        assert_eq!(decode_source(&[0x80, b'5'], "cp1252").as_deref(), Some("€5"));
        assert_eq!(decode_source(&[0x93, 0x94], "windows-1252").as_deref(), Some("\u{201C}\u{201D}"));
        assert_eq!(decode_source(&[0x81], "cp1252"), None);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(decode_source(&[0xff, 0xfe, 0x00], "utf-8"), None);
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        assert_eq!(decode_source(&[b'x', 0xe9], "latin-1").as_deref(), Some("xé"));
    }

    #[test]
    fn unknown_charset_yields_nothing() {
        assert_eq!(decode_source(b"print(1)", "koi8-r"), None);
    }

    #[test]
    fn attachment_without_content_type_is_skipped() {
        assert_eq!(code_from_attachment(None, b"print(1)"), None);
        assert_eq!(
            code_from_attachment(Some("text/x-python; charset=utf-8"), b"print(1)").as_deref(),
            Some("print(1)")
        );
    }
}
