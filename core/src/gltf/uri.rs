//! URIs referenced by buffers and images.

/// How a [`Uri`] resolves to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriKind {
    /// Embedded `data:` URI.
    Data,
    /// Path relative to the document.
    File,
}

/// A URI string together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    pub string: String,
    pub kind: UriKind,
}

impl Uri {
    pub fn new(string: impl Into<String>) -> Self {
        let string = string.into();
        let kind = if string.starts_with("data:") {
            UriKind::Data
        } else {
            UriKind::File
        };
        Self { string, kind }
    }
}

/// Decodes a URL-encoded string.
///
/// `%XX` escapes become the encoded byte and `+` becomes a space. Escapes
/// that are not followed by two hexadecimal digits are kept verbatim.
pub fn decode_url(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut position = 0;
    while position < bytes.len() {
        match bytes[position] {
            b'%' if position + 2 < bytes.len() => {
                match (hex_value(bytes[position + 1]), hex_value(bytes[position + 2])) {
                    (Some(high), Some(low)) => {
                        decoded.push(high * 16 + low);
                        position += 3;
                    }
                    _ => {
                        decoded.push(b'%');
                        position += 1;
                    }
                }
            }
            b'+' => {
                decoded.push(b' ');
                position += 1;
            }
            byte => {
                decoded.push(byte);
                position += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
