use std::io::Cursor;

use encoding_rs::{Encoding, UTF_8};

/// Decode XML bytes into a string for [`Dom::parse_bytes`](super::Dom::parse_bytes).
///
/// The encoding comes from a byte order mark or the XML declaration and is
/// UTF-8 when neither names one the decoder knows. A byte order mark wins
/// over the declaration and is not part of the result. Undecodable bytes
/// become U+FFFD.
pub(crate) fn decode(data: &[u8]) -> String {
    let declared = xhtmlchardet::detect(&mut Cursor::new(data), None)
        .ok()
        .and_then(|labels| {
            labels
                .iter()
                .find_map(|label| Encoding::for_label(label.as_bytes()))
        });
    let (text, _, _) = declared.unwrap_or(UTF_8).decode(data);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(b"<a>caf\xc3\xa9</a>".as_slice(), "<a>caf\u{e9}</a>")]
    #[case(b"\xef\xbb\xbf<a/>".as_slice(), "<a/>")]
    #[case(b"\xff\xfe<\x00a\x00/\x00>\x00".as_slice(), "<a/>")]
    #[case(b"<a>\xff</a>".as_slice(), "<a>\u{fffd}</a>")]
    fn test_decode(#[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(decode(data), expected);
    }

    #[test]
    fn test_declared_latin1_reads_as_windows_1252() {
        let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a>caf\xe9 \x80</a>";
        assert!(decode(data).ends_with("<a>caf\u{e9} \u{20ac}</a>"));
    }
}
