// src/read/encoding.rs

use encoding_rs::{EUC_KR, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Text encodings tried when opening a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceEncoding {
    /// UTF-8, with an optional leading byte-order mark that is dropped.
    Utf8Sig,
    /// Windows code page 949 (unified Hangul), the usual Korean public-data export.
    Cp949,
    /// Plain UTF-8; a byte-order mark is kept as a character.
    Utf8,
    /// Strict EUC-KR: only KS X 1001 two-byte sequences are accepted.
    EucKr,
    /// ISO-8859-1 family; decodes any input, so only useful as a last resort.
    Latin1,
}

/// Attempt order used when a caller has no preference.
pub const DEFAULT_ENCODINGS: [SourceEncoding; 3] = [
    SourceEncoding::Utf8Sig,
    SourceEncoding::Cp949,
    SourceEncoding::Utf8,
];

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8Sig => "utf-8-sig",
            SourceEncoding::Cp949 => "cp949",
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::EucKr => "euc-kr",
            SourceEncoding::Latin1 => "latin-1",
        }
    }

    /// Decode the whole buffer, or `None` on the first malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|s| s.into_owned())
            }
            SourceEncoding::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
            // encoding_rs' EUC-KR is the WHATWG definition, i.e. windows-949.
            SourceEncoding::Cp949 => EUC_KR
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
            SourceEncoding::EucKr => {
                if !is_strict_euc_kr(bytes) {
                    return None;
                }
                EUC_KR
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|s| s.into_owned())
            }
            SourceEncoding::Latin1 => {
                let (text, _, _) = WINDOWS_1252.decode(bytes);
                Some(text.into_owned())
            }
        }
    }
}

/// Every non-ASCII byte must start a lead/trail pair in 0xA1..=0xFE.
fn is_strict_euc_kr(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < 0x80 {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(&t) if (0xA1..=0xFE).contains(&b) && (0xA1..=0xFE).contains(&t) => i += 2,
            _ => return false,
        }
    }
    true
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8-sig" | "utf8-sig" => Ok(SourceEncoding::Utf8Sig),
            "cp949" | "windows-949" | "uhc" => Ok(SourceEncoding::Cp949),
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            "euc-kr" | "euckr" => Ok(SourceEncoding::EucKr),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(SourceEncoding::Latin1),
            other => Err(format!("unknown encoding `{}`", other)),
        }
    }
}

impl TryFrom<String> for SourceEncoding {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceEncoding> for String {
    fn from(value: SourceEncoding) -> Self {
        value.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_sig_drops_bom_but_utf8_keeps_it() {
        let bytes = "\u{feff}지역,합계".as_bytes();
        assert_eq!(SourceEncoding::Utf8Sig.decode(bytes).unwrap(), "지역,합계");
        assert_eq!(
            SourceEncoding::Utf8.decode(bytes).unwrap(),
            "\u{feff}지역,합계"
        );
    }

    #[test]
    fn cp949_bytes_are_not_utf8() {
        let (bytes, _, _) = EUC_KR.encode("경찰서명,살인");
        assert!(SourceEncoding::Utf8Sig.decode(&bytes).is_none());
        assert_eq!(
            SourceEncoding::Cp949.decode(&bytes).as_deref(),
            Some("경찰서명,살인")
        );
        assert_eq!(
            SourceEncoding::EucKr.decode(&bytes).as_deref(),
            Some("경찰서명,살인")
        );
    }

    #[test]
    fn strict_euc_kr_rejects_uhc_extension() {
        // "똠" only exists in the CP949 extension range (lead 0x8C).
        let (bytes, _, _) = EUC_KR.encode("똠");
        assert!(SourceEncoding::Cp949.decode(&bytes).is_some());
        assert!(SourceEncoding::EucKr.decode(&bytes).is_none());
    }

    #[test]
    fn latin1_never_fails() {
        assert!(SourceEncoding::Latin1.decode(b"\xff\xfe\x80").is_some());
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for enc in [
            SourceEncoding::Utf8Sig,
            SourceEncoding::Cp949,
            SourceEncoding::Utf8,
            SourceEncoding::EucKr,
            SourceEncoding::Latin1,
        ] {
            assert_eq!(enc.label().parse::<SourceEncoding>(), Ok(enc));
        }
        assert!("shift-jis".parse::<SourceEncoding>().is_err());
    }
}
