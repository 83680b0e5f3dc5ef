// src/read/mod.rs
pub mod encoding;
pub mod sheet;

use crate::error::{PipelineError, Result};
use crate::table::RawTable;
use csv::ReaderBuilder;
use std::{fs, path::Path};
use tracing::{debug, info};

pub use encoding::{SourceEncoding, DEFAULT_ENCODINGS};

/// Open a CSV or spreadsheet file as a [`RawTable`].
///
/// Delimited files are decoded with each of `encodings` in order and the first
/// one that decodes without a malformed sequence wins. That is a heuristic: a
/// wrong encoding that happens to decode is accepted, so put the most likely
/// encoding for the data's locale first. Spreadsheets ignore `encodings`.
///
/// Header names come back stripped of whitespace whichever encoding succeeded.
#[tracing::instrument(level = "info", skip(path, encodings), fields(path = %path.as_ref().display()))]
pub fn read_table<P: AsRef<Path>>(path: P, encodings: &[SourceEncoding]) -> Result<RawTable> {
    let path = path.as_ref();
    if sheet::is_spreadsheet(path) {
        return sheet::read_first_sheet(path);
    }

    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut attempted = Vec::with_capacity(encodings.len());
    for enc in encodings {
        attempted.push(enc.label().to_string());
        match enc.decode(&bytes) {
            Some(text) => {
                info!(encoding = %enc, bytes = bytes.len(), "decoded");
                return parse_delimited(path, &text, enc.label());
            }
            None => debug!(encoding = %enc, "decode failed, trying next"),
        }
    }

    Err(PipelineError::Decode {
        path: path.to_path_buf(),
        attempted,
    })
}

/// [`read_table`] with [`DEFAULT_ENCODINGS`].
pub fn read_table_default<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    read_table(path, &DEFAULT_ENCODINGS)
}

/// Parse already-decoded comma-separated text; the first record is the header.
pub fn parse_delimited(path: &Path, text: &str, decoded_as: &str) -> Result<RawTable> {
    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // ragged rows are padded by RawTable::new
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows, decoded_as))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use encoding_rs::EUC_KR;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CRIME_CSV: &str = " 경찰서명 ,CCTV설치수,살인,강도,성범죄,폭력\n중부서,10,1,2,3,4\n";

    fn write_tmp(bytes: &[u8]) -> Result<NamedTempFile> {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile()?;
        tmp.write_all(bytes)?;
        Ok(tmp)
    }

    #[test]
    fn headers_identical_across_encodings() -> Result<()> {
        let mut with_bom = b"\xEF\xBB\xBF".to_vec();
        with_bom.extend_from_slice(CRIME_CSV.as_bytes());
        let (cp949, _, _) = EUC_KR.encode(CRIME_CSV);

        let sig = read_table_default(write_tmp(&with_bom)?.path())?;
        let korean = read_table_default(write_tmp(&cp949)?.path())?;
        // plain utf-8 alone, BOM included, still yields the same names
        let plain = read_table(write_tmp(&with_bom)?.path(), &[SourceEncoding::Utf8])?;

        assert_eq!(sig.decoded_as, "utf-8-sig");
        assert_eq!(korean.decoded_as, "cp949");
        assert_eq!(plain.decoded_as, "utf-8");
        assert_eq!(sig.headers[0], "경찰서명");
        assert_eq!(sig.headers, korean.headers);
        assert_eq!(sig.headers, plain.headers);
        assert_eq!(sig.rows, korean.rows);
        Ok(())
    }

    #[test]
    fn all_encodings_failing_is_decode_error() -> Result<()> {
        let tmp = write_tmp(b"a,b\n\xff\xff,1\n")?;
        let err = read_table_default(tmp.path()).unwrap_err();
        match &err {
            PipelineError::Decode { path, attempted } => {
                assert_eq!(path, tmp.path());
                assert_eq!(attempted, &vec!["utf-8-sig", "cp949", "utf-8"]);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("utf-8-sig, cp949, utf-8"));
        Ok(())
    }

    #[test]
    fn latin1_fallback_accepts_anything() -> Result<()> {
        let tmp = write_tmp(b"name,total\n\xe9t\xe9,3\n")?;
        let table = read_table(
            tmp.path(),
            &[SourceEncoding::Utf8, SourceEncoding::Latin1],
        )?;
        assert_eq!(table.decoded_as, "latin-1");
        assert_eq!(table.rows[0][0], "été");
        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_table_default("no/such/file.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn ragged_rows_are_padded() -> Result<()> {
        let tmp = write_tmp("지역,합계,비고\n동래,5\n".as_bytes())?;
        let table = read_table_default(tmp.path())?;
        assert_eq!(table.rows[0], vec!["동래", "5", ""]);
        Ok(())
    }
}
