use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::GazetteError;

const UTF8_BOM: &str = "\u{feff}";

/// Load a gazette as text. Only `.txt` files are accepted.
pub fn read(path: &Path) -> Result<String, GazetteError> {
    let is_txt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Err(GazetteError::UnsupportedInput {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| GazetteError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read gazette");
    decode(path, bytes)
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, GazetteError> {
    let text = String::from_utf8(bytes).map_err(|_| GazetteError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tmp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("gazette_doc_{}_{}", std::process::id(), name));
        fs::write(&p, bytes).unwrap();
        p
    }

    #[test]
    fn reads_fixture() {
        let text = read(Path::new("tests/fixtures/single.txt")).unwrap();
        assert!(text.starts_with("12345678 F JOHN DOE"));
    }

    #[test]
    fn rejects_other_extensions() {
        let err = read(Path::new("results.pdf")).unwrap_err();
        assert!(matches!(err, GazetteError::UnsupportedInput { .. }));
        assert!(read(Path::new("no_extension")).is_err());
    }

    #[test]
    fn extension_is_case_insensitive() {
        let p = tmp_file("upper.TXT", b"hello");
        assert_eq!(read(&p).unwrap(), "hello");
        fs::remove_file(p).ok();
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = read(Path::new("tests/fixtures/does_not_exist.txt")).unwrap_err();
        assert!(matches!(err, GazetteError::Read { .. }));
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let p = tmp_file("bad.txt", &[0x31, 0xff, 0xfe, 0x32]);
        assert!(matches!(read(&p), Err(GazetteError::Decode { .. })));
        fs::remove_file(p).ok();
    }

    #[test]
    fn strips_bom() {
        let p = tmp_file("bom.txt", "\u{feff}12345678 F A 101".as_bytes());
        assert_eq!(read(&p).unwrap(), "12345678 F A 101");
        fs::remove_file(p).ok();
    }
}
