// src/utils/csv.rs

//! CSV rendering.

use crate::error::{AppError, Result};

/// Encode a header row plus data rows into CSV bytes.
pub fn render<R, C>(headers: &[String], rows: R) -> Result<Vec<u8>>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: AsRef<[u8]>,
{
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_quotes_embedded_newlines() {
        let headers = vec!["name".to_string(), "individuals".to_string()];
        let rows = vec![vec!["Acme, Ltd".to_string(), "a: 1\n\na: 2".to_string()]];
        let bytes = render(&headers, rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,individuals\n\"Acme, Ltd\",\"a: 1\n\na: 2\"\n");
    }
}
