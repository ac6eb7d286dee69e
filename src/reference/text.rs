//! Whitespace-delimited numeric matrices
//!
//! Reference slices are plain text, one row per G-vector. G-vector files hold
//! three integer columns (`%4d %4d %4d`), coefficient files hold the real and
//! imaginary parts (`%13.6e %13.6e`).

use anyhow::{Context, Result};
use ndarray::{Array2, ArrayView2};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Parse a numeric matrix from text
///
/// Blank lines and lines starting with `#` are skipped. Every remaining line
/// must have the same number of columns (`ncols` when given).
pub fn parse_matrix(text: &str, ncols: Option<usize>) -> Result<Array2<f64>> {
    parse_lines(
        text.lines().map(|l| Ok::<_, std::convert::Infallible>(l.to_string())),
        ncols,
    )
}

/// Load a numeric matrix from a text file
pub fn load_matrix<P: AsRef<Path>>(path: P, ncols: Option<usize>) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open reference file: {:?}", path))?;
    let reader = BufReader::new(file);
    parse_lines(reader.lines(), ncols).with_context(|| format!("Failed to parse reference file: {:?}", path))
}

fn parse_lines<I, E>(lines: I, ncols: Option<usize>) -> Result<Array2<f64>>
where
    I: Iterator<Item = std::result::Result<String, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut data = Vec::new();
    let mut width = ncols;
    let mut nrows = 0usize;

    for (i, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let start = data.len();
        for token in line.split_whitespace() {
            let value = token
                .parse::<f64>()
                .with_context(|| format!("line {}: invalid number '{}'", i + 1, token))?;
            data.push(value);
        }

        let found = data.len() - start;
        match width {
            Some(w) if w != found => {
                anyhow::bail!("line {}: expected {} columns, found {}", i + 1, w, found)
            }
            Some(_) => {}
            None => width = Some(found),
        }
        nrows += 1;
    }

    let width = width.unwrap_or(0);
    Ok(Array2::from_shape_vec((nrows, width), data)?)
}

/// Format like C's `%W.Pe`: mantissa with `precision` digits and a signed,
/// at least two-digit exponent, right-aligned to `width`
pub fn format_sci(value: f64, width: usize, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{:>width$}", value, width = width);
    }
    let rust = format!("{:.*e}", precision, value);
    let formatted = match rust.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rust,
    };
    format!("{:>width$}", formatted, width = width)
}

/// Write one k-point's G-vectors as `%4d %4d %4d` rows
pub fn write_gvecs<P: AsRef<Path>>(path: P, gvecs: ArrayView2<'_, i32>) -> Result<()> {
    let path = path.as_ref();
    let mut out = create(path)?;
    for row in gvecs.rows() {
        let line = row.iter().map(|g| format!("{:4}", g)).collect::<Vec<_>>().join(" ");
        writeln!(out, "{}", line)?;
    }
    out.flush().with_context(|| format!("Failed to write {:?}", path))
}

/// Write one band's coefficients as `%13.6e %13.6e` rows
pub fn write_coeffs<P: AsRef<Path>>(path: P, coeffs: ArrayView2<'_, f64>) -> Result<()> {
    let path = path.as_ref();
    let mut out = create(path)?;
    for row in coeffs.rows() {
        let line = row.iter().map(|&c| format_sci(c, 13, 6)).collect::<Vec<_>>().join(" ");
        writeln!(out, "{}", line)?;
    }
    out.flush().with_context(|| format!("Failed to write {:?}", path))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_matrix() {
        let text = "   1   0  -2\n\n# comment\n   0   1   3\n";
        let m = parse_matrix(text, Some(3)).unwrap();
        assert_eq!(m, array![[1.0, 0.0, -2.0], [0.0, 1.0, 3.0]]);
    }

    #[test]
    fn test_parse_matrix_infers_width() {
        let m = parse_matrix("1.5e-01 -2.0e+00\n3 4\n", None).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[0, 1]], -2.0);
    }

    #[test]
    fn test_parse_matrix_ragged() {
        let err = parse_matrix("1 2 3\n4 5\n", None).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_matrix_wrong_width() {
        assert!(parse_matrix("1 2\n", Some(3)).is_err());
    }

    #[test]
    fn test_parse_matrix_bad_number() {
        let err = parse_matrix("1 x 3\n", None).unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_parse_empty() {
        let m = parse_matrix("", Some(2)).unwrap();
        assert_eq!(m.shape(), &[0, 2]);
    }

    #[test]
    fn test_format_sci_matches_c() {
        assert_eq!(format_sci(0.0, 13, 6), " 0.000000e+00");
        assert_eq!(format_sci(-0.123456789, 13, 6), "-1.234568e-01");
        assert_eq!(format_sci(12345.0, 13, 6), " 1.234500e+04");
        assert_eq!(format_sci(1e-120, 13, 6), "1.000000e-120");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_matrix(dir.path().join("nope.dat"), None).unwrap_err();
        assert!(err.to_string().contains("Failed to open reference file"));
    }

    #[test]
    fn test_write_then_load_coeffs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coeffs.dat");
        let cg = array![[0.25, -1.0e-3], [3.0, 0.0]];
        write_coeffs(&path, cg.view()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next().unwrap(), " 2.500000e-01 -1.000000e-03");

        let loaded = load_matrix(&path, Some(2)).unwrap();
        assert_eq!(loaded, cg);
    }

    #[test]
    fn test_write_gvecs_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gvecs.dat");
        write_gvecs(&path, array![[0, -1, 12]].view()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "   0   -1   12\n");
    }
}
