//! Debug utilities for rendering raw octets.

const PRINTABLE: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ";

const ROW: usize = 20;

/// Formats a byte slice as a table: a separator row, a row of decimal byte
/// values and a row of the matching printable characters (`---` otherwise).
///
/// # Example
///
/// ```
/// use rootio_buffers::print_octet_table;
///
/// let table = print_octet_table(b"Hi\n");
/// let lines: Vec<&str> = table.lines().collect();
/// assert_eq!(lines[1], " 72 105  10");
/// assert_eq!(lines[2], "  H   i ---");
/// ```
pub fn print_octet_table(octets: &[u8]) -> String {
    let mut out = String::new();
    for row in octets.chunks(ROW) {
        out.push_str(&"--+-".repeat(ROW));
        out.push('\n');
        let values: Vec<String> = row.iter().map(|byte| format!("{:3}", byte)).collect();
        out.push_str(&values.join(" "));
        out.push('\n');
        let chars: Vec<String> = row
            .iter()
            .map(|byte| {
                if PRINTABLE.contains(byte) {
                    format!("{:>3}", *byte as char)
                } else {
                    "---".to_owned()
                }
            })
            .collect();
        out.push_str(&chars.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_wraps_rows() {
        let data = vec![b'a'; 25];
        let table = print_octet_table(&data);
        assert_eq!(table.lines().count(), 6);
        assert_eq!(table.lines().nth(4).unwrap(), " 97  97  97  97  97");
    }

    #[test]
    fn test_table_empty() {
        assert_eq!(print_octet_table(&[]), "");
    }
}
