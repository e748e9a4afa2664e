//! Dump command implementation

use crate::commands::load::load_image;
use hexflash_core::profile::DeviceProfile;
use std::path::Path;

/// Bytes per hexdump line
const BYTES_PER_LINE: usize = 16;

/// Load a file and print the used part of the image
pub fn run_dump(path: &Path, profile: &DeviceProfile) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(path, profile)?;

    if image.is_empty() {
        println!("{}: no data", path.display());
        return Ok(());
    }

    for line in hexdump(image.data()) {
        println!("{}", line);
    }
    println!("{:08x}", image.len());
    Ok(())
}

/// Format `data` like `hexdump -C`, repeated lines collapse into `*`
pub fn hexdump(data: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&[u8]> = None;
    let mut collapsed = false;

    for (index, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if previous == Some(chunk) && chunk.len() == BYTES_PER_LINE {
            if !collapsed {
                lines.push("*".to_string());
                collapsed = true;
            }
            continue;
        }
        previous = Some(chunk);
        collapsed = false;
        lines.push(format_line(index * BYTES_PER_LINE, chunk));
    }

    lines
}

fn format_line(offset: usize, chunk: &[u8]) -> String {
    let mut hex = String::with_capacity(BYTES_PER_LINE * 3 + 1);
    for i in 0..BYTES_PER_LINE {
        if i == BYTES_PER_LINE / 2 {
            hex.push(' ');
        }
        match chunk.get(i) {
            Some(b) => hex.push_str(&format!("{:02x} ", b)),
            None => hex.push_str("   "),
        }
    }

    let ascii: String = chunk
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();

    format!("{:08x}  {} |{}|", offset, hex, ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexdump_line() {
        let lines = hexdump(b"Hello, world!\x00\x01\x02");
        assert_eq!(
            lines,
            vec![
                "00000000  48 65 6c 6c 6f 2c 20 77  6f 72 6c 64 21 00 01 02  |Hello, world!...|"
            ]
        );
    }

    #[test]
    fn test_hexdump_short_line() {
        let lines = hexdump(&[0x02, 0x33, 0x7A]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("00000000  02 33 7a "));
        assert!(lines[0].ends_with(" |.3z|"));
    }

    #[test]
    fn test_hexdump_collapses_repeats() {
        let mut data = vec![0u8; 64];
        data.push(0xFF);
        let lines = hexdump(&data);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("00000000  00 00"));
        assert_eq!(lines[1], "*");
        assert!(lines[2].starts_with("00000040  ff "));
    }
}
