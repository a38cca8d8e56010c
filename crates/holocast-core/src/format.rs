//! Human-readable byte formatting for status messages and upload receipts.

const SIZE_NAMES: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count with one decimal place and a binary unit ladder,
/// e.g. 1,536,000 -> "1.5 MB". Zero is special-cased as "0 B".
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_NAMES.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_NAMES[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_file_size(0), "0 B");
    }

    #[test]
    fn test_bytes() {
        assert_eq!(format_file_size(500), "500.0 B");
        assert_eq!(format_file_size(1023), "1023.0 B");
    }

    #[test]
    fn test_kilobytes() {
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(10 * 1024), "10.0 KB");
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(format_file_size(1_536_000), "1.5 MB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_gigabytes_cap() {
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        // Anything above GB stays in GB; the ladder has no TB rung.
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048.0 GB");
    }
}
