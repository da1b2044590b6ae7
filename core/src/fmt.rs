//! Human-readable size formatting for boot reports and file listings.

use core::fmt;

/// Write `bytes` the way the firmware reports sizes: plain bytes below 1k,
/// whole kilobytes below 1M, whole megabytes above.
pub fn format_size<W: fmt::Write>(w: &mut W, bytes: u64) -> fmt::Result {
    if bytes < 1024 {
        write!(w, "{}", bytes)
    } else if bytes < 1024 * 1024 {
        write!(w, "{}k", bytes / 1024)
    } else {
        write!(w, "{}M", bytes / (1024 * 1024))
    }
}

/// Display adapter for [`format_size`].
pub struct SizeFmt(pub u64);

impl fmt::Display for SizeFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_size(f, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    struct Buf {
        data: [u8; 16],
        len: usize,
    }

    impl Write for Buf {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for &b in s.as_bytes() {
                if self.len < self.data.len() {
                    self.data[self.len] = b;
                    self.len += 1;
                }
            }
            Ok(())
        }
    }

    fn render(bytes: u64) -> Buf {
        let mut buf = Buf {
            data: [0; 16],
            len: 0,
        };
        format_size(&mut buf, bytes).unwrap();
        buf
    }

    #[test]
    fn test_size_breakpoints() {
        assert_eq!(&render(0).data[..1], &b"0"[..]);
        assert_eq!(&render(1023).data[..4], &b"1023"[..]);
        assert_eq!(&render(1024).data[..2], &b"1k"[..]);
        assert_eq!(&render(1024 * 1024 - 1).data[..5], &b"1023k"[..]);
        assert_eq!(&render(1024 * 1024).data[..2], &b"1M"[..]);
        assert_eq!(&render(512 * 1024 * 1024).data[..4], &b"512M"[..]);
    }
}
