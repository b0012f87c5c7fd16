use crate::Compression;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

impl Compression {
    /// Detect the encoding from magic bytes.
    ///
    /// Returns the `None` variant when the gzip header is absent or the input
    /// is too short to carry one.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        Compression::None
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case(b"ISO-10303-21;", Compression::None)]
    #[case(b"", Compression::None)]
    #[case(&[0x1F], Compression::None)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], Compression::Gzip)]
    // bzip2 header is not an archive we understand
    #[case(&[0x42, 0x5A, 0x68, 0x39], Compression::None)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Compression) {
        assert_eq!(Compression::from_magic_bytes(bytes), expected);
    }
}
