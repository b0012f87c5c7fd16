//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::{Compression as GzCompression, bufread::GzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;

// Archives are written once and opened many times; always spend the CPU.
const GZIP_LEVEL: GzCompression = GzCompression::best();

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use stepz_compress::Compression;
    ///
    /// let data = b"ISO-10303-21;";
    /// let compressed = Compression::Gzip.compress(data).unwrap();
    /// assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// Concatenated gzip members are decoded back to back, so an archive that
    /// was appended to by another tool still yields its full contents. Zero
    /// padding after a member (left by tape and block-device tools) is skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stepz_compress::Compression;
    ///
    /// let original = b"ISO-10303-21;\nEND-ISO-10303-21;\n";
    /// let compressed = Compression::Gzip.compress(original).unwrap();
    /// assert_ne!(compressed, original);
    /// let decompressed = Compression::Gzip.decompress(&compressed).unwrap();
    /// assert_eq!(decompressed, original);
    /// ```
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    /// Compress `input`, appending to `output`. Returns the size of `output`.
    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                output.len()
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                output.len()
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    /// Decompress `input`, appending to `output`. Returns the number of bytes
    /// decoded.
    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Gzip => {
                let start = output.len();
                let mut rest = input;
                loop {
                    let mut decoder = GzDecoder::new(rest);
                    decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?;
                    let remaining = decoder.into_inner();
                    if remaining.len() == rest.len() {
                        exn::bail!(ErrorKind::InvalidData);
                    }
                    // Zero padding may follow any member; the next one starts
                    // at the first non-zero byte.
                    let Some(next) = remaining.iter().position(|&b| b != 0) else {
                        break;
                    };
                    rest = &remaining[next..];
                }
                output.len() - start
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use rstest::rstest;

    const STEP_SAMPLE: &[u8] = b"ISO-10303-21;\nHEADER;\nFILE_NAME('cube.stp');\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;\n";

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Gzip)]
    fn test_compress_decompress(#[case] format: Compression) {
        let compressed = format.compress(STEP_SAMPLE).unwrap();
        let decompressed = format.decompress(&compressed).unwrap();
        assert_eq!(decompressed, STEP_SAMPLE);
    }

    #[test]
    fn test_gzip_output_carries_magic() {
        let compressed = Compression::Gzip.compress(STEP_SAMPLE).unwrap();
        assert_eq!(Compression::from_magic_bytes(&compressed), Compression::Gzip);
    }

    #[test]
    fn test_invalid_compressed_data() {
        let err = Compression::Gzip.decompress(b"This is not compressed data").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_compressed_data() {
        let compressed = Compression::Gzip.compress(STEP_SAMPLE).unwrap();
        let truncated = &compressed[..compressed.len() / 2];
        assert!(Compression::Gzip.decompress(truncated).is_err());
    }

    #[test]
    fn test_concatenated_members() {
        let mut joined = Compression::Gzip.compress(b"first;").unwrap();
        joined.extend(Compression::Gzip.compress(b"second;").unwrap());
        assert_eq!(Compression::Gzip.decompress(&joined).unwrap(), b"first;second;");
    }

    #[test]
    fn test_compress_into_appends() {
        let mut output = b"prefix".to_vec();
        let size = Compression::None.compress_into(b"-data", &mut output).unwrap();
        assert_eq!(output, b"prefix-data");
        assert_eq!(size, output.len());
    }

    #[test]
    fn test_trailing_zero_padding_is_ignored() {
        let mut padded = Compression::Gzip.compress(STEP_SAMPLE).unwrap();
        padded.extend([0u8; 16]);
        assert_eq!(Compression::Gzip.decompress(&padded).unwrap(), STEP_SAMPLE);
    }

    #[test]
    fn test_zero_padding_between_members() {
        let mut joined = Compression::Gzip.compress(b"first;").unwrap();
        joined.extend([0u8; 4]);
        joined.extend(Compression::Gzip.compress(b"second;").unwrap());
        assert_eq!(Compression::Gzip.decompress(&joined).unwrap(), b"first;second;");
    }

    #[test]
    fn test_garbage_after_padding() {
        let mut padded = Compression::Gzip.compress(STEP_SAMPLE).unwrap();
        padded.extend([0, 0, 0, b'x']);
        let err = Compression::Gzip.decompress(&padded).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[test]
    fn test_empty_member() {
        // An empty payload ends in a zero ISIZE trailer, which must not be
        // mistaken for padding.
        let compressed = Compression::Gzip.compress(b"").unwrap();
        assert!(Compression::Gzip.decompress(&compressed).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_gzip_roundtrip_is_lossless(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let compressed = Compression::Gzip.compress(&data).unwrap();
            prop_assert_eq!(Compression::Gzip.decompress(&compressed).unwrap(), data);
        }
    }
}
