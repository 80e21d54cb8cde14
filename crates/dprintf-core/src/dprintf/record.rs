use crate::dprintf::render::{render, DprintfError};

/// Minimum number of 64-bit words in a record's word list.
pub const MIN_DATA_WORDS: usize = 4;

/// One dprintf request: a target address and a format program with its
/// arguments.
///
/// The rendered output and the 64-bit word list are derived at
/// construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DprintfRecord {
    address: u16,
    data: Vec<u8>,
    output: Vec<u8>,
    data_list: Vec<u64>,
}

impl DprintfRecord {
    /// Builds a record from a raw format program.
    ///
    /// # Errors
    ///
    /// Returns [`DprintfError`] when the program cannot be rendered.
    pub fn new(address: u16, data: impl Into<Vec<u8>>) -> Result<Self, DprintfError> {
        let data = data.into();
        let output = render(&data)?;
        let data_list = words_of(&data);
        Ok(Self {
            address,
            data,
            output,
            data_list,
        })
    }

    /// Builds a record from a program prefix followed by integers, each
    /// appended as eight big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DprintfError`] when the combined program cannot be rendered.
    pub fn with_ints(address: u16, data: &[u8], ints: &[u64]) -> Result<Self, DprintfError> {
        let mut program = Vec::with_capacity(data.len() + ints.len() * 8);
        program.extend_from_slice(data);
        for value in ints {
            program.extend_from_slice(&value.to_be_bytes());
        }
        Self::new(address, program)
    }

    /// Builds a record whose program is made only of integers.
    ///
    /// # Errors
    ///
    /// Returns [`DprintfError`] when the program cannot be rendered.
    pub fn from_ints(address: u16, ints: &[u64]) -> Result<Self, DprintfError> {
        Self::with_ints(address, &[], ints)
    }

    /// Target address of the first output byte.
    #[must_use]
    pub const fn address(&self) -> u16 {
        self.address
    }

    /// Format program and arguments.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Rendered output bytes.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Program re-chunked into big-endian 64-bit words, at least
    /// [`MIN_DATA_WORDS`] long.
    ///
    /// A short list is padded with the last accumulated word (a partial
    /// tail, or a repeat of the final full word), then zeros.
    #[must_use]
    pub fn data_list(&self) -> &[u64] {
        &self.data_list
    }

    /// Request carrying the first `N` words of the word list.
    #[must_use]
    pub fn request<const N: usize>(&self) -> DprintfRequest<N> {
        let mut data = [0_u64; N];
        for (slot, word) in data.iter_mut().zip(&self.data_list) {
            *slot = *word;
        }
        DprintfRequest {
            address: self.address,
            data,
        }
    }

    /// Rendered output as addressed bytes followed by a `last` marker.
    #[must_use]
    pub fn byte_stream(&self) -> Vec<DprintfByte> {
        let mut address = self.address;
        let mut stream = Vec::with_capacity(self.output.len() + 1);
        for &data in &self.output {
            stream.push(DprintfByte::data(address, data));
            address = address.wrapping_add(1);
        }
        stream.push(DprintfByte::last());
        stream
    }
}

fn words_of(data: &[u8]) -> Vec<u64> {
    let mut words: Vec<u64> = data
        .chunks(8)
        .map(|chunk| {
            let mut bytes = [0_u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            u64::from_be_bytes(bytes)
        })
        .collect();
    if words.len() < MIN_DATA_WORDS {
        // A program ending on a word boundary repeats its last word once.
        if data.len() % 8 == 0 {
            if let Some(&last) = words.last() {
                words.push(last);
            }
        }
        words.resize(MIN_DATA_WORDS, 0);
    }
    words
}

/// Dprintf request bus shape: an address plus `N` 64-bit program words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DprintfRequest<const N: usize> {
    /// Target address.
    pub address: u16,
    /// Program words, big-endian packed.
    pub data: [u64; N],
}

impl<const N: usize> Default for DprintfRequest<N> {
    fn default() -> Self {
        Self {
            address: 0,
            data: [0; N],
        }
    }
}

impl<const N: usize> DprintfRequest<N> {
    /// Byte `index` of the request payload, taking each word little-endian
    /// in word order; bytes past the payload read as zero.
    #[must_use]
    pub fn payload_byte(&self, index: usize) -> u8 {
        self.data
            .get(index / 8)
            .map_or(0, |word| word.to_le_bytes()[index % 8])
    }
}

/// Two-word request shape.
pub type DprintfReq2 = DprintfRequest<2>;
/// Four-word request shape, held by the FIFO sink.
pub type DprintfReq4 = DprintfRequest<4>;

/// One rendered byte on the dprintf output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DprintfByte {
    /// Address the byte is written to.
    pub address: u16,
    /// Output byte.
    pub data: u8,
    /// Marks the end of one record's output.
    pub last: bool,
    /// Whether `address`/`data` carry a byte.
    pub valid: bool,
}

impl DprintfByte {
    /// A valid output byte.
    #[must_use]
    pub const fn data(address: u16, data: u8) -> Self {
        Self {
            address,
            data,
            last: false,
            valid: true,
        }
    }

    /// End-of-record marker.
    #[must_use]
    pub const fn last() -> Self {
        Self {
            address: 0,
            data: 0,
            last: true,
            valid: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DprintfByte, DprintfRecord, DprintfReq2, DprintfReq4};

    #[test]
    fn ints_append_big_endian_and_render() {
        let record = DprintfRecord::from_ints(0x10, &[0x8501_2345, 0x00C1_1A85, 0, 0])
            .expect("valid program");
        assert_eq!(record.output(), b"0123456789");
        assert_eq!(record.data().len(), 32);
        assert_eq!(&record.data()[4..8], &[0x85, 0x01, 0x23, 0x45]);
        assert_eq!(record.data_list(), &[0x8501_2345, 0x00C1_1A85, 0, 0]);
    }

    #[test]
    fn prefix_and_ints_combine() {
        let record = DprintfRecord::with_ints(
            0,
            &[0x85, 0xAB, 0xCD, 0xEF],
            &[0x0047_0048_0049_004A, 0x004B_004C_004D_004E, 0x4F],
        )
        .expect("valid program");
        assert_eq!(record.output(), b"ABCDEFGHIJKLMNO");
    }

    #[test]
    fn word_list_left_aligns_partial_tail_and_pads() {
        let record = DprintfRecord::new(0, b"abcdefghij".to_vec()).expect("valid program");
        assert_eq!(
            record.data_list(),
            &[0x6162_6364_6566_6768, 0x696A_0000_0000_0000, 0, 0]
        );

        let long = DprintfRecord::new(0, vec![b'x'; 41]).expect("valid program");
        assert_eq!(long.data_list().len(), 6);
        assert_eq!(long.data_list()[5], 0x7800_0000_0000_0000);
    }

    #[test]
    fn word_aligned_program_repeats_last_word_once() {
        let one = DprintfRecord::new(0, b"abcdefgh".to_vec()).expect("valid program");
        assert_eq!(
            one.data_list(),
            &[0x6162_6364_6566_6768, 0x6162_6364_6566_6768, 0, 0]
        );

        let two = DprintfRecord::new(0, b"abcdefghijklmnop".to_vec()).expect("valid program");
        assert_eq!(
            two.data_list(),
            &[
                0x6162_6364_6566_6768,
                0x696A_6B6C_6D6E_6F70,
                0x696A_6B6C_6D6E_6F70,
                0
            ]
        );

        let three = DprintfRecord::new(0, vec![b'x'; 24]).expect("valid program");
        assert_eq!(three.data_list()[3], three.data_list()[2]);

        let empty = DprintfRecord::new(0, Vec::new()).expect("valid program");
        assert_eq!(empty.data_list(), &[0, 0, 0, 0]);
    }

    #[test]
    fn requests_truncate_word_list() {
        let record = DprintfRecord::new(0x1234, b"abcdefghijklmnop".to_vec()).expect("valid");
        let two: DprintfReq2 = record.request();
        assert_eq!(two.address, 0x1234);
        assert_eq!(two.data, [0x6162_6364_6566_6768, 0x696A_6B6C_6D6E_6F70]);

        let four: DprintfReq4 = record.request();
        assert_eq!(four.data[2..], [0x696A_6B6C_6D6E_6F70, 0]);
        assert_eq!(four.payload_byte(0), 0x68);
        assert_eq!(four.payload_byte(7), 0x61);
        assert_eq!(four.payload_byte(8), 0x70);
        assert_eq!(four.payload_byte(40), 0);
    }

    #[test]
    fn byte_stream_increments_address_and_ends_with_last() {
        let record = DprintfRecord::new(0xFFFF, b"ab".to_vec()).expect("valid");
        assert_eq!(
            record.byte_stream(),
            vec![
                DprintfByte::data(0xFFFF, b'a'),
                DprintfByte::data(0x0000, b'b'),
                DprintfByte::last(),
            ]
        );
    }

    #[test]
    fn invalid_program_is_rejected_at_construction() {
        assert!(DprintfRecord::new(0, vec![0xA8, 0x00]).is_err());
    }
}
