//! First-failure data capture returned with a failed chip operation

use bytes::{BufMut, Bytes, BytesMut};

use super::WORD_SIZE;

/// FFDC words copied out of a failed reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ffdc {
    words: Vec<u32>,
}

impl Ffdc {
    /// Wrap already extracted FFDC words
    #[must_use]
    pub fn new(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// FFDC words in host order
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of FFDC words
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the firmware attached no diagnostics
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// FFDC rendered as bytes in wire (big-endian) order
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.words.len() * WORD_SIZE);
        for word in &self.words {
            buf.put_u32(*word);
        }
        buf.freeze()
    }

    /// Take the words out
    #[must_use]
    pub fn into_words(self) -> Vec<u32> {
        self.words
    }
}
