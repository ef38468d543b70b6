//! SBE chip-operation codec
//!
//! Commands go out as big-endian words. Replies come back as big-endian
//! words and are reduced to their payload by [`parse_response`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use super::{
    Command, DISTANCE_LEN_IN_WORDS, Error, Ffdc, Result, STATUS_HEADER_LEN_IN_WORDS, StatusHeader,
    WORD_SIZE,
};

/// Encode a command to wire bytes
///
/// # Format
///
/// ```text
/// [WORD COUNT (4 bytes BE)] [OPCODE (4 bytes BE)] [OPERANDS (4 bytes BE each)]
/// ```
#[must_use]
pub fn encode_command(command: &Command) -> Bytes {
    let mut bytes = BytesMut::with_capacity(command.byte_len());
    for word in command.words() {
        bytes.put_u32(*word);
    }
    bytes.freeze()
}

/// Convert wire bytes into host-order words
///
/// Only whole words are returned; trailing bytes that do not make up a
/// full word are dropped.
#[must_use]
pub fn decode_words(mut bytes: &[u8]) -> Vec<u32> {
    let count = bytes.len() / WORD_SIZE;
    if bytes.len() % WORD_SIZE != 0 {
        debug!(len = bytes.len(), "reply length is not a multiple of the word size");
    }

    let mut words = Vec::with_capacity(count);
    for _ in 0..count {
        words.push(bytes.get_u32());
    }
    words
}

/// Validate a reply and reduce it to its payload
///
/// # Format
///
/// ```text
/// [PAYLOAD...] [HEADER] [STATUS] [FFDC...] [DISTANCE]
///              |<----------- distance words ---------->|
/// ```
///
/// On success `words` is truncated in place to the payload and the decoded
/// status header is returned.
///
/// # Errors
///
/// Returns an error if:
/// - The reply is empty or the distance word points outside it
/// - The header does not carry the magic code
/// - The status is non-zero (the FFDC block is attached to the error)
pub fn parse_response(words: &mut Vec<u32>) -> Result<StatusHeader> {
    let len = words.len();

    // Last word holds the distance back to the status header
    let Some(&distance) = words.last() else {
        return Err(Error::MalformedFrame { distance: 0, len });
    };

    let minimum = STATUS_HEADER_LEN_IN_WORDS + DISTANCE_LEN_IN_WORDS;
    let span = distance as usize;
    if span > len || span < minimum {
        return Err(Error::MalformedFrame { distance, len });
    }

    let header_offset = len - span;
    let header = StatusHeader::from_words(words[header_offset], words[header_offset + 1]);
    header.validate()?;

    trace!(
        len,
        distance,
        class = header.class(),
        code = header.code(),
        "decoded status header"
    );

    let status = header.status();
    if !status.is_success() {
        let ffdc_len = span - minimum;
        let ffdc_offset = header_offset + STATUS_HEADER_LEN_IN_WORDS;
        let ffdc = Ffdc::new(words[ffdc_offset..ffdc_offset + ffdc_len].to_vec());
        return Err(Error::ChipOperationFailed { status, ffdc });
    }

    words.truncate(header_offset);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ChipOpStatus, MAGIC_CODE, Opcode};

    fn reply(payload: &[u32], status: u32, ffdc: &[u32]) -> Vec<u32> {
        let header = StatusHeader::new(Opcode::ScomRead, ChipOpStatus::from_u32(status));
        let mut words = payload.to_vec();
        words.extend_from_slice(&header.to_words());
        words.extend_from_slice(ffdc);
        words.push((STATUS_HEADER_LEN_IN_WORDS + ffdc.len() + DISTANCE_LEN_IN_WORDS) as u32);
        words
    }

    #[test]
    fn test_encode_command_big_endian() {
        let cmd = Command::new(Opcode::ScomRead).with_u64(0x0003_0000_0000_000F);
        let bytes = encode_command(&cmd);

        assert_eq!(
            bytes.as_ref(),
            &[0, 0, 0, 4, 0, 0, 0xA2, 0x01, 0, 0x03, 0, 0, 0, 0, 0, 0x0F]
        );
    }

    #[test]
    fn test_decode_words_drops_partial_word() {
        let words = decode_words(&[0xC0, 0xDE, 0xA2, 0x01, 0x00, 0x00]);
        assert_eq!(words, vec![0xC0DE_A201]);
        assert!(decode_words(&[]).is_empty());
    }

    #[test]
    fn test_parse_success_returns_payload() {
        let mut words = reply(&[0xAABB_CCDD, 0x1122_3344], 0, &[]);
        let header = parse_response(&mut words).unwrap();
        assert!(header.matches(Opcode::ScomRead));
        assert_eq!(words, vec![0xAABB_CCDD, 0x1122_3344]);
    }

    #[test]
    fn test_parse_header_only() {
        let mut words = reply(&[], 0, &[]);
        parse_response(&mut words).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_parse_failure_carries_ffdc() {
        let mut words = reply(&[], 5, &[0xFFDC_0001, 0xDEAD, 0xBEEF]);
        let err = parse_response(&mut words).unwrap_err();

        match err {
            Error::ChipOperationFailed { status, ffdc } => {
                assert_eq!(status.as_u32(), 5);
                assert_eq!(ffdc.words(), &[0xFFDC_0001, 0xDEAD, 0xBEEF]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_failure_without_ffdc() {
        let mut words = reply(&[], 0x00FE_0001, &[]);
        match parse_response(&mut words) {
            Err(Error::ChipOperationFailed { status, ffdc }) => {
                assert_eq!(status.primary(), 0x00FE);
                assert!(ffdc.is_empty());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_reply() {
        let mut words = Vec::new();
        assert!(matches!(
            parse_response(&mut words),
            Err(Error::MalformedFrame { distance: 0, len: 0 })
        ));
    }

    #[test]
    fn test_parse_degenerate_distance() {
        for distance in [0u32, 1, 2] {
            let mut words = vec![(u32::from(MAGIC_CODE)) << 16, 0, distance];
            assert!(matches!(
                parse_response(&mut words),
                Err(Error::MalformedFrame { .. })
            ));
        }
    }

    #[test]
    fn test_parse_distance_past_start() {
        let mut words = reply(&[1, 2], 0, &[]);
        let last = words.len() - 1;
        words[last] = 10;
        assert!(matches!(
            parse_response(&mut words),
            Err(Error::MalformedFrame { distance: 10, len: 5 })
        ));
    }

    #[test]
    fn test_parse_invalid_magic() {
        let mut words = reply(&[7], 0, &[]);
        words[1] = 0xBAD0_A201;
        assert!(matches!(
            parse_response(&mut words),
            Err(Error::InvalidMagic { found: 0xBAD0 })
        ));
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn payload_strategy() -> impl Strategy<Value = Vec<u32>> {
            prop::collection::vec(any::<u32>(), 0..=64)
        }

        proptest! {
            /// Property: a success reply yields exactly its payload
            #[test]
            fn prop_success_yields_payload(payload in payload_strategy()) {
                let mut words = reply(&payload, 0, &[]);
                prop_assert!(parse_response(&mut words).is_ok());
                prop_assert_eq!(words, payload);
            }

            /// Property: a failed reply carries exactly the FFDC words
            #[test]
            fn prop_failure_yields_ffdc(
                payload in payload_strategy(),
                status in 1u32..=u32::MAX,
                ffdc in prop::collection::vec(any::<u32>(), 0..=128),
            ) {
                let mut words = reply(&payload, status, &ffdc);
                match parse_response(&mut words) {
                    Err(Error::ChipOperationFailed { status: got, ffdc: block }) => {
                        prop_assert_eq!(got.as_u32(), status);
                        prop_assert_eq!(block.words(), ffdc.as_slice());
                    }
                    other => prop_assert!(false, "unexpected result: {:?}", other),
                }
            }

            /// Property: corrupting the magic code is always rejected
            #[test]
            fn prop_invalid_magic_rejected(
                payload in payload_strategy(),
                magic in any::<u16>().prop_filter("not valid magic", |m| *m != MAGIC_CODE),
            ) {
                let mut words = reply(&payload, 0, &[]);
                let header = payload.len();
                words[header] = (u32::from(magic) << 16) | (words[header] & 0xFFFF);
                let result = parse_response(&mut words);
                prop_assert!(matches!(result, Err(Error::InvalidMagic { found }) if found == magic), "expected InvalidMagic, got {:?}", result);
            }

            /// Property: a distance past the start of the reply never reads out of bounds
            #[test]
            fn prop_oversized_distance_rejected(
                payload in payload_strategy(),
                excess in 1u32..1024,
            ) {
                let mut words = reply(&payload, 0, &[]);
                let len = words.len();
                words[len - 1] = len as u32 + excess;
                let result = parse_response(&mut words);
                prop_assert!(matches!(result, Err(Error::MalformedFrame { .. })), "expected MalformedFrame, got {:?}", result);
            }

            /// Property: arbitrary garbage never panics
            #[test]
            fn prop_garbage_never_panics(mut words in prop::collection::vec(any::<u32>(), 0..=32)) {
                let _ = parse_response(&mut words);
            }
        }
    }
}
