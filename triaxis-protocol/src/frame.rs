//! Frame encoding and decoding for the serial command protocol.
//!
//! Command frame (11 bytes):
//! - STX (1 byte): 0x02
//! - AXIS (1 byte): ASCII axis selector
//! - ACTION (1 byte): ASCII action code
//! - VALUE (6 bytes): ASCII decimal digits, unsigned
//! - CHECKSUM (1 byte): XOR of bytes 1..=8
//! - ETX (1 byte): 0x03
//!
//! Response frame (10 bytes):
//! - STX, AXIS, VALUE (6 bytes, sign + 5 digits), then CHECKSUM and ETX
//!   in the order given by the [`ResponseLayout`] of the query.
//!   The checksum is the XOR of bytes 1..=7.

use heapless::Vec;

/// Start-of-frame marker
pub const STX: u8 = 0x02;

/// End-of-frame marker
pub const ETX: u8 = 0x03;

/// Length of an inbound command frame
pub const COMMAND_FRAME_LEN: usize = 11;

/// Length of an outbound response frame
pub const RESPONSE_FRAME_LEN: usize = 10;

/// Number of ASCII characters in a value field
pub const VALUE_DIGITS: usize = 6;

/// Largest value a command frame can carry
pub const MAX_COMMAND_VALUE: u32 = 999_999;

/// Largest magnitude a signed response value can carry
pub const MAX_RESPONSE_MAGNITUDE: i32 = 99_999;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not STX
    InvalidStart,
    /// Last byte is not ETX
    InvalidEnd,
    /// Checksum mismatch
    InvalidChecksum,
    /// Value field contains a non-digit
    InvalidDigit,
    /// Value does not fit the 6-digit field
    ValueOutOfRange,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// XOR of all bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// A validated command frame
///
/// Axis selector and action code are kept raw here; interpreting them is
/// left to [`crate::Command::from_frame`] so that unknown codes can be
/// told apart from corrupted frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    /// ASCII axis selector byte
    pub selector: u8,
    /// ASCII action code
    pub action: u8,
    /// Decimal value field
    pub value: u32,
}

impl CommandFrame {
    /// Create a frame, checking that the value fits in six digits
    pub fn new(selector: u8, action: u8, value: u32) -> Result<Self, FrameError> {
        if value > MAX_COMMAND_VALUE {
            return Err(FrameError::ValueOutOfRange);
        }
        Ok(Self {
            selector,
            action,
            value,
        })
    }

    /// Encode into the 11-byte wire form
    pub fn encode(&self) -> [u8; COMMAND_FRAME_LEN] {
        let mut out = [0u8; COMMAND_FRAME_LEN];
        out[0] = STX;
        out[1] = self.selector;
        out[2] = self.action;

        // Zero-padded, most significant digit first
        let mut v = self.value.min(MAX_COMMAND_VALUE);
        for slot in out[3..3 + VALUE_DIGITS].iter_mut().rev() {
            *slot = b'0' + (v % 10) as u8;
            v /= 10;
        }

        out[9] = checksum(&out[1..9]);
        out[10] = ETX;
        out
    }

    /// Validate and decode an 11-byte wire frame
    pub fn decode(bytes: &[u8; COMMAND_FRAME_LEN]) -> Result<Self, FrameError> {
        if bytes[0] != STX {
            return Err(FrameError::InvalidStart);
        }
        if bytes[10] != ETX {
            return Err(FrameError::InvalidEnd);
        }
        if checksum(&bytes[1..9]) != bytes[9] {
            return Err(FrameError::InvalidChecksum);
        }

        let mut value: u32 = 0;
        for &b in &bytes[3..3 + VALUE_DIGITS] {
            if !b.is_ascii_digit() {
                return Err(FrameError::InvalidDigit);
            }
            value = value * 10 + (b - b'0') as u32;
        }

        Ok(Self {
            selector: bytes[1],
            action: bytes[2],
            value,
        })
    }
}

/// Placement of the checksum relative to ETX in a response
///
/// Existing host controllers expect different layouts per query type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseLayout {
    /// `STX AXIS VALUE CHECKSUM ETX` (current queries)
    ChecksumThenEnd,
    /// `STX AXIS VALUE ETX CHECKSUM` (legacy rotation queries)
    EndThenChecksum,
}

/// An outbound query reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseFrame {
    /// ASCII axis selector byte echoed from the query
    pub selector: u8,
    /// Signed value, saturated to five digits on encode
    pub value: i32,
    /// Checksum/ETX ordering
    pub layout: ResponseLayout,
}

impl ResponseFrame {
    /// Create a response frame
    pub fn new(selector: u8, value: i32, layout: ResponseLayout) -> Self {
        Self {
            selector,
            value,
            layout,
        }
    }

    /// Encode into the 10-byte wire form
    pub fn encode(&self) -> [u8; RESPONSE_FRAME_LEN] {
        let mut out = [0u8; RESPONSE_FRAME_LEN];
        out[0] = STX;
        out[1] = self.selector;
        out[2..2 + VALUE_DIGITS].copy_from_slice(&format_signed(self.value));

        let cs = checksum(&out[1..8]);
        match self.layout {
            ResponseLayout::ChecksumThenEnd => {
                out[8] = cs;
                out[9] = ETX;
            }
            ResponseLayout::EndThenChecksum => {
                out[8] = ETX;
                out[9] = cs;
            }
        }
        out
    }

    /// Encode into a caller-provided buffer
    ///
    /// Returns the number of bytes written
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < RESPONSE_FRAME_LEN {
            return Err(FrameError::BufferTooSmall);
        }
        buffer[..RESPONSE_FRAME_LEN].copy_from_slice(&self.encode());
        Ok(RESPONSE_FRAME_LEN)
    }

    /// Validate and decode a response (host side)
    pub fn decode(
        bytes: &[u8; RESPONSE_FRAME_LEN],
        layout: ResponseLayout,
    ) -> Result<Self, FrameError> {
        if bytes[0] != STX {
            return Err(FrameError::InvalidStart);
        }
        let (cs, end) = match layout {
            ResponseLayout::ChecksumThenEnd => (bytes[8], bytes[9]),
            ResponseLayout::EndThenChecksum => (bytes[9], bytes[8]),
        };
        if end != ETX {
            return Err(FrameError::InvalidEnd);
        }
        if checksum(&bytes[1..8]) != cs {
            return Err(FrameError::InvalidChecksum);
        }

        let negative = match bytes[2] {
            b'+' => false,
            b'-' => true,
            _ => return Err(FrameError::InvalidDigit),
        };
        let mut magnitude: i32 = 0;
        for &b in &bytes[3..8] {
            if !b.is_ascii_digit() {
                return Err(FrameError::InvalidDigit);
            }
            magnitude = magnitude * 10 + (b - b'0') as i32;
        }

        Ok(Self {
            selector: bytes[1],
            value: if negative { -magnitude } else { magnitude },
            layout,
        })
    }
}

/// Format a signed value as `+00123` / `-00045`
fn format_signed(value: i32) -> [u8; VALUE_DIGITS] {
    let clamped = value.clamp(-MAX_RESPONSE_MAGNITUDE, MAX_RESPONSE_MAGNITUDE);
    let mut out = [b'0'; VALUE_DIGITS];
    out[0] = if clamped < 0 { b'-' } else { b'+' };

    let mut magnitude = clamped.unsigned_abs();
    for slot in out[1..].iter_mut().rev() {
        *slot = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
    }
    out
}

/// State machine for parsing inbound command frames
///
/// Bytes outside a frame are discarded until the next STX. Once STX is
/// seen exactly [`COMMAND_FRAME_LEN`] bytes are collected and validated
/// as a unit.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, COMMAND_FRAME_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for STX
    Idle,
    /// Collecting the rest of the frame
    Accumulating,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.buffer.clear();
    }

    /// Whether a frame is partially received
    pub fn is_accumulating(&self) -> bool {
        self.state == ParseState::Accumulating
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when a complete
    /// frame failed validation (the frame is discarded).
    ///
    /// After STX exactly `COMMAND_FRAME_LEN` bytes are collected, so a
    /// truncated frame absorbs the head of the frame behind it and both
    /// are lost. Resync happens at the next STX seen while idle; the
    /// host recovers by resending.
    pub fn feed(&mut self, byte: u8) -> Result<Option<CommandFrame>, FrameError> {
        match self.state {
            ParseState::Idle => {
                if byte == STX {
                    self.buffer.clear();
                    // Capacity is COMMAND_FRAME_LEN, the buffer was just cleared
                    let _ = self.buffer.push(byte);
                    self.state = ParseState::Accumulating;
                }
                // Silently ignore bytes between frames
                Ok(None)
            }
            ParseState::Accumulating => {
                let _ = self.buffer.push(byte);
                if self.buffer.len() < COMMAND_FRAME_LEN {
                    return Ok(None);
                }

                let mut raw = [0u8; COMMAND_FRAME_LEN];
                raw.copy_from_slice(&self.buffer);
                self.reset();
                CommandFrame::decode(&raw).map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<CommandFrame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_matches_host_layout() {
        let frame = CommandFrame::new(b'1', b'M', 1234).unwrap();
        let bytes = frame.encode();

        assert_eq!(bytes[0], STX);
        assert_eq!(bytes[1], b'1');
        assert_eq!(bytes[2], b'M');
        assert_eq!(&bytes[3..9], b"001234");
        assert_eq!(bytes[9], checksum(&bytes[1..9]));
        assert_eq!(bytes[10], ETX);
    }

    #[test]
    fn test_decode_valid_frame() {
        let bytes = CommandFrame::new(b'3', b'V', 120).unwrap().encode();
        let frame = CommandFrame::decode(&bytes).unwrap();

        assert_eq!(frame.selector, b'3');
        assert_eq!(frame.action, b'V');
        assert_eq!(frame.value, 120);
    }

    #[test]
    fn test_value_too_large() {
        assert_eq!(
            CommandFrame::new(b'1', b'M', 1_000_000),
            Err(FrameError::ValueOutOfRange)
        );
    }

    #[test]
    fn test_wrong_etx_rejected() {
        let mut bytes = CommandFrame::new(b'1', b'S', 0).unwrap().encode();
        bytes[10] = 0x04;
        assert_eq!(CommandFrame::decode(&bytes), Err(FrameError::InvalidEnd));
    }

    #[test]
    fn test_non_digit_value_rejected() {
        let mut bytes = CommandFrame::new(b'1', b'M', 0).unwrap().encode();
        bytes[5] = b'A';
        bytes[9] = checksum(&bytes[1..9]);
        assert_eq!(CommandFrame::decode(&bytes), Err(FrameError::InvalidDigit));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let encoded = CommandFrame::new(b'2', b'F', 0).unwrap().encode();

        let mut data = Vec::<u8, 20>::new();
        data.extend_from_slice(&[0x00, 0xFF, 0x12, ETX]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();

        assert_eq!(parsed.selector, b'2');
        assert_eq!(parsed.action, b'F');
        assert!(!parser.is_accumulating());
    }

    #[test]
    fn test_parser_reports_bad_checksum_once() {
        let mut encoded = CommandFrame::new(b'1', b'M', 500).unwrap().encode();
        encoded[9] ^= 0xFF;

        let mut parser = FrameParser::new();
        assert_eq!(
            parser.feed_bytes(&encoded),
            Err(FrameError::InvalidChecksum)
        );

        // The next good frame is still accepted
        let good = CommandFrame::new(b'1', b'S', 0).unwrap().encode();
        assert!(parser.feed_bytes(&good).unwrap().is_some());
    }

    #[test]
    fn test_parser_truncated_frame_costs_next_frame() {
        let first = CommandFrame::new(b'1', b'M', 100).unwrap().encode();
        let second = CommandFrame::new(b'2', b'E', 0).unwrap().encode();
        let third = CommandFrame::new(b'3', b'S', 0).unwrap().encode();
        // The tail of the swallowed frame must not look like a frame start
        assert!(!second[5..].contains(&STX));

        let mut parser = FrameParser::new();
        let mut frames = 0;
        let mut errors = 0;
        for &byte in first[..6].iter().chain(&second).chain(&third) {
            match parser.feed(byte) {
                Ok(Some(frame)) => {
                    frames += 1;
                    assert_eq!(frame.selector, b'3');
                }
                Ok(None) => {}
                Err(_) => errors += 1,
            }
        }

        assert_eq!(frames, 1);
        assert_eq!(errors, 1);
        assert!(!parser.is_accumulating());
    }

    #[test]
    fn test_parser_checksum_may_equal_stx() {
        // '1' ^ '3' ^ "000000" == 0x02; the parser must not treat the
        // checksum byte as a new frame start
        let frame = CommandFrame::new(b'1', b'3', 0).unwrap();
        assert_eq!(frame.encode()[9], STX);

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&frame.encode()), Ok(Some(frame)));
    }

    #[test]
    fn test_response_current_layout() {
        let bytes = ResponseFrame::new(b'1', 123, ResponseLayout::ChecksumThenEnd).encode();

        assert_eq!(bytes[0], STX);
        assert_eq!(bytes[1], b'1');
        assert_eq!(&bytes[2..8], b"+00123");
        assert_eq!(bytes[8], checksum(&bytes[1..8]));
        assert_eq!(bytes[9], ETX);
    }

    #[test]
    fn test_response_rotation_layout() {
        let bytes = ResponseFrame::new(b'2', -45, ResponseLayout::EndThenChecksum).encode();

        assert_eq!(&bytes[2..8], b"-00045");
        assert_eq!(bytes[8], ETX);
        assert_eq!(bytes[9], checksum(&bytes[1..8]));
    }

    #[test]
    fn test_response_saturates() {
        let bytes = ResponseFrame::new(b'1', 1_234_567, ResponseLayout::ChecksumThenEnd).encode();
        assert_eq!(&bytes[2..8], b"+99999");

        let bytes = ResponseFrame::new(b'1', -1_234_567, ResponseLayout::ChecksumThenEnd).encode();
        assert_eq!(&bytes[2..8], b"-99999");
    }

    #[test]
    fn test_response_decode() {
        let frame = ResponseFrame::new(b'3', -812, ResponseLayout::EndThenChecksum);
        let decoded = ResponseFrame::decode(&frame.encode(), ResponseLayout::EndThenChecksum);
        assert_eq!(decoded, Ok(frame));

        // Wrong layout is detected through the marker position
        assert!(ResponseFrame::decode(&frame.encode(), ResponseLayout::ChecksumThenEnd).is_err());
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let frame = ResponseFrame::new(b'1', 0, ResponseLayout::ChecksumThenEnd);
        let mut buf = [0u8; 4];
        assert_eq!(frame.encode_into(&mut buf), Err(FrameError::BufferTooSmall));
    }

    proptest! {
        #[test]
        fn single_bit_corruption_is_rejected(
            selector in b'1'..=b'3',
            action in prop::sample::select(b"MSFRVEDACX".to_vec()),
            value in 0u32..=MAX_COMMAND_VALUE,
            byte in 1usize..9,
            bit in 0u8..8,
        ) {
            let mut bytes = CommandFrame::new(selector, action, value).unwrap().encode();
            bytes[byte] ^= 1 << bit;

            let mut parser = FrameParser::new();
            prop_assert_eq!(parser.feed_bytes(&bytes), Err(FrameError::InvalidChecksum));
        }
    }
}
