use pretty_assertions::assert_eq;

use super::*;

fn encode(v: u64) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_uleb128_u64(v);
    w.into_bytes()
}

#[test]
fn known_encodings() {
    assert_eq!(encode(0), vec![0x00]);
    assert_eq!(encode(127), vec![0x7f]);
    assert_eq!(encode(128), vec![0x80, 0x01]);
    assert_eq!(encode(624_485), vec![0xe5, 0x8e, 0x26]);
}

#[test]
fn extremes_decode() {
    for v in [0, 1, 300, u64::from(u32::MAX), u64::MAX] {
        let bytes = encode(v);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_uleb128_u64().unwrap(), v);
        assert!(r.is_at_end());
    }
}

#[test]
fn truncated_varint_is_eof() {
    let mut r = Reader::new(&[0x80, 0x80]);
    assert_eq!(r.read_uleb128_u64(), Err(DecodeError::UnexpectedEof));
}

#[test]
fn overlong_varint_is_rejected() {
    let bytes = [0xff; 11];
    let mut r = Reader::new(&bytes);
    assert_eq!(r.read_uleb128_u64(), Err(DecodeError::InvalidVarint));
}

#[test]
fn overflowing_final_byte_is_rejected() {
    // Nine continuation bytes then a final byte carrying more than one bit.
    let mut bytes = vec![0xff; 9];
    bytes.push(0x02);
    let mut r = Reader::new(&bytes);
    assert_eq!(r.read_uleb128_u64(), Err(DecodeError::InvalidVarint));
}

#[test]
fn read_past_end() {
    let mut r = Reader::new(&[7]);
    assert_eq!(r.read_u8().unwrap(), 7);
    assert!(r.is_at_end());
    assert_eq!(r.read_u8(), Err(DecodeError::UnexpectedEof));
}
