//! Serialization capability.
//!
//! The typed persistence bridge hands a stream and a value to this
//! contract and otherwise stays format-blind: [`Serial::encode`] writes a
//! value's bytes to a sink, [`Serial::decode`] reconstructs a value from
//! a source, and the stream types only supply the bytes.
//!
//! The codecs shipped here are the reference collaborators: fixed-width
//! little-endian integers and floats, single-byte bools, and
//! length-prefixed byte strings. Any type can participate by
//! implementing [`Serial`].

use crate::error::IoError;

/// Byte stream a codec decodes from.
///
/// `pull` fills a prefix of `buf` and reports the count; zero means end
/// of stream.
pub trait SerialSource {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, IoError>;
}

/// Byte stream a codec encodes into.
pub trait SerialSink {
    fn push(&mut self, data: &[u8]) -> Result<(), IoError>;
}

/// Fill all of `buf` or fail with [`IoError::UnexpectedEof`].
pub fn read_exact_from(source: &mut dyn SerialSource, buf: &mut [u8]) -> Result<(), IoError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.pull(&mut buf[filled..])?;
        if n == 0 {
            return Err(IoError::UnexpectedEof);
        }
        filled += n;
    }
    Ok(())
}

/// A value that can write itself to a sink and rebuild itself from a
/// source. Decoding runs on existing storage so the persistence bridge
/// can fill caller-owned values in place.
pub trait Serial {
    fn encode(&self, sink: &mut dyn SerialSink) -> Result<(), IoError>;
    fn decode(&mut self, source: &mut dyn SerialSource) -> Result<(), IoError>;
}

// ---------------------------------------------------------------------------
// In-memory streams
// ---------------------------------------------------------------------------

impl SerialSource for &[u8] {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let n = self.len().min(buf.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

impl SerialSink for Vec<u8> {
    fn push(&mut self, data: &[u8]) -> Result<(), IoError> {
        self.extend_from_slice(data);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reference codecs
// ---------------------------------------------------------------------------

macro_rules! numeric_serial {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serial for $ty {
            fn encode(&self, sink: &mut dyn SerialSink) -> Result<(), IoError> {
                sink.push(&self.to_le_bytes())
            }

            fn decode(&mut self, source: &mut dyn SerialSource) -> Result<(), IoError> {
                let mut raw = [0u8; size_of::<$ty>()];
                read_exact_from(source, &mut raw)?;
                *self = <$ty>::from_le_bytes(raw);
                Ok(())
            }
        }
    )+};
}

numeric_serial!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Serial for bool {
    fn encode(&self, sink: &mut dyn SerialSink) -> Result<(), IoError> {
        sink.push(&[u8::from(*self)])
    }

    fn decode(&mut self, source: &mut dyn SerialSource) -> Result<(), IoError> {
        let mut raw = [0u8; 1];
        read_exact_from(source, &mut raw)?;
        *self = match raw[0] {
            0 => false,
            1 => true,
            other => return Err(IoError::codec(format!("invalid bool byte {other:#04x}"))),
        };
        Ok(())
    }
}

/// Length-prefixed raw bytes: u64 little-endian count, then the bytes.
impl Serial for Vec<u8> {
    fn encode(&self, sink: &mut dyn SerialSink) -> Result<(), IoError> {
        (self.len() as u64).encode(sink)?;
        sink.push(self)
    }

    fn decode(&mut self, source: &mut dyn SerialSource) -> Result<(), IoError> {
        let mut len = 0u64;
        len.decode(source)?;
        self.clear();
        // Fill in bounded chunks so a corrupt length fails on the read,
        // not on the allocation.
        let mut remaining = len as usize;
        let mut chunk = [0u8; 4096];
        while remaining > 0 {
            let take = remaining.min(chunk.len());
            read_exact_from(source, &mut chunk[..take])?;
            self.extend_from_slice(&chunk[..take]);
            remaining -= take;
        }
        Ok(())
    }
}

/// Length-prefixed UTF-8 text.
impl Serial for String {
    fn encode(&self, sink: &mut dyn SerialSink) -> Result<(), IoError> {
        (self.len() as u64).encode(sink)?;
        sink.push(self.as_bytes())
    }

    fn decode(&mut self, source: &mut dyn SerialSource) -> Result<(), IoError> {
        let mut raw = Vec::new();
        raw.decode(source)?;
        *self = String::from_utf8(raw)
            .map_err(|_| IoError::codec("string payload is not valid UTF-8"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Serial + Default + PartialEq + std::fmt::Debug>(value: T) {
        let mut bytes = Vec::new();
        value.encode(&mut bytes).unwrap();
        let mut back = T::default();
        back.decode(&mut bytes.as_slice()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_numeric_round_trips() {
        round_trip(0u8);
        round_trip(42u32);
        round_trip(-42i32);
        round_trip(u64::MAX);
        round_trip(i64::MIN);
        round_trip(3.25f32);
        round_trip(-0.125f64);
    }

    #[test]
    fn test_bool_round_trip_and_rejection() {
        round_trip(true);
        round_trip(false);
        let mut b = false;
        let err = b.decode(&mut [7u8].as_slice()).unwrap_err();
        assert!(matches!(err, IoError::Codec { .. }));
    }

    #[test]
    fn test_int_is_little_endian() {
        let mut bytes = Vec::new();
        42u32.encode(&mut bytes).unwrap();
        assert_eq!(bytes, [42, 0, 0, 0]);
    }

    #[test]
    fn test_string_round_trip() {
        round_trip(String::from("héllo stream"));
        round_trip(String::new());
    }

    #[test]
    fn test_vec_round_trip() {
        round_trip(vec![1u8, 2, 3, 255]);
        round_trip(Vec::<u8>::new());
    }

    #[test]
    fn test_truncated_payload_is_unexpected_eof() {
        let mut bytes = Vec::new();
        0xdead_beefu32.encode(&mut bytes).unwrap();
        bytes.pop();
        let mut back = 0u32;
        assert_eq!(
            back.decode(&mut bytes.as_slice()),
            Err(IoError::UnexpectedEof)
        );
    }

    #[test]
    fn test_corrupt_length_fails_on_read() {
        // Claims u64::MAX bytes follow; none do.
        let mut bytes = Vec::new();
        u64::MAX.encode(&mut bytes).unwrap();
        let mut back = Vec::<u8>::new();
        assert_eq!(
            back.decode(&mut bytes.as_slice()),
            Err(IoError::UnexpectedEof)
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut bytes = Vec::new();
        vec![0xffu8, 0xfe].encode(&mut bytes).unwrap();
        let mut back = String::new();
        assert!(matches!(
            back.decode(&mut bytes.as_slice()),
            Err(IoError::Codec { .. })
        ));
    }
}
