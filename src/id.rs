use std::{fmt, ops, str};

use crate::error::{Error, Result};

/// Represents a time-ordered unique identifier.
///
/// The derived comparison operators compare the underlying byte arrays, which is the unsigned
/// lexicographic order of the 16-byte encoding: by timestamp, then sequence, then node identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct UniqueId([u8; 16]);

impl UniqueId {
    /// Nil identifier (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max identifier (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Packs field values big-endian into an identifier.
    pub const fn new(timestamp: i64, sequence: i16, node_id: NodeId) -> Self {
        let ts = timestamp.to_be_bytes();
        let seq = sequence.to_be_bytes();
        let node = node_id.0;
        Self([
            ts[0], ts[1], ts[2], ts[3], ts[4], ts[5], ts[6], ts[7], seq[0], seq[1], node[0],
            node[1], node[2], node[3], node[4], node[5],
        ])
    }

    /// Creates an identifier from field values, taking the node identifier as a raw byte string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] if `node_id` is not exactly six bytes long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uniqueid::UniqueId;
    ///
    /// let id = UniqueId::from_fields(1_704_067_200_000, 1, b"abcdef")?;
    /// assert_eq!(id.to_string(), "0000018c-c251-f400-0001-616263646566");
    /// assert!(UniqueId::from_fields(1_704_067_200_000, 1, b"abc").is_err());
    /// # Ok::<(), uniqueid::Error>(())
    /// ```
    pub fn from_fields(timestamp: i64, sequence: i16, node_id: &[u8]) -> Result<Self> {
        Ok(Self::new(timestamp, sequence, NodeId::try_from(node_id)?))
    }

    /// Returns the milliseconds since the Unix epoch stored in bytes `[0, 8)`.
    pub const fn timestamp(&self) -> i64 {
        let b = &self.0;
        i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    /// Returns the per-millisecond counter stored in bytes `[8, 10)`.
    pub const fn sequence(&self) -> i16 {
        i16::from_be_bytes([self.0[8], self.0[9]])
    }

    /// Returns the node identifier stored in bytes `[10, 16)`.
    pub const fn node_id(&self) -> NodeId {
        let b = &self.0;
        NodeId([b[10], b[11], b[12], b[13], b[14], b[15]])
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uniqueid::UniqueId;
    ///
    /// let x = "0000018c-c251-f400-0001-616263646566".parse::<UniqueId>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "0000018c-c251-f400-0001-616263646566");
    /// assert_eq!(format!("{}", y), "0000018c-c251-f400-0001-616263646566");
    /// # Ok::<(), uniqueid::Error>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, e) in self.0.iter().enumerate() {
            buffer[pos] = DIGITS[(e >> 4) as usize];
            buffer[pos + 1] = DIGITS[(e & 15) as usize];
            pos += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[pos] = b'-';
                pos += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        IdStr(buffer)
    }
}

impl fmt::Display for UniqueId {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for UniqueId {
    type Err = Error;

    /// Creates an object from a 36-character hexadecimal string representation.
    ///
    /// Hyphens are ignored wherever they appear, and the remaining characters must be exactly 32
    /// hexadecimal digits in either case. The canonical 8-4-4-4-12 form is one such string.
    fn from_str(src: &str) -> Result<Self> {
        const ERR: Error = Error::InvalidFormat;
        if src.len() != 36 {
            return Err(ERR);
        }
        let mut dst = [0u8; 16];
        let mut iter = src.chars().filter(|&c| c != '-');
        for e in dst.iter_mut() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl From<UniqueId> for [u8; 16] {
    fn from(src: UniqueId) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for UniqueId {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for UniqueId {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<UniqueId> for u128 {
    fn from(src: UniqueId) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for UniqueId {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<UniqueId> for String {
    fn from(src: UniqueId) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for UniqueId {
    type Error = Error;

    fn try_from(src: String) -> Result<Self> {
        src.parse()
    }
}

/// Concrete return type of [`UniqueId::encode()`] containing the stack-allocated 8-4-4-4-12
/// string representation.
struct IdStr([u8; 36]);

impl ops::Deref for IdStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl fmt::Display for IdStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// The six-byte node identifier embedded in every [`UniqueId`] a generator produces.
///
/// Distinct generator instances must be given distinct node identifiers; nothing here detects a
/// collision between two instances sharing one.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct NodeId([u8; 6]);

impl NodeId {
    /// Width of a node identifier in bytes.
    pub const LEN: usize = 6;

    /// Wraps six raw bytes.
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Draws a node identifier from the thread-local random number generator.
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<[u8; 6]> for NodeId {
    fn from(src: [u8; 6]) -> Self {
        Self(src)
    }
}

impl From<NodeId> for [u8; 6] {
    fn from(src: NodeId) -> Self {
        src.0
    }
}

impl TryFrom<&[u8]> for NodeId {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self> {
        <[u8; 6]>::try_from(src)
            .map(Self)
            .map_err(|_| Error::InvalidLength { len: src.len() })
    }
}

impl str::FromStr for NodeId {
    type Err = Error;

    /// Uses the UTF-8 bytes of `src`, which must be exactly six bytes long.
    fn from_str(src: &str) -> Result<Self> {
        Self::try_from(src.as_bytes())
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::UniqueId;

    impl From<UniqueId> for uuid::Uuid {
        fn from(src: UniqueId) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for UniqueId {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, UniqueId};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for UniqueId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for UniqueId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = UniqueId;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a unique identifier representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

}
