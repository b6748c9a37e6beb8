use cookie_factory::combinator::slice;
use cookie_factory::SerializeFn;
use nom::error::ParseError;
use nom::number::complete as number;
use nom::number::Endianness;
use nom::IResult;
use std::io::Write;

/// Byte order of all multi-byte fields following the magic number
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

impl ByteOrder {
    #[inline]
    fn nom_endianness(self) -> Endianness {
        match self {
            ByteOrder::Big => Endianness::Big,
            ByteOrder::Little => Endianness::Little,
        }
    }

    #[inline]
    pub(crate) fn parse_u16<'a, E: ParseError<&'a [u8]>>(
        self,
        i: &'a [u8],
    ) -> IResult<&'a [u8], u16, E> {
        number::u16(self.nom_endianness())(i)
    }

    #[inline]
    pub(crate) fn parse_u32<'a, E: ParseError<&'a [u8]>>(
        self,
        i: &'a [u8],
    ) -> IResult<&'a [u8], u32, E> {
        number::u32(self.nom_endianness())(i)
    }

    #[inline]
    pub(crate) fn parse_i32<'a, E: ParseError<&'a [u8]>>(
        self,
        i: &'a [u8],
    ) -> IResult<&'a [u8], i32, E> {
        number::i32(self.nom_endianness())(i)
    }

    #[inline]
    pub(crate) fn gen_u16<W: Write>(self, n: u16) -> impl SerializeFn<W> {
        slice(match self {
            ByteOrder::Big => n.to_be_bytes(),
            ByteOrder::Little => n.to_le_bytes(),
        })
    }

    #[inline]
    pub(crate) fn gen_u32<W: Write>(self, n: u32) -> impl SerializeFn<W> {
        slice(match self {
            ByteOrder::Big => n.to_be_bytes(),
            ByteOrder::Little => n.to_le_bytes(),
        })
    }

    #[inline]
    pub(crate) fn gen_i32<W: Write>(self, n: i32) -> impl SerializeFn<W> {
        slice(match self {
            ByteOrder::Big => n.to_be_bytes(),
            ByteOrder::Little => n.to_le_bytes(),
        })
    }
}
