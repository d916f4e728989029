use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::types::ChunkId;

/// Strings are length-prefixed in the container; anything beyond this is
/// a corrupt length field, not a real string.
const MAX_STRING_LENGTH: i64 = 1_000_000;

pub(crate) trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ParserError>;
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<i8> for i8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i8, ParserError> {
        Ok(rdr.read_i8()?)
    }
}

impl Parseable<u16> for u16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u16, ParserError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl Parseable<i16> for i16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i16, ParserError> {
        Ok(rdr.read_i16::<LittleEndian>()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<i32> for i32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i32, ParserError> {
        Ok(rdr.read_i32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

impl Parseable<f64> for f64 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f64, ParserError> {
        Ok(rdr.read_f64::<LittleEndian>()?)
    }
}

/// Reads `length` bytes and decodes them as UTF-8, lossily. A trailing NUL
/// is retained as written, the source strings are length-prefixed.
pub(crate) fn read_string<R: Read>(rdr: &mut R, length: i64) -> Result<String, ParserError> {
    if length < 0 || length > MAX_STRING_LENGTH {
        return Err(ParserError::InvalidLength { length });
    }
    let mut buf = vec![0u8; length as usize];
    rdr.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Reads single-byte characters up to and including a terminating NUL (not
/// part of the result) or EOF, whichever comes first.
pub fn read_cstring<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
    let mut buf = Vec::new();
    loop {
        match rdr.read_u8() {
            Ok(0) => break,
            Ok(c) => buf.push(c),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Reads `count` consecutive records. WLD arrays are explicit-count, the
/// count word always precedes the payload.
pub(crate) fn read_array<T: Parseable<T>, R: Read>(rdr: &mut R, count: u32) -> Result<Vec<T>, ParserError> {
    let mut list = Vec::new();
    for _ in 0..count {
        list.push(T::parse(rdr)?);
    }
    Ok(list)
}

pub(crate) fn read_chunk_id<R: Read>(rdr: &mut R) -> Result<ChunkId, ParserError> {
    let mut id = [0u8; 4];
    rdr.read_exact(&mut id)?;
    Ok(ChunkId(id))
}

/// Returns the next FourCC without advancing the cursor.
pub(crate) fn peek_chunk_id<R: Read + Seek>(rdr: &mut R) -> Result<ChunkId, ParserError> {
    let position = rdr.stream_position()?;
    let id = read_chunk_id(rdr);
    rdr.seek(SeekFrom::Start(position))?;
    id
}

/// Like [`peek_chunk_id`], but EOF simply means "no".
pub(crate) fn next_chunk_is<R: Read + Seek>(rdr: &mut R, id: ChunkId) -> Result<bool, ParserError> {
    match peek_chunk_id(rdr) {
        Ok(actual) => Ok(actual == id),
        Err(ParserError::Truncated) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Consumes the next FourCC when it matches `id`, reporting whether it did.
pub(crate) fn consume_chunk_if<R: Read + Seek>(rdr: &mut R, id: ChunkId) -> Result<bool, ParserError> {
    if next_chunk_is(rdr, id)? {
        read_chunk_id(rdr)?;
        return Ok(true);
    }
    Ok(false)
}

pub(crate) fn expect_chunk_id<R: Read + Seek>(rdr: &mut R, expected: ChunkId) -> Result<(), ParserError> {
    let position = rdr.stream_position()?;
    let actual = read_chunk_id(rdr)?;
    if actual != expected {
        return Err(ParserError::UnexpectedChunk {
            expected,
            actual,
            position,
        });
    }
    Ok(())
}

// FourCCs are not aligned within the file, so every scan below steps one
// byte at a time over a rolling 4-byte window.
fn scan<R: Read + Seek>(rdr: &mut R, targets: &[ChunkId]) -> Result<Option<(u64, ChunkId)>, ParserError> {
    let mut window = [0u8; 4];
    let mut filled = 0usize;
    loop {
        match rdr.read_u8() {
            Ok(byte) => {
                if filled < 4 {
                    window[filled] = byte;
                    filled += 1;
                } else {
                    window.copy_within(1.., 0);
                    window[3] = byte;
                }
                if filled == 4 {
                    let id = ChunkId(window);
                    if targets.contains(&id) {
                        let start = rdr.stream_position()? - 4;
                        rdr.seek(SeekFrom::Start(start))?;
                        return Ok(Some((start, id)));
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Linear forward search for `id`. Positions the cursor at the match
/// (without consuming it) on success, restores it on a miss.
pub(crate) fn find_chunk<R: Read + Seek>(rdr: &mut R, id: ChunkId) -> Result<Option<u64>, ParserError> {
    let origin = rdr.stream_position()?;
    match scan(rdr, &[id])? {
        Some((position, _)) => Ok(Some(position)),
        None => {
            rdr.seek(SeekFrom::Start(origin))?;
            Ok(None)
        }
    }
}

/// Linear forward search that leaves the cursor at the match or at EOF,
/// whichever comes first.
pub(crate) fn skip_to_chunk<R: Read + Seek>(rdr: &mut R, id: ChunkId) -> Result<Option<u64>, ParserError> {
    Ok(scan(rdr, &[id])?.map(|(position, _)| position))
}

/// Advances to the first occurrence of any of `targets`, or to EOF.
pub(crate) fn scan_to_any<R: Read + Seek>(
    rdr: &mut R,
    targets: &[ChunkId],
) -> Result<Option<ChunkId>, ParserError> {
    Ok(scan(rdr, targets)?.map(|(_, id)| id))
}

pub(crate) fn stream_len<R: Seek>(rdr: &mut R) -> Result<u64, ParserError> {
    let position = rdr.stream_position()?;
    let len = rdr.seek(SeekFrom::End(0))?;
    rdr.seek(SeekFrom::Start(position))?;
    Ok(len)
}

pub(crate) fn remaining<R: Seek>(rdr: &mut R) -> Result<u64, ParserError> {
    let position = rdr.stream_position()?;
    Ok(stream_len(rdr)?.saturating_sub(position))
}

pub(crate) fn skip_bytes<R: Seek>(rdr: &mut R, count: u64) -> Result<(), ParserError> {
    rdr.seek(SeekFrom::Current(count as i64))?;
    Ok(())
}

/// Reads a 32 bit size field and skips that many bytes. Sizes outside the
/// open interval `(0, envelope)` or past the end of the buffer are malformed
/// and leave the cursor right after the size field.
pub(crate) fn skip_sized_chunk<R: Read + Seek>(rdr: &mut R, envelope: i64) -> Result<u64, ParserError> {
    let size = i64::from(rdr.read_i32::<LittleEndian>()?);
    if size <= 0 || size >= envelope || size as u64 > remaining(rdr)? {
        return Err(ParserError::FormatError {
            reason: "chunk size outside the sanity envelope",
        });
    }
    skip_bytes(rdr, size as u64)?;
    Ok(size as u64)
}
