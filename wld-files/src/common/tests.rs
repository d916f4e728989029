use std::io::{Cursor, Seek, SeekFrom};

use crate::ParserError;
use crate::common::reader::{
    Parseable, consume_chunk_if, expect_chunk_id, find_chunk, next_chunk_is, peek_chunk_id,
    read_array, read_cstring, read_string, skip_sized_chunk, skip_to_chunk,
};
use crate::common::types::{Argb, ChunkId, Vec3};

#[test]
fn peek_does_not_advance() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"BRARtail".to_vec());
    let id = peek_chunk_id(&mut rdr)?;
    assert_eq!(id.as_bytes(), b"BRAR");
    assert_eq!(rdr.stream_position()?, 0);
    Ok(())
}

#[test]
fn expect_mismatch_carries_position() {
    let mut rdr = Cursor::new(b"xxBRAR".to_vec());
    rdr.seek(SeekFrom::Start(2)).unwrap();
    let err = expect_chunk_id(&mut rdr, ChunkId(*b"BR3D")).unwrap_err();
    match err {
        ParserError::UnexpectedChunk {
            expected,
            actual,
            position,
        } => {
            assert_eq!(expected.as_bytes(), b"BR3D");
            assert_eq!(actual.as_bytes(), b"BRAR");
            assert_eq!(position, 2);
        }
        other => panic!("expected UnexpectedChunk, got {:?}", other),
    }
}

#[test]
fn next_chunk_is_false_at_eof() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"ab".to_vec());
    assert!(!next_chunk_is(&mut rdr, ChunkId(*b"BRAR"))?);
    assert_eq!(rdr.stream_position()?, 0);
    Ok(())
}

#[test]
fn consume_chunk_if_only_consumes_on_match() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"BRMPBRAR".to_vec());
    assert!(!consume_chunk_if(&mut rdr, ChunkId(*b"BRAR"))?);
    assert_eq!(rdr.stream_position()?, 0);
    assert!(consume_chunk_if(&mut rdr, ChunkId(*b"BRMP"))?);
    assert_eq!(rdr.stream_position()?, 4);
    Ok(())
}

#[test]
fn find_chunk_matches_unaligned() -> Result<(), anyhow::Error> {
    // The target deliberately sits at an odd offset.
    let mut rdr = Cursor::new(b"xWSTAtail".to_vec());
    let position = find_chunk(&mut rdr, ChunkId(*b"WSTA"))?;
    assert_eq!(position, Some(1));
    assert_eq!(rdr.stream_position()?, 1);
    Ok(())
}

#[test]
fn find_chunk_restores_position_on_miss() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"abcdefgh".to_vec());
    rdr.seek(SeekFrom::Start(2))?;
    assert_eq!(find_chunk(&mut rdr, ChunkId(*b"WSTA"))?, None);
    assert_eq!(rdr.stream_position()?, 2);
    Ok(())
}

#[test]
fn skip_to_chunk_stops_at_eof_on_miss() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"abcdefgh".to_vec());
    assert_eq!(skip_to_chunk(&mut rdr, ChunkId(*b"WEND"))?, None);
    assert_eq!(rdr.stream_position()?, 8);
    Ok(())
}

#[test]
fn read_string_retains_trailing_nul() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"abc\0".to_vec());
    assert_eq!(read_string(&mut rdr, 4)?, "abc\0");
    Ok(())
}

#[test]
fn read_string_rejects_bad_lengths() {
    let mut rdr = Cursor::new(b"abc".to_vec());
    assert!(matches!(
        read_string(&mut rdr, -1),
        Err(ParserError::InvalidLength { length: -1 })
    ));
    assert!(matches!(
        read_string(&mut rdr, 1_000_001),
        Err(ParserError::InvalidLength { .. })
    ));
    // a sane length past EOF is a truncation instead
    assert!(matches!(read_string(&mut rdr, 16), Err(ParserError::Truncated)));
}

#[test]
fn read_cstring_stops_at_nul_or_eof() -> Result<(), anyhow::Error> {
    let mut rdr = Cursor::new(b"abc\0def".to_vec());
    assert_eq!(read_cstring(&mut rdr)?, "abc");
    assert_eq!(read_cstring(&mut rdr)?, "def");
    Ok(())
}

#[test]
fn sized_skip_respects_the_envelope() -> Result<(), anyhow::Error> {
    let mut bytes = 4u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    let mut rdr = Cursor::new(bytes);
    assert_eq!(skip_sized_chunk(&mut rdr, 1000)?, 4);
    assert_eq!(rdr.stream_position()?, 8);

    // zero is outside the open interval
    let mut rdr = Cursor::new(0u32.to_le_bytes().to_vec());
    assert!(matches!(
        skip_sized_chunk(&mut rdr, 1000),
        Err(ParserError::FormatError { .. })
    ));

    // announced size runs past the end of the buffer
    let mut rdr = Cursor::new(16u32.to_le_bytes().to_vec());
    assert!(matches!(
        skip_sized_chunk(&mut rdr, 1000),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}

#[test]
fn read_array_is_count_driven() -> Result<(), anyhow::Error> {
    let mut bytes = Vec::new();
    for value in [1u32, 2, 3] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    let mut rdr = Cursor::new(bytes);
    let values: Vec<u32> = read_array(&mut rdr, 2)?;
    assert_eq!(values, vec![1, 2]);
    // the third record is there, a fourth is not
    assert!(matches!(
        read_array::<u32, _>(&mut rdr, 2),
        Err(ParserError::Truncated)
    ));
    Ok(())
}

#[test]
fn vec3_reads_little_endian_doubles() -> Result<(), anyhow::Error> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1.5f64.to_le_bytes());
    bytes.extend_from_slice(&(-2.0f64).to_le_bytes());
    bytes.extend_from_slice(&0.25f64.to_le_bytes());
    let vec = Vec3::parse(&mut Cursor::new(bytes))?;
    assert_eq!(vec, Vec3 { x: 1.5, y: -2.0, z: 0.25 });
    Ok(())
}

#[test]
fn argb_word_round_trips() {
    let color = Argb::from(0x00FF0000);
    assert_eq!(color.a, 0x00);
    assert_eq!(color.r, 0xFF);
    assert_eq!(color.g, 0x00);
    assert_eq!(color.b, 0x00);
    assert_eq!(u32::from(color), 0x00FF0000);
}

#[test]
fn chunk_id_renders_readably() {
    assert_eq!(ChunkId(*b"BSC ").to_string(), "BSC ");
    assert_eq!(ChunkId([0x42, 0x52, 0x00, 0xFF]).to_string(), "BR\\x00\\xff");
}
