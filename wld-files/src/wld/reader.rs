use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::{
    consume_chunk_if, expect_chunk_id, find_chunk, next_chunk_is, read_array, read_string,
    scan_to_any, skip_bytes, skip_sized_chunk, skip_to_chunk,
};
use crate::common::types::Vec3;
use crate::log::{LogLevel, LogSink, NullSink};
use crate::wld::types::{
    Brush, BrushMip, FOURCC_BPOS, FOURCC_BR3D, FOURCC_BRAR, FOURCC_BREN, FOURCC_BRMP, FOURCC_BSC,
    FOURCC_BSP0, FOURCC_BUIV, FOURCC_DEND, FOURCC_DICT, FOURCC_DIMP, FOURCC_DPOS, FOURCC_DTRS,
    FOURCC_EDGS, FOURCC_EOAR, FOURCC_EOTA, FOURCC_PLNS, FOURCC_PSLE, FOURCC_PSLS, FOURCC_SHMP,
    FOURCC_TRAR, FOURCC_TREN, FOURCC_TRRN, FOURCC_VERC, FOURCC_VTXS, FOURCC_WEND, FOURCC_WLIF,
    FOURCC_WRLD, FOURCC_WSTA, Polygon, Sector, WorldAsset,
};

// Size fields are only honored strictly inside (0, envelope); anything else
// abandons the enclosing section and realignment falls to the WSTA scan.
const MAX_OPAQUE_SKIP: i64 = 10_000_000; // textures, shadow maps, terrain cells
const MAX_PORTAL_LINK_SKIP: i64 = 100_000_000; // PSLS payload
const MAX_BSP_NODES: i64 = 1_000_000;

const BSP_NODE_SIZE: u64 = 48;
const PLANE_SIZE: u64 = 32; // normal xyz + distance, 4 x f64
const EDGE_SIZE: u64 = 8; // two 32 bit vertex indices

pub struct WldReader {}

impl WldReader {
    /// Parses a complete WLD world from an in-memory reader, discarding all
    /// diagnostics.
    pub fn parse_asset<R: Read + Seek>(rdr: &mut R) -> Result<WorldAsset, ParserError> {
        WldReader::parse_asset_with_sink(rdr, &mut NullSink)
    }

    /// Parses a complete WLD world, narrating progress and recoverable
    /// failures through `sink`. Recoverable failures leave the affected
    /// section at its defaults; a fatal failure discards the partially
    /// decoded world and emits exactly one Error event.
    pub fn parse_asset_with_sink<R: Read + Seek>(
        rdr: &mut R,
        sink: &mut dyn LogSink,
    ) -> Result<WorldAsset, ParserError> {
        let mut world = WorldAsset::default();
        match read_world(rdr, &mut world, sink) {
            Ok(()) => {
                let sectors: usize = world
                    .brushes
                    .iter()
                    .flat_map(|brush| &brush.mips)
                    .map(|mip| mip.sectors.len())
                    .sum();
                let polygons: usize = world
                    .brushes
                    .iter()
                    .flat_map(|brush| &brush.mips)
                    .flat_map(|mip| &mip.sectors)
                    .map(|sector| sector.polygons.len())
                    .sum();
                sink.log(
                    LogLevel::Success,
                    &format!(
                        "world parsed: {} brushes, {} sectors, {} polygons",
                        world.brushes.len(),
                        sectors,
                        polygons
                    ),
                );
                Ok(world)
            }
            Err(err) => {
                sink.log(LogLevel::Error, &err.to_string());
                Err(err)
            }
        }
    }
}

fn read_world<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    if let Err(err) = read_engine_version(rdr, world, sink) {
        sink.log(
            LogLevel::Warn,
            &format!("engine version header unreadable: {err}"),
        );
    }

    expect_chunk_id(rdr, FOURCC_WRLD)?;

    read_brushes_section(rdr, world, sink)?;

    if let Err(err) = read_state_section(rdr, world, sink) {
        sink.log(
            LogLevel::Warn,
            &format!("world state section unreadable: {err}"),
        );
    }

    if skip_to_chunk(rdr, FOURCC_WEND)?.is_some() {
        expect_chunk_id(rdr, FOURCC_WEND)?;
    } else {
        sink.log(LogLevel::Warn, "WEND marker not found, accepting the world as-is");
    }
    Ok(())
}

fn read_engine_version<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    // Absence of the whole block is fine, older builds never wrote it.
    if !consume_chunk_if(rdr, FOURCC_BUIV)? {
        return Ok(());
    }
    let build = rdr.read_u32::<LittleEndian>()?;
    world.engine_build = Some(build);
    sink.log(LogLevel::Info, &format!("engine build {build}"));

    if consume_chunk_if(rdr, FOURCC_VERC)? {
        let length = i64::from(rdr.read_i32::<LittleEndian>()?);
        if length > 0 && length < 1000 {
            let version = read_string(rdr, length)?;
            sink.log(LogLevel::Info, &format!("engine version {version}"));
            world.engine_version = Some(version);
        }
    }
    Ok(())
}

// The DICT table lives at a file offset announced by DPOS, usually after the
// section that references it. It is decoded eagerly through the forward
// pointer while sequential parsing resumes right behind DPOS; the returned
// position (just past DEND) is where the section jumps once it is done.
fn read_dictionary_reference<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<Option<u64>, ParserError> {
    if consume_chunk_if(rdr, FOURCC_DIMP)? {
        match skip_sized_chunk(rdr, MAX_OPAQUE_SKIP) {
            Ok(size) => sink.log(LogLevel::Info, &format!("dictionary import skipped ({size} bytes)")),
            Err(err) => sink.log(LogLevel::Warn, &format!("dictionary import not skipped: {err}")),
        }
    }

    let mut dictionary_end = None;
    if consume_chunk_if(rdr, FOURCC_DPOS)? {
        let target = u64::from(rdr.read_u32::<LittleEndian>()?);
        let resume = rdr.stream_position()?;
        match read_dictionary(rdr, target, world, sink) {
            Ok(end) => dictionary_end = Some(end),
            Err(err) => sink.log(
                LogLevel::Warn,
                &format!("dictionary at offset {target} unreadable: {err}"),
            ),
        }
        rdr.seek(SeekFrom::Start(resume))?;
    }
    Ok(dictionary_end)
}

fn read_dictionary<R: Read + Seek>(
    rdr: &mut R,
    target: u64,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<u64, ParserError> {
    rdr.seek(SeekFrom::Start(target))?;
    expect_chunk_id(rdr, FOURCC_DICT)?;
    let count = rdr.read_u32::<LittleEndian>()?;
    sink.log(LogLevel::Info, &format!("dictionary with {count} filenames"));
    for index in 0..count {
        let length = i64::from(rdr.read_i32::<LittleEndian>()?);
        let filename = read_string(rdr, length)?;
        if index < 3 {
            sink.log(LogLevel::Info, &format!("  [{index}] {filename}"));
        }
        world.dictionary.push(filename);
    }
    expect_chunk_id(rdr, FOURCC_DEND)?;
    Ok(rdr.stream_position()?)
}

fn read_brushes_section<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    if next_chunk_is(rdr, FOURCC_WLIF)? {
        if let Err(err) = read_world_info(rdr, world, sink) {
            sink.log(LogLevel::Warn, &format!("world info unreadable: {err}"));
        }
    }

    let dictionary_end = read_dictionary_reference(rdr, world, sink)?;

    if next_chunk_is(rdr, FOURCC_BRAR)? {
        if let Err(err) = read_brush_archive(rdr, world, sink) {
            sink.log(LogLevel::Warn, &format!("brush archive abandoned: {err}"));
        }
    }

    if next_chunk_is(rdr, FOURCC_TRAR)? {
        if let Err(err) = skip_terrain_archive(rdr, sink) {
            sink.log(LogLevel::Warn, &format!("terrain archive abandoned: {err}"));
        }
    }

    if let Some(end) = dictionary_end {
        rdr.seek(SeekFrom::Start(end))?;
    }

    // A failed sub-decode may have stranded the cursor mid-chunk; the one
    // reliable landmark left is the state marker.
    match find_chunk(rdr, FOURCC_WSTA)? {
        Some(_) => Ok(()),
        None => Err(ParserError::WstaNotFound),
    }
}

fn read_world_info<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    expect_chunk_id(rdr, FOURCC_WLIF)?;
    consume_chunk_if(rdr, FOURCC_DTRS)?; // empty marker

    // Out-of-range lengths mean the field was never written; the length
    // word is consumed but no payload follows it.
    let length = i64::from(rdr.read_i32::<LittleEndian>()?);
    if length > 0 && length < 1000 {
        world.name = read_string(rdr, length)?;
    }
    world.spawn_flags = rdr.read_u32::<LittleEndian>()?;
    let length = i64::from(rdr.read_i32::<LittleEndian>()?);
    if length > 0 && length < 10000 {
        world.description = read_string(rdr, length)?;
    }
    sink.log(
        LogLevel::Info,
        &format!("world '{}', spawn flags {:#010x}", world.name, world.spawn_flags),
    );
    Ok(())
}

fn read_brush_archive<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    expect_chunk_id(rdr, FOURCC_BRAR)?;
    let brush_count = rdr.read_u32::<LittleEndian>()?;
    sink.log(LogLevel::Info, &format!("brush archive with {brush_count} brushes"));

    for id in 0..brush_count {
        let brush = read_brush(rdr, id, sink)?;
        world.brushes.push(brush);
    }

    if consume_chunk_if(rdr, FOURCC_PSLS)? {
        let _version = rdr.read_u32::<LittleEndian>()?;
        let size = skip_sized_chunk(rdr, MAX_PORTAL_LINK_SKIP)?;
        expect_chunk_id(rdr, FOURCC_PSLE)?;
        sink.log(LogLevel::Info, &format!("portal-sector links skipped ({size} bytes)"));
    }
    consume_chunk_if(rdr, FOURCC_EOAR)?;
    Ok(())
}

fn read_brush<R: Read + Seek>(
    rdr: &mut R,
    id: u32,
    sink: &mut dyn LogSink,
) -> Result<Brush, ParserError> {
    expect_chunk_id(rdr, FOURCC_BR3D)?;
    let brush_version = rdr.read_u32::<LittleEndian>()?;
    let mip_count = rdr.read_u32::<LittleEndian>()?;
    sink.log(
        LogLevel::Info,
        &format!("brush {id} (version {brush_version}): {mip_count} mips"),
    );

    let mut mips = Vec::new();
    for _ in 0..mip_count {
        mips.push(read_brush_mip(rdr)?);
    }
    expect_chunk_id(rdr, FOURCC_BREN)?;
    Ok(Brush { id, mips })
}

fn read_brush_mip<R: Read + Seek>(rdr: &mut R) -> Result<BrushMip, ParserError> {
    let mut mip = BrushMip::default();
    if consume_chunk_if(rdr, FOURCC_BRMP)? {
        mip.max_distance = rdr.read_f32::<LittleEndian>()?;
    }
    let sector_count = rdr.read_u32::<LittleEndian>()?;
    for _ in 0..sector_count {
        mip.sectors.push(read_sector(rdr)?);
    }
    Ok(mip)
}

fn read_sector<R: Read + Seek>(rdr: &mut R) -> Result<Sector, ParserError> {
    expect_chunk_id(rdr, FOURCC_BSC)?;
    let version = rdr.read_u32::<LittleEndian>()?;

    let mut sector = Sector::default();
    if version >= 1 {
        let length = i64::from(rdr.read_i32::<LittleEndian>()?);
        sector.name = read_string(rdr, length)?;
    }
    sector.color = rdr.read_u32::<LittleEndian>()?;
    sector.ambient = rdr.read_u32::<LittleEndian>()?;
    sector.flags = rdr.read_u32::<LittleEndian>()?;
    if version >= 2 {
        let _flags2 = rdr.read_u32::<LittleEndian>()?;
    }
    if version >= 3 {
        let _vis_flags = rdr.read_u32::<LittleEndian>()?;
    }

    expect_chunk_id(rdr, FOURCC_VTXS)?;
    let vertex_count = rdr.read_u32::<LittleEndian>()?;
    sector.vertices = read_array::<Vec3, _>(rdr, vertex_count)?;

    expect_chunk_id(rdr, FOURCC_PLNS)?;
    let plane_count = rdr.read_u32::<LittleEndian>()?;
    skip_bytes(rdr, u64::from(plane_count) * PLANE_SIZE)?;

    expect_chunk_id(rdr, FOURCC_EDGS)?;
    let edge_count = rdr.read_u32::<LittleEndian>()?;
    skip_bytes(rdr, u64::from(edge_count) * EDGE_SIZE)?;

    expect_chunk_id(rdr, FOURCC_BPOS)?;
    let bpo_version = rdr.read_u32::<LittleEndian>()?;
    let polygon_count = rdr.read_u32::<LittleEndian>()?;
    for _ in 0..polygon_count {
        let polygon = read_polygon(rdr, bpo_version, &sector.vertices)?;
        sector.polygons.push(polygon);
    }

    if consume_chunk_if(rdr, FOURCC_BSP0)? {
        let node_count = i64::from(rdr.read_i32::<LittleEndian>()?);
        if node_count <= 0 || node_count >= MAX_BSP_NODES {
            return Err(ParserError::FormatError {
                reason: "BSP node count outside the sanity envelope",
            });
        }
        skip_bytes(rdr, node_count as u64 * BSP_NODE_SIZE)?;
    }
    Ok(sector)
}

fn read_polygon<R: Read + Seek>(
    rdr: &mut R,
    bpo_version: u32,
    sector_vertices: &[Vec3],
) -> Result<Polygon, ParserError> {
    let _plane_index = rdr.read_u32::<LittleEndian>()?;

    let mut color = 0xFFFF_FFFF;
    let mut flags = 0;
    if bpo_version >= 2 {
        color = rdr.read_u32::<LittleEndian>()?;
        flags = rdr.read_u32::<LittleEndian>()?;
        for _ in 0..3 {
            skip_texture_slot(rdr)?;
        }
        skip_bytes(rdr, 8)?; // polygon properties
    }

    let edge_count = rdr.read_u32::<LittleEndian>()?;
    skip_bytes(rdr, u64::from(edge_count) * 4)?;

    let mut triangle_vertices: Vec<u32> = Vec::new();
    let mut triangle_elements: Vec<u32> = Vec::new();
    if bpo_version >= 4 {
        let vtx_count = rdr.read_u32::<LittleEndian>()?;
        triangle_vertices = read_array(rdr, vtx_count)?;
        let elem_count = rdr.read_u32::<LittleEndian>()?;
        triangle_elements = read_array(rdr, elem_count)?;
    }

    skip_shadow_map(rdr)?;

    if bpo_version >= 2 {
        let _shadow_color = rdr.read_u32::<LittleEndian>()?;
    } else {
        let _dummy = rdr.read_u8()?;
    }

    // Triangle indices outside the sector's vertex pool are dropped without
    // a warning, the volume would overwhelm the log.
    let vertices = triangle_vertices
        .iter()
        .filter(|&&index| (index as usize) < sector_vertices.len())
        .map(|&index| sector_vertices[index as usize])
        .collect();
    let indices = triangle_elements
        .into_iter()
        .filter(|&index| (index as usize) < sector_vertices.len())
        .collect();

    Ok(Polygon {
        vertices,
        indices,
        color,
        flags,
    })
}

// A texture slot is the filename plus 24 bytes of mapping definition
// (6 x f32), 4 packed scroll/blend/flags/dummy bytes and 4 bytes of color.
fn skip_texture_slot<R: Read + Seek>(rdr: &mut R) -> Result<(), ParserError> {
    let length = i64::from(rdr.read_i32::<LittleEndian>()?);
    if length < 0 || length >= MAX_OPAQUE_SKIP {
        return Err(ParserError::FormatError {
            reason: "texture filename length outside the sanity envelope",
        });
    }
    skip_bytes(rdr, length as u64 + 24 + 4 + 4)?;
    Ok(())
}

fn skip_shadow_map<R: Read + Seek>(rdr: &mut R) -> Result<(), ParserError> {
    if consume_chunk_if(rdr, FOURCC_SHMP)? {
        let size = i64::from(rdr.read_i32::<LittleEndian>()?);
        if size <= 0 || size >= MAX_OPAQUE_SKIP {
            return Err(ParserError::FormatError {
                reason: "shadow map size outside the sanity envelope",
            });
        }
        skip_bytes(rdr, size as u64)?;
    }
    Ok(())
}

fn skip_terrain_archive<R: Read + Seek>(
    rdr: &mut R,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    expect_chunk_id(rdr, FOURCC_TRAR)?;
    let terrain_count = rdr.read_u32::<LittleEndian>()?;
    sink.log(
        LogLevel::Info,
        &format!("terrain archive with {terrain_count} terrains, skipping"),
    );

    for _ in 0..terrain_count {
        expect_chunk_id(rdr, FOURCC_TRRN)?;
        let _version = rdr.read_u32::<LittleEndian>()?;
        let length = i64::from(rdr.read_i32::<LittleEndian>()?);
        let _name = read_string(rdr, length)?;
        skip_bytes(rdr, 8)?; // flags + padding
        let size_x = rdr.read_u32::<LittleEndian>()?;
        let size_y = rdr.read_u32::<LittleEndian>()?;
        let cells = u64::from(size_x) * u64::from(size_y);
        if cells >= MAX_OPAQUE_SKIP as u64 {
            return Err(ParserError::FormatError {
                reason: "terrain dimensions outside the sanity envelope",
            });
        }
        skip_bytes(rdr, cells * 2)?; // heightmap, 16 bit per cell
        skip_bytes(rdr, cells)?; // edge mask
        // The tail layout varies per terrain version, realign on the next
        // recognizable identifier.
        scan_to_any(rdr, &[FOURCC_TREN, FOURCC_TRRN, FOURCC_EOTA, FOURCC_DPOS])?;
        consume_chunk_if(rdr, FOURCC_TREN)?;
    }
    consume_chunk_if(rdr, FOURCC_EOTA)?;
    Ok(())
}

fn read_state_section<R: Read + Seek>(
    rdr: &mut R,
    world: &mut WorldAsset,
    sink: &mut dyn LogSink,
) -> Result<(), ParserError> {
    // A second dictionary may precede the state marker.
    let dictionary_end = read_dictionary_reference(rdr, world, sink)?;

    expect_chunk_id(rdr, FOURCC_WSTA)?;
    let state_version = rdr.read_u32::<LittleEndian>()?;
    sink.log(LogLevel::Info, &format!("world state version {state_version}"));

    if next_chunk_is(rdr, FOURCC_WLIF)? {
        read_world_info(rdr, world, sink)?;
    }

    world.background_color = rdr.read_u32::<LittleEndian>()?;
    sink.log(
        LogLevel::Info,
        &format!("background color {:#010x}", world.background_color),
    );

    if let Some(end) = dictionary_end {
        rdr.seek(SeekFrom::Start(end))?;
    }
    Ok(())
}
