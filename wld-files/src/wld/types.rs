use crate::common::types::{ChunkId, Vec3};

// The WLD container written by the Serious Engine 1 editor.
// https://github.com/Croteam-official/Serious-Engine

pub const FOURCC_BUIV: ChunkId = ChunkId(*b"BUIV");
pub const FOURCC_VERC: ChunkId = ChunkId(*b"VERC");
pub const FOURCC_WRLD: ChunkId = ChunkId(*b"WRLD");
pub const FOURCC_WLIF: ChunkId = ChunkId(*b"WLIF");
pub const FOURCC_DTRS: ChunkId = ChunkId(*b"DTRS");
pub const FOURCC_DIMP: ChunkId = ChunkId(*b"DIMP");
pub const FOURCC_DPOS: ChunkId = ChunkId(*b"DPOS");
pub const FOURCC_DICT: ChunkId = ChunkId(*b"DICT");
pub const FOURCC_DEND: ChunkId = ChunkId(*b"DEND");
pub const FOURCC_BRAR: ChunkId = ChunkId(*b"BRAR");
pub const FOURCC_BR3D: ChunkId = ChunkId(*b"BR3D");
pub const FOURCC_BRMP: ChunkId = ChunkId(*b"BRMP");
pub const FOURCC_BREN: ChunkId = ChunkId(*b"BREN");
/// The trailing space is part of the identifier.
pub const FOURCC_BSC: ChunkId = ChunkId(*b"BSC ");
pub const FOURCC_VTXS: ChunkId = ChunkId(*b"VTXs");
pub const FOURCC_PLNS: ChunkId = ChunkId(*b"PLNs");
pub const FOURCC_EDGS: ChunkId = ChunkId(*b"EDGs");
pub const FOURCC_BPOS: ChunkId = ChunkId(*b"BPOs");
pub const FOURCC_BSP0: ChunkId = ChunkId(*b"BSP0");
pub const FOURCC_SHMP: ChunkId = ChunkId(*b"SHMP");
pub const FOURCC_PSLS: ChunkId = ChunkId(*b"PSLS");
pub const FOURCC_PSLE: ChunkId = ChunkId(*b"PSLE");
pub const FOURCC_EOAR: ChunkId = ChunkId(*b"EOAR");
pub const FOURCC_TRAR: ChunkId = ChunkId(*b"TRAR");
pub const FOURCC_TRRN: ChunkId = ChunkId(*b"TRRN");
pub const FOURCC_TREN: ChunkId = ChunkId(*b"TREN");
pub const FOURCC_EOTA: ChunkId = ChunkId(*b"EOTA");
pub const FOURCC_WSTA: ChunkId = ChunkId(*b"WSTA");
pub const FOURCC_WEND: ChunkId = ChunkId(*b"WEND");

/// A fully decoded world. Sole owner of its sub-tree; nothing in here is
/// mutated after the parse returns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorldAsset {
    pub name: String,
    pub description: String,
    /// ARGB word, high byte is the alpha channel.
    pub background_color: u32,
    pub spawn_flags: u32,
    pub engine_build: Option<u32>,
    /// Only ever set when `engine_build` is, the `VERC` sub-chunk lives
    /// inside the `BUIV` block.
    pub engine_version: Option<String>,
    /// Resource filenames from every `DICT` table, in decode order. The
    /// names are not resolved into assets.
    pub dictionary: Vec<String>,
    pub entities: Vec<Entity>,
    pub brushes: Vec<Brush>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    /// Equal to the brush's index within the archive.
    pub id: u32,
    /// The lowest-index mip is the highest-detail one.
    pub mips: Vec<BrushMip>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushMip {
    pub max_distance: f32,
    pub sectors: Vec<Sector>,
}

impl Default for BrushMip {
    fn default() -> Self {
        BrushMip {
            max_distance: 1_000_000.0,
            sectors: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sector {
    pub name: String,
    pub color: u32,
    pub ambient: u32,
    pub flags: u32,
    pub vertices: Vec<Vec3>,
    /// Polygons index into `vertices`.
    pub polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Resolved by copy from the owning sector's vertex pool.
    pub vertices: Vec<Vec3>,
    /// Triangle-strip elements. Empty means the polygon is to be
    /// triangulated as a fan at render time.
    pub indices: Vec<u32>,
    pub color: u32,
    pub flags: u32,
}

/// Placed world entity. The entity archive is not decoded yet, so worlds
/// currently come back with an empty entity list.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub class_name: String,
    pub placement: Placement,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Vec3,
}
