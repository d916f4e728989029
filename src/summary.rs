use glam::DVec3;
use itertools::Itertools;
use wld_files::common::types::Argb;
use wld_files::wld::types::WorldAsset;

use crate::settings::CliArgs;

/// Derived aggregates over a parsed world, the numbers behind the
/// information sidebar.
#[derive(Debug, Default)]
pub struct WorldSummary {
    pub brush_count: usize,
    pub mip_count: usize,
    pub sector_count: usize,
    pub polygon_count: usize,
    pub vertex_count: usize,
    pub triangle_index_count: usize,
    pub bounds: Option<(DVec3, DVec3)>,
}

impl WorldSummary {
    pub fn of(world: &WorldAsset) -> WorldSummary {
        let mut summary = WorldSummary {
            brush_count: world.brushes.len(),
            ..Default::default()
        };
        for brush in &world.brushes {
            summary.mip_count += brush.mips.len();
            for mip in &brush.mips {
                summary.sector_count += mip.sectors.len();
                for sector in &mip.sectors {
                    summary.polygon_count += sector.polygons.len();
                    summary.vertex_count += sector.vertices.len();
                    summary.triangle_index_count += sector
                        .polygons
                        .iter()
                        .map(|polygon| polygon.indices.len())
                        .sum::<usize>();
                    for vertex in &sector.vertices {
                        let point = DVec3::new(vertex.x, vertex.y, vertex.z);
                        summary.bounds = Some(match summary.bounds {
                            Some((min, max)) => (min.min(point), max.max(point)),
                            None => (point, point),
                        });
                    }
                }
            }
        }
        summary
    }

    pub fn print(&self, world: &WorldAsset, args: &CliArgs) {
        let name = if world.name.is_empty() { "<unnamed>" } else { &world.name };
        println!("world:       {}", name);
        if !world.description.is_empty() {
            println!("description: {}", world.description);
        }
        if let Some(build) = world.engine_build {
            let version = world.engine_version.as_deref().unwrap_or("?");
            println!("engine:      build {} ({})", build, version.trim_end_matches('\0'));
        }
        let background = Argb::from(world.background_color);
        println!(
            "background:  #{:02X}{:02X}{:02X} (alpha {})",
            background.r, background.g, background.b, background.a
        );
        println!("spawn flags: {:#010x}", world.spawn_flags);
        println!(
            "geometry:    {} brushes, {} mips, {} sectors, {} polygons, {} vertices, {} strip indices",
            self.brush_count,
            self.mip_count,
            self.sector_count,
            self.polygon_count,
            self.vertex_count,
            self.triangle_index_count
        );
        if let Some((min, max)) = self.bounds {
            println!(
                "extents:     ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
        }
        println!("dictionary:  {} filenames", world.dictionary.len());

        if args.dictionary {
            for (index, filename) in world.dictionary.iter().enumerate() {
                println!("  [{index}] {filename}");
            }
        }

        if args.brushes {
            for brush in &world.brushes {
                let sectors: usize = brush.mips.iter().map(|mip| mip.sectors.len()).sum();
                let polygons: usize = brush
                    .mips
                    .iter()
                    .flat_map(|mip| &mip.sectors)
                    .map(|sector| sector.polygons.len())
                    .sum();
                let distances = brush
                    .mips
                    .iter()
                    .map(|mip| format!("{:.0}", mip.max_distance))
                    .join("/");
                println!(
                    "  brush {:>4}: {} mips (switch at {}), {} sectors, {} polygons",
                    brush.id,
                    brush.mips.len(),
                    distances,
                    sectors,
                    polygons
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wld_files::common::types::Vec3;
    use wld_files::wld::types::{Brush, BrushMip, Polygon, Sector, WorldAsset};

    use super::WorldSummary;

    #[test]
    fn aggregates_follow_the_tree() {
        let sector = Sector {
            name: "s".to_owned(),
            vertices: vec![
                Vec3 { x: -1.0, y: 0.0, z: 0.0 },
                Vec3 { x: 2.0, y: 3.0, z: -4.0 },
            ],
            polygons: vec![Polygon {
                vertices: Vec::new(),
                indices: vec![0, 1, 0],
                color: 0,
                flags: 0,
            }],
            ..Default::default()
        };
        let world = WorldAsset {
            brushes: vec![Brush {
                id: 0,
                mips: vec![BrushMip {
                    max_distance: 1000.0,
                    sectors: vec![sector],
                }],
            }],
            ..Default::default()
        };

        let summary = WorldSummary::of(&world);
        assert_eq!(summary.brush_count, 1);
        assert_eq!(summary.mip_count, 1);
        assert_eq!(summary.sector_count, 1);
        assert_eq!(summary.polygon_count, 1);
        assert_eq!(summary.vertex_count, 2);
        assert_eq!(summary.triangle_index_count, 3);
        let (min, max) = summary.bounds.unwrap();
        assert_eq!(min.x, -1.0);
        assert_eq!(max.y, 3.0);
        assert_eq!(min.z, -4.0);
    }
}
