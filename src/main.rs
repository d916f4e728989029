use std::fs;
use std::io::Cursor;

use anyhow::Context;
use clap::Parser;
use wld_files::wld::reader::WldReader;

use crate::console::ConsoleSink;
use crate::settings::CliArgs;
use crate::summary::WorldSummary;

mod console;
mod settings;
mod summary;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let bytes = fs::read(&args.world).with_context(|| format!("failed to read {}", args.world))?;
    log::info!("{} ({} bytes)", args.world, bytes.len());

    let mut sink = ConsoleSink::default();
    let world = WldReader::parse_asset_with_sink(&mut Cursor::new(bytes), &mut sink)
        .with_context(|| format!("failed to parse {}", args.world))?;
    if sink.warnings > 0 {
        log::warn!("{} recoverable problem(s) while parsing", sink.warnings);
    }

    let summary = WorldSummary::of(&world);
    summary.print(&world, &args);
    Ok(())
}
