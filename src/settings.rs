use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wldview")]
#[command(version)]
#[command(about = "A Serious Engine 1 world (WLD) inspector")]
pub struct CliArgs {
    /// Path of the .wld file to inspect.
    pub world: String,

    /// Print a per-brush breakdown of the geometry.
    #[arg(long, env = "WLDVIEW_BRUSHES")]
    pub brushes: bool,

    /// List every dictionary filename, not only the logged preview.
    #[arg(long, env = "WLDVIEW_DICTIONARY")]
    pub dictionary: bool,
}
