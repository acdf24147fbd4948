// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "railview")]
#[command(about = "Scripted train-journey scene renderer", long_about = None)]
pub struct Cli {
    /// Root directory holding the models and skybox textures
    #[arg(long = "assets", default_value = "resources")]
    pub assets: PathBuf,
}
