use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hunter_core::{CollisionPolicy, Config};

/// Registry hunter rule tooling.
///
/// Compiles rule files into a hunting artifact, converts RECmd batch files
/// into rule files and checks RECmd coverage.
#[derive(Parser, Debug)]
#[command(name = "reg-hunter", version, about)]
pub struct CliArgs {
    /// Path to a TOML config file.
    #[arg(long, global = true, env = "HUNTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile rule files into an artifact.
    Compile(CompileArgs),
    /// Convert RECmd batch files into a rule file.
    Convert(ConvertArgs),
    /// Verify rule coverage.
    #[command(subcommand)]
    Verify(VerifyCommand),
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Rule files, loaded in the order given.
    #[arg(required = true)]
    pub rules: Vec<PathBuf>,

    /// Where to write the artifact (or the ZIP with --make-zip).
    #[arg(long)]
    pub output: PathBuf,

    /// Also write the rules-only metadata artifact to this path.
    #[arg(long)]
    pub meta: Option<PathBuf>,

    /// Package the artifact and a rule dump into a ZIP.
    #[arg(long, alias = "make_zip")]
    pub make_zip: bool,

    /// Also write the uncompressed JSON rule index to this path.
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Abort on the first rule file that fails to load.
    #[arg(long)]
    pub strict: bool,

    /// Artifact name override.
    #[arg(long)]
    pub name: Option<String>,

    /// keep-both or drop-later.
    #[arg(long)]
    pub collision_policy: Option<CollisionPolicy>,
}

impl CompileArgs {
    /// Apply flag overrides on top of file and environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(name) = &self.name {
            config.artifact_name = name.clone();
        }
        if let Some(policy) = self.collision_policy {
            config.collision_policy = policy;
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// RECmd batch files. They are processed in sorted order.
    #[arg(required = true)]
    pub batch: Vec<PathBuf>,

    /// Where to write the converted rules.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum VerifyCommand {
    /// Report RECmd rules with no matching hunter rule.
    Recmd(VerifyRecmdArgs),
}

#[derive(Args, Debug)]
pub struct VerifyRecmdArgs {
    /// Directory holding the RECmd .reb files.
    #[arg(long)]
    pub recmddir: PathBuf,

    /// Exception mapping file.
    #[arg(long)]
    pub mapping: PathBuf,

    /// Hunter rule files.
    #[arg(required = true)]
    pub rules: Vec<PathBuf>,
}
