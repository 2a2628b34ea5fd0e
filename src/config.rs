use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub spec_files: Vec<PathBuf>,
    pub bundled_specs: bool,
    pub output: OutputFormat,
    pub dry_run: bool,
    pub failed_only: bool,
}
