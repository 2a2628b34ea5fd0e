use std::fmt::Display;

use crate::config;
use crate::report::ComplianceReport;

mod json;
mod pretty;

pub enum Formatter {
    Pretty(pretty::Pretty),
    Json(json::Json),
}

impl Formatter {
    pub fn new(config: config::Config, report: ComplianceReport) -> Self {
        match config.output {
            config::OutputFormat::Json => Formatter::Json(json::Json::new(config, report)),
            config::OutputFormat::Pretty => Formatter::Pretty(pretty::Pretty::new(config, report)),
        }
    }
}

impl Display for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formatter::Pretty(p) => p.fmt(f),
            Formatter::Json(j) => j.fmt(f),
        }
    }
}
