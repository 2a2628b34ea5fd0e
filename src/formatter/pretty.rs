use crate::config;
use crate::report::ComplianceReport;

use comfy_table::{presets::NOTHING, Attribute, Cell, CellAlignment, Color, Table};
use std::fmt::Display;

pub struct Pretty {
    config: config::Config,
    report: ComplianceReport,
}

impl Pretty {
    pub fn new(config: config::Config, report: ComplianceReport) -> Self {
        Self { config, report }
    }
}

impl Display for Pretty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = &self.report.report;
        writeln!(
            f,
            "{} {} - pass: {}, fail: {}",
            data.report_type.name,
            data.report_type.version,
            data.summary.pass_count,
            data.summary.fail_count
        )?;

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_header(
            ["ID", "Name", "Severity", "Pass", "Fail", "Status"]
                .iter()
                .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
                .collect::<Vec<Cell>>(),
        );

        data.control_checks
            .iter()
            .filter(|control| !self.config.failed_only || control.fail_total > 0)
            .for_each(|control| {
                let status = if control.fail_total > 0 {
                    Cell::new("✖").fg(Color::Red)
                } else if control.pass_total > 0 {
                    Cell::new("✔").fg(Color::AnsiValue(34))
                } else {
                    Cell::new("-")
                };
                table.add_row(vec![
                    Cell::new(&control.id),
                    Cell::new(&control.name),
                    Cell::new(control.severity.as_deref().unwrap_or("")),
                    Cell::new(control.pass_total).set_alignment(CellAlignment::Right),
                    Cell::new(control.fail_total).set_alignment(CellAlignment::Right),
                    status.set_alignment(CellAlignment::Center),
                ]);
            });

        table.fmt(f)
    }
}
