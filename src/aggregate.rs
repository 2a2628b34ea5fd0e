use tracing::debug;

use crate::index::SpecIndex;
use crate::types::{CheckResults, ComplianceSummary, ControlCheckSummary};

/// Rolls normalized check results up into one summary per control, in
/// declaration order.
///
/// A check without any observed result contributes nothing, so a control
/// whose checks were never observed reports zero passes and zero failures.
pub fn aggregate(index: &SpecIndex, results: &CheckResults) -> Vec<ControlCheckSummary> {
    index
        .control_ids()
        .filter_map(|id| index.control_by_id(id))
        .map(|control| {
            let mut summary = ControlCheckSummary {
                id: control.id.clone(),
                name: control.name.clone(),
                description: control.description.clone(),
                severity: control.severity.clone(),
                pass_total: 0,
                fail_total: 0,
            };
            for resource_kind in index.resources_for_control(&control.id) {
                for check in index.checks_for_control(&control.id) {
                    let tool = control.mapping.tool.as_str();
                    let result = match results.get(tool, resource_kind, &check.id) {
                        Some(result) => result,
                        None => {
                            debug!(control = %control.id, check = %check.id, resource_kind, "no results");
                            continue;
                        }
                    };
                    for detail in result.details.iter() {
                        if detail.status.is_passing() {
                            summary.pass_total += 1;
                        } else {
                            summary.fail_total += 1;
                        }
                    }
                }
            }
            summary
        })
        .collect()
}

pub fn summarize(controls: &[ControlCheckSummary]) -> ComplianceSummary {
    controls
        .iter()
        .fold(ComplianceSummary::default(), |acc, control| ComplianceSummary {
            pass_count: acc.pass_count + control.pass_total,
            fail_count: acc.fail_count + control.fail_total,
        })
}
