//! Cross-reference tables built from a [`Spec`], once per aggregation run.

use std::collections::{BTreeSet, HashMap};

use crate::spec::{CheckRef, Control, Spec};

#[derive(Clone, Debug, Default)]
pub struct SpecIndex {
    tool_resources: BTreeSet<(String, String)>,
    control_order: Vec<String>,
    controls: HashMap<String, Control>,
    control_checks: HashMap<String, Vec<CheckRef>>,
}

impl SpecIndex {
    pub fn new(spec: &Spec) -> Self {
        let mut index = SpecIndex::default();
        for control in spec.controls.iter() {
            for resource in control.resources.iter() {
                index
                    .tool_resources
                    .insert((control.mapping.tool.clone(), resource.clone()));
            }
            index
                .control_checks
                .entry(control.id.clone())
                .or_insert_with(Vec::new)
                .extend(control.mapping.checks.iter().cloned());
            // Duplicate IDs: the last declaration wins the lookup, the first keeps its position.
            if index
                .controls
                .insert(control.id.clone(), control.clone())
                .is_none()
            {
                index.control_order.push(control.id.clone());
            }
        }
        index
    }

    /// Every distinct `(tool, resource kind)` pair to query.
    pub fn tool_resource_keys(&self) -> &BTreeSet<(String, String)> {
        &self.tool_resources
    }

    pub fn tools(&self) -> BTreeSet<&str> {
        self.tool_resources
            .iter()
            .map(|(tool, _)| tool.as_str())
            .chain(self.controls.values().map(|c| c.mapping.tool.as_str()))
            .collect()
    }

    pub fn checks_for_control(&self, control_id: &str) -> &[CheckRef] {
        self.control_checks
            .get(control_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn control_by_id(&self, control_id: &str) -> Option<&Control> {
        self.controls.get(control_id)
    }

    /// Control IDs in declaration order.
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.control_order.iter().map(String::as_str)
    }

    /// Resource kinds of a control, deduplicated, in declaration order.
    pub fn resources_for_control(&self, control_id: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.control_by_id(control_id)
            .map(|control| {
                control
                    .resources
                    .iter()
                    .map(String::as_str)
                    .filter(|r| seen.insert(*r))
                    .collect()
            })
            .unwrap_or_default()
    }
}
