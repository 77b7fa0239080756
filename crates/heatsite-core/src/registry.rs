//! Scene registry - binds scene nodes to slots and assembles semantic groups
//!
//! Assembly is a pure transformation over a traversal of `(node, name)` pairs.
//! The caller is responsible for walking the loaded scene (once per node,
//! parents before children); this module never touches an engine.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::group::{GroupId, SemanticGroup};
use crate::slot::Slot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Scene assembly incomplete: {}", .problems.join("; "))]
    Incomplete { problems: Vec<String> },
}

/// Result of offering one node to [`SlotBindings::bind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The node filled an empty slot
    Bound(Slot),
    /// The slot was already bound; the earlier node is kept
    Duplicate(Slot),
    /// The name is not one the viewer knows about
    Ignored,
}

/// Slot -> node storage filled during traversal
#[derive(Debug, Clone)]
pub struct SlotBindings<N> {
    nodes: [Option<N>; Slot::COUNT],
}

impl<N: Copy> Default for SlotBindings<N> {
    fn default() -> Self {
        Self {
            nodes: [None; Slot::COUNT],
        }
    }
}

impl<N: Copy> SlotBindings<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: &str, node: N) -> BindOutcome {
        let Some(slot) = Slot::from_name(name) else {
            return BindOutcome::Ignored;
        };
        let entry = &mut self.nodes[slot.index()];
        if entry.is_some() {
            BindOutcome::Duplicate(slot)
        } else {
            *entry = Some(node);
            BindOutcome::Bound(slot)
        }
    }

    pub fn get(&self, slot: Slot) -> Option<N> {
        self.nodes[slot.index()]
    }

    pub fn is_bound(&self, slot: Slot) -> bool {
        self.nodes[slot.index()].is_some()
    }

    pub fn unbound(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::all().filter(|slot| !self.is_bound(*slot))
    }
}

/// Diagnostics collected while assembling the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Groups that could not be built, with the names they are missing
    pub missing: BTreeMap<GroupId, Vec<Slot>>,
    /// Slots whose name appeared more than once (first node kept)
    pub duplicates: Vec<Slot>,
    /// Designated enclosure not present in the model
    pub missing_enclosure: Option<Slot>,
    /// Nodes visited in total
    pub visited: usize,
    /// Nodes whose names matched no slot
    pub ignored: usize,
}

impl AssemblyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.missing_enclosure.is_none()
    }

    /// One line per problem that disables a control or the enclosure
    pub fn problems(&self) -> Vec<String> {
        let mut problems: Vec<String> = self
            .missing
            .iter()
            .map(|(group, slots)| {
                let names: Vec<&str> = slots.iter().map(|s| s.name()).collect();
                format!("group '{}' missing {}", group, names.join(", "))
            })
            .collect();
        if let Some(enclosure) = self.missing_enclosure {
            problems.push(format!("enclosure '{}' not found", enclosure));
        }
        problems
    }

    pub fn check(&self) -> Result<(), AssemblyError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(AssemblyError::Incomplete {
                problems: self.problems(),
            })
        }
    }
}

/// Fixed mapping from known names to nodes, plus the groups built from it
#[derive(Debug, Clone)]
pub struct SceneRegistry<N> {
    bindings: SlotBindings<N>,
    groups: BTreeMap<GroupId, SemanticGroup<N>>,
    enclosure: Option<N>,
    report: AssemblyReport,
}

impl<N: Copy> SceneRegistry<N> {
    /// Bind every node of a traversal, then build each group in member order.
    ///
    /// Groups with an unbound member are left out and recorded in the report;
    /// the rest of the registry stays usable.
    pub fn assemble<I, S>(nodes: I, enclosure: Option<Slot>) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        S: AsRef<str>,
    {
        let mut bindings = SlotBindings::new();
        let mut report = AssemblyReport::default();

        for (node, name) in nodes {
            report.visited += 1;
            match bindings.bind(name.as_ref(), node) {
                BindOutcome::Bound(slot) => {
                    tracing::trace!("Bound slot {}", slot);
                }
                BindOutcome::Duplicate(slot) => {
                    tracing::warn!("Duplicate node name '{}', keeping the first", slot);
                    if !report.duplicates.contains(&slot) {
                        report.duplicates.push(slot);
                    }
                }
                BindOutcome::Ignored => report.ignored += 1,
            }
        }

        let mut groups = BTreeMap::new();
        for id in GroupId::ALL {
            let missing: Vec<Slot> = id
                .members()
                .iter()
                .copied()
                .filter(|slot| !bindings.is_bound(*slot))
                .collect();
            if !missing.is_empty() {
                report.missing.insert(id, missing);
                continue;
            }

            let mut group = SemanticGroup::new(id);
            for slot in id.members() {
                if let Some(node) = bindings.get(*slot) {
                    group.push(*slot, node);
                }
            }
            groups.insert(id, group);
        }

        let enclosure = enclosure.and_then(|slot| {
            let node = bindings.get(slot);
            if node.is_none() {
                report.missing_enclosure = Some(slot);
            }
            node
        });

        Self {
            bindings,
            groups,
            enclosure,
            report,
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&SemanticGroup<N>> {
        self.groups.get(&id)
    }

    /// Names a group is missing, if it could not be built
    pub fn missing_for(&self, id: GroupId) -> &[Slot] {
        self.report
            .missing
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = &SemanticGroup<N>> {
        self.groups.values()
    }

    pub fn node(&self, slot: Slot) -> Option<N> {
        self.bindings.get(slot)
    }

    pub fn enclosure(&self) -> Option<N> {
        self.enclosure
    }

    pub fn report(&self) -> &AssemblyReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Names of a complete site model, with some decorative nodes mixed in
    fn full_site() -> Vec<(u32, String)> {
        let mut nodes: Vec<(u32, String)> = vec![(0, "Scene".to_string())];
        for (i, slot) in Slot::all().enumerate() {
            nodes.push((i as u32 + 1, slot.name().to_string()));
        }
        nodes.push((100, "Cube.004".to_string()));
        nodes.push((101, "Ground".to_string()));
        nodes
    }

    fn without(mut nodes: Vec<(u32, String)>, name: &str) -> Vec<(u32, String)> {
        nodes.retain(|(_, n)| n != name);
        nodes
    }

    #[test]
    fn test_complete_assembly() {
        let registry = SceneRegistry::assemble(full_site(), Some(Slot::ContainerGreen));

        assert!(registry.report().is_complete());
        assert!(registry.report().check().is_ok());
        assert_eq!(registry.report().visited, Slot::COUNT + 3);
        assert_eq!(registry.report().ignored, 3);
        for id in GroupId::ALL {
            let group = registry.group(id).expect("group assembled");
            assert_eq!(group.len(), id.members().len());
        }
        assert_eq!(
            registry.enclosure(),
            Some(Slot::ContainerGreen.index() as u32 + 1)
        );
    }

    #[test]
    fn test_loop_group_order() {
        let registry = SceneRegistry::assemble(full_site(), None);
        let group = registry.group(GroupId::Loop).unwrap();
        let slots: Vec<Slot> = group.members().iter().map(|(s, _)| *s).collect();
        assert_eq!(slots, vec![Slot::Loop, Slot::LoopPipeHot, Slot::LoopPipeCold]);
        let nodes: Vec<u32> = group.nodes().collect();
        assert_eq!(
            nodes,
            vec![
                Slot::Loop.index() as u32 + 1,
                Slot::LoopPipeHot.index() as u32 + 1,
                Slot::LoopPipeCold.index() as u32 + 1,
            ]
        );
    }

    #[test]
    fn test_missing_member_reported_not_dropped() {
        let nodes = without(full_site(), "Loop_Pipe_Cold");
        let registry = SceneRegistry::assemble(nodes, Some(Slot::ContainerGreen));

        assert!(registry.group(GroupId::Loop).is_none());
        assert_eq!(registry.missing_for(GroupId::Loop), &[Slot::LoopPipeCold]);
        // Other groups are unaffected
        assert!(registry.group(GroupId::Starlink).is_some());

        let err = registry.report().check().unwrap_err();
        let AssemblyError::Incomplete { problems } = &err;
        assert_eq!(problems, &vec!["group 'loop' missing Loop_Pipe_Cold".to_string()]);
        assert!(err.to_string().contains("Loop_Pipe_Cold"));
    }

    #[test]
    fn test_missing_enclosure() {
        let nodes = without(full_site(), "Container_Green");
        let registry = SceneRegistry::assemble(nodes, Some(Slot::ContainerGreen));

        assert_eq!(registry.enclosure(), None);
        assert_eq!(registry.report().missing_enclosure, Some(Slot::ContainerGreen));
        assert!(registry.report().missing.is_empty());
        assert!(registry.report().check().is_err());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut nodes = full_site();
        nodes.push((200, "Sensor".to_string()));
        let registry = SceneRegistry::assemble(nodes, None);

        assert_eq!(registry.report().duplicates, vec![Slot::Sensor]);
        assert_eq!(registry.node(Slot::Sensor), Some(Slot::Sensor.index() as u32 + 1));
        // Duplicates alone do not make the assembly incomplete
        assert!(registry.report().is_complete());
    }

    #[test]
    fn test_empty_scene() {
        let registry = SceneRegistry::<u32>::assemble(Vec::<(u32, &str)>::new(), None);
        assert_eq!(registry.groups().count(), 0);
        assert_eq!(registry.report().missing.len(), GroupId::ALL.len());
    }

    #[test]
    fn test_bindings() {
        let mut bindings = SlotBindings::new();
        assert_eq!(bindings.bind("WAP", 7u32), BindOutcome::Bound(Slot::Wap));
        assert_eq!(bindings.bind("WAP", 8u32), BindOutcome::Duplicate(Slot::Wap));
        assert_eq!(bindings.bind("Camera", 9u32), BindOutcome::Ignored);
        assert_eq!(bindings.get(Slot::Wap), Some(7));
        assert_eq!(bindings.unbound().count(), Slot::COUNT - 1);
    }
}
