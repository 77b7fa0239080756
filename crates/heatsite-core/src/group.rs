//! Semantic groups: logical subsystems of the installation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::slot::Slot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown group '{0}'")]
pub struct UnknownGroupError(pub String);

/// Identifier of a semantic group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    Starlink,
    Wap,
    Sensor,
    Loop,
    Campus,
    Miner,
    Hx,
}

impl GroupId {
    /// All groups in control-panel order
    pub const ALL: [GroupId; 7] = [
        GroupId::Starlink,
        GroupId::Wap,
        GroupId::Sensor,
        GroupId::Loop,
        GroupId::Campus,
        GroupId::Miner,
        GroupId::Hx,
    ];

    /// Stable identifier used in profiles and as the UI label id
    pub fn id(self) -> &'static str {
        match self {
            GroupId::Starlink => "starlink",
            GroupId::Wap => "wap",
            GroupId::Sensor => "sensor",
            GroupId::Loop => "loop",
            GroupId::Campus => "campus",
            GroupId::Miner => "miner",
            GroupId::Hx => "hx",
        }
    }

    pub fn from_id(id: &str) -> Option<GroupId> {
        GroupId::ALL.into_iter().find(|g| g.id() == id)
    }

    /// Id of the UI label reflecting this group's highlight state
    pub fn label_id(self) -> &'static str {
        self.id()
    }

    /// Human-readable name for buttons and logs
    pub fn title(self) -> &'static str {
        match self {
            GroupId::Starlink => "Starlink",
            GroupId::Wap => "Wireless AP",
            GroupId::Sensor => "Sensor",
            GroupId::Loop => "Cooling Loop",
            GroupId::Campus => "Campus Loop",
            GroupId::Miner => "Miner",
            GroupId::Hx => "Heat Exchanger",
        }
    }

    /// Member slots, in the order they are appended to the group
    pub fn members(self) -> &'static [Slot] {
        match self {
            GroupId::Starlink => &[
                Slot::Starlink,
                Slot::StarlinkRouter,
                Slot::StarlinkAdapter,
                Slot::LineAdapterRouter,
                Slot::LineAdapterSwitch,
                Slot::LineAdapterStarlink,
            ],
            GroupId::Wap => &[Slot::Wap, Slot::LineWapSwitch],
            GroupId::Sensor => &[Slot::Sensor],
            GroupId::Loop => &[Slot::Loop, Slot::LoopPipeHot, Slot::LoopPipeCold],
            GroupId::Campus => &[Slot::CampusLoop],
            GroupId::Miner => &[Slot::Antminer],
            GroupId::Hx => &[Slot::HeatExchanger],
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GroupId {
    type Err = UnknownGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupId::from_id(s).ok_or_else(|| UnknownGroupError(s.to_string()))
    }
}

/// An assembled group: references to scene nodes, owned by the scene graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticGroup<N> {
    id: GroupId,
    members: Vec<(Slot, N)>,
}

impl<N: Copy> SemanticGroup<N> {
    pub(crate) fn new(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::with_capacity(id.members().len()),
        }
    }

    pub(crate) fn push(&mut self, slot: Slot, node: N) {
        self.members.push((slot, node));
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn members(&self) -> &[(Slot, N)] {
        &self.members
    }

    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.members.iter().map(|(_, node)| *node)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ids_parse() {
        for group in GroupId::ALL {
            assert_eq!(group.id().parse::<GroupId>(), Ok(group));
        }
        assert_eq!(
            "pool".parse::<GroupId>(),
            Err(UnknownGroupError("pool".to_string()))
        );
    }

    #[test]
    fn test_member_counts() {
        assert_eq!(GroupId::Starlink.members().len(), 6);
        assert_eq!(GroupId::Wap.members().len(), 2);
        assert_eq!(GroupId::Loop.members().len(), 3);
        assert_eq!(GroupId::Sensor.members().len(), 1);
    }

    #[test]
    fn test_no_slot_in_two_groups() {
        let mut seen = std::collections::HashSet::new();
        for group in GroupId::ALL {
            for slot in group.members() {
                assert!(seen.insert(*slot), "{} appears in more than one group", slot);
            }
        }
        // Switch and the enclosure are bound but not grouped
        assert!(!seen.contains(&Slot::Switch));
        assert!(!seen.contains(&Slot::ContainerGreen));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&GroupId::Hx).unwrap();
        assert_eq!(json, "\"hx\"");
        let group: GroupId = serde_json::from_str("\"loop\"").unwrap();
        assert_eq!(group, GroupId::Loop);
    }
}
