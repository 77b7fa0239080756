//! Named objects the site model is expected to contain
//!
//! Every node name the viewer cares about maps to exactly one [`Slot`]. The
//! mapping is a single table so that missing or duplicated names can be
//! detected mechanically during assembly.

use std::fmt;

/// A named object in the site model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Starlink,
    Wap,
    StarlinkRouter,
    StarlinkAdapter,
    Switch,
    ContainerGreen,
    LineAdapterStarlink,
    LineAdapterRouter,
    LineAdapterSwitch,
    LineWapSwitch,
    Loop,
    LoopPipeHot,
    LoopPipeCold,
    CampusLoop,
    Antminer,
    Sensor,
    HeatExchanger,
}

/// Node name -> slot, in the order the variants are declared
const SLOT_TABLE: [(&str, Slot); Slot::COUNT] = [
    ("Starlink", Slot::Starlink),
    ("WAP", Slot::Wap),
    ("Starlink_Router", Slot::StarlinkRouter),
    ("Starlink_Adapter", Slot::StarlinkAdapter),
    ("Switch", Slot::Switch),
    ("Container_Green", Slot::ContainerGreen),
    ("Line_Adapter-Starlink", Slot::LineAdapterStarlink),
    ("Line_Adapter-Router", Slot::LineAdapterRouter),
    ("Line_Adapter-Switch", Slot::LineAdapterSwitch),
    ("Line_WAP_Switch", Slot::LineWapSwitch),
    ("Loop", Slot::Loop),
    ("Loop_Pipe_Hot", Slot::LoopPipeHot),
    ("Loop_Pipe_Cold", Slot::LoopPipeCold),
    ("Campus_Loop", Slot::CampusLoop),
    ("Antminer", Slot::Antminer),
    ("Sensor", Slot::Sensor),
    ("Heat_Exchanger", Slot::HeatExchanger),
];

impl Slot {
    pub const COUNT: usize = 17;

    /// Look up the slot for a scene node name (exact, case-sensitive)
    pub fn from_name(name: &str) -> Option<Slot> {
        SLOT_TABLE
            .iter()
            .find(|(slot_name, _)| *slot_name == name)
            .map(|(_, slot)| *slot)
    }

    /// Node name as authored in the model
    pub fn name(self) -> &'static str {
        SLOT_TABLE[self.index()].0
    }

    /// Dense index, usable for fixed-size slot storage
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        SLOT_TABLE.iter().map(|(_, slot)| *slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
