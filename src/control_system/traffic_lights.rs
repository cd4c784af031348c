use crate::junction_engine::lanes::LaneId;
use serde::{Deserialize, Serialize};

/// One of the four physical signal fixtures. Each is shared by a lane and
/// its opposite-flow partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightGroup {
    Top,
    Bottom,
    Left,
    Right,
}

impl LightGroup {
    pub const ALL: [LightGroup; 4] = [
        LightGroup::Top,
        LightGroup::Bottom,
        LightGroup::Left,
        LightGroup::Right,
    ];

    pub fn for_lane(lane: LaneId) -> LightGroup {
        match lane {
            LaneId::XTop | LaneId::XTopOpposite => LightGroup::Top,
            LaneId::XBottom | LaneId::XBottomOpposite => LightGroup::Bottom,
            LaneId::YLeft | LaneId::YLeftOpposite => LightGroup::Left,
            LaneId::YRight | LaneId::YRightOpposite => LightGroup::Right,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What a light group is showing. `Off` means no bulb is lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Red,
    Yellow,
    Green,
    Off,
}

impl Signal {
    /// Bulb named `name`, if there is one.
    pub fn from_name(name: &str) -> Option<Signal> {
        match name.trim() {
            "red" => Some(Signal::Red),
            "yellow" => Some(Signal::Yellow),
            "green" => Some(Signal::Green),
            _ => None,
        }
    }
}

/// Current bulb state of every light group.
///
/// Every command replaces the whole group: all bulbs go dark and at most the
/// requested one is lit, so a group never shows two colors at once.
#[derive(Debug, Clone)]
pub struct LightController {
    groups: [Signal; 4],
}

impl Default for LightController {
    fn default() -> Self {
        Self::new()
    }
}

impl LightController {
    /// All groups start dark.
    pub fn new() -> Self {
        Self {
            groups: [Signal::Off; 4],
        }
    }

    pub fn signal(&self, group: LightGroup) -> Signal {
        self.groups[group.index()]
    }

    pub fn signal_for_lane(&self, lane: LaneId) -> Signal {
        self.signal(LightGroup::for_lane(lane))
    }

    /// Switches the group controlling `lane` to `signal` and returns it.
    pub fn set_color(&mut self, lane: LaneId, signal: Signal) -> LightGroup {
        let group = LightGroup::for_lane(lane);
        self.groups[group.index()] = signal;
        group
    }

    /// Named-bulb form of `set_color`. A name with no matching bulb leaves
    /// the group dark.
    pub fn set_color_named(&mut self, lane: LaneId, color: &str) -> (LightGroup, Signal) {
        let signal = Signal::from_name(color).unwrap_or_else(|| {
            log::debug!("No {:?} bulb on light for lane {}; group left dark", color, lane);
            Signal::Off
        });
        (self.set_color(lane, signal), signal)
    }

    pub fn clear_all(&mut self) {
        self.groups = [Signal::Off; 4];
    }

    pub fn set_all_red(&mut self) {
        self.groups = [Signal::Red; 4];
    }

    pub fn snapshot(&self) -> Vec<(LightGroup, Signal)> {
        LightGroup::ALL
            .iter()
            .map(|group| (*group, self.signal(*group)))
            .collect()
    }
}
