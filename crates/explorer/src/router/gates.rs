use std::fmt;

use crate::view_state::ViewState;

/// One-way readiness latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Widgets and listeners wired.
    Ui,
    /// Item store populated.
    Data,
    /// Search index built.
    Search,
    /// Map camera available.
    Map,
}

impl Gate {
    pub const ALL: [Gate; 4] = [Gate::Ui, Gate::Data, Gate::Search, Gate::Map];

    fn bit(self) -> u8 {
        match self {
            Gate::Ui => 1,
            Gate::Data => 1 << 1,
            Gate::Search => 1 << 2,
            Gate::Map => 1 << 3,
        }
    }
}

/// A combination of gates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GateSet(u8);

impl GateSet {
    pub const NONE: GateSet = GateSet(0);

    pub fn of(gates: &[Gate]) -> Self {
        GateSet(gates.iter().fold(0, |acc, g| acc | g.bit()))
    }

    /// Gates a pending state needs before it can be applied. The map only
    /// matters when the state carries a camera.
    pub fn required_for(state: &ViewState) -> Self {
        if state.camera.is_some() {
            GateSet::of(&Gate::ALL)
        } else {
            GateSet::of(&[Gate::Ui, Gate::Data, Gate::Search])
        }
    }

    pub fn contains(self, gate: Gate) -> bool {
        self.0 & gate.bit() != 0
    }

    pub fn covers(self, other: GateSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn missing(self, required: GateSet) -> GateSet {
        GateSet(required.0 & !self.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Latches `gate`. Returns `false` if it was already open.
    pub fn open(&mut self, gate: Gate) -> bool {
        let was = self.contains(gate);
        self.0 |= gate.bit();
        !was
    }

    pub fn iter(self) -> impl Iterator<Item = Gate> {
        Gate::ALL.into_iter().filter(move |g| self.contains(*g))
    }
}

impl fmt::Debug for GateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Gate, GateSet};
    use crate::view_state::{Camera, ViewState};

    #[test]
    fn gates_latch_once() {
        let mut g = GateSet::NONE;
        assert!(g.open(Gate::Data));
        assert!(!g.open(Gate::Data));
        assert!(g.contains(Gate::Data));
        assert!(!g.contains(Gate::Map));
    }

    #[test]
    fn map_is_required_only_with_a_camera() {
        let plain = ViewState::default();
        assert!(!GateSet::required_for(&plain).contains(Gate::Map));

        let with_camera = ViewState {
            camera: Some(Camera::new(1.0, 2.0, 3.0)),
            ..ViewState::default()
        };
        let required = GateSet::required_for(&with_camera);
        let open = GateSet::of(&[Gate::Ui, Gate::Data, Gate::Search]);
        assert!(!open.covers(required));
        assert_eq!(open.missing(required), GateSet::of(&[Gate::Map]));
    }
}
