use glam::IVec2;

/// What a [`StaticSprite`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Cosmetic edge marker showing where the collection-phase soft boundary sits.
    Boundary,
    /// Left behind by a killed pursuer. Blocks movement and can turn into a respawn.
    Grave,
    /// Opens on the start cell once every pursuer is gone.
    Portal,
}

impl MarkerKind {
    pub fn blocks_movement(self) -> bool {
        matches!(self, MarkerKind::Grave)
    }

    pub fn sheet(self) -> &'static str {
        match self {
            MarkerKind::Boundary => "markers/boundary",
            MarkerKind::Grave => "markers/grave",
            MarkerKind::Portal => "markers/portal",
        }
    }
}

/// A sprite pinned to a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSprite {
    pub kind: MarkerKind,
    pub cell: IVec2,
}

impl StaticSprite {
    pub fn new(kind: MarkerKind, cell: IVec2) -> Self {
        Self { kind, cell }
    }
}

/// Index of the first movement-blocking marker on `cell`.
pub fn blocking_marker_at(markers: &[StaticSprite], cell: IVec2) -> Option<usize> {
    markers.iter().position(|m| m.cell == cell && m.kind.blocks_movement())
}
