use crate::geometry::{Rect, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Settings,
    Screenshot,
}

/// A floating panel drawn above the embedded surface.
///
/// Bounds are in host client pixels and are refreshed by the panel's own
/// layout every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPanel {
    pub kind: PanelKind,
    pub bounds: Rect,
    pub visible: bool,
}

impl OverlayPanel {
    pub fn hidden(kind: PanelKind) -> Self {
        Self {
            kind,
            bounds: Rect::default(),
            visible: false,
        }
    }
}

/// Visible area requested for the embedded surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceRegion {
    /// No clipping at all.
    #[default]
    Full,
    Clipped(ClipRegion),
}

/// Surface rectangle with panel rectangles punched out of it, all in
/// surface-local pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRegion {
    pub bounds: Rect,
    pub holes: Vec<Rect>,
}

impl ClipRegion {
    pub fn to_region(&self) -> Region {
        let mut region = Region::from_rect(self.bounds);
        for hole in &self.holes {
            region.subtract(hole);
        }
        region
    }
}

/// The embedded browser surface, as far as region clipping is concerned.
pub trait EmbeddedSurface {
    fn set_region(&mut self, region: &SurfaceRegion) -> anyhow::Result<()>;
}

/// What one frame reported; compared against the last applied frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInputs {
    pub host_bounds: Rect,
    pub surface_bounds: Rect,
    pub visible_panels: Vec<(PanelKind, Rect)>,
}

impl FrameInputs {
    pub fn capture(host_bounds: Rect, surface_bounds: Rect, panels: &[OverlayPanel]) -> Self {
        Self {
            host_bounds,
            surface_bounds,
            visible_panels: panels
                .iter()
                .filter(|p| p.visible)
                .map(|p| (p.kind, p.bounds))
                .collect(),
        }
    }

    /// Vertical inset of the surface below the host's toolbar.
    pub fn vertical_offset(&self) -> i32 {
        self.host_bounds.bottom - self.surface_bounds.bottom
    }

    pub fn target_region(&self) -> SurfaceRegion {
        let offset = self.vertical_offset();
        let holes: Vec<Rect> = self
            .visible_panels
            .iter()
            .map(|(_, bounds)| bounds.translate(0, -offset))
            .filter(|hole| hole.intersect(&self.surface_bounds).is_some())
            .collect();

        if holes.is_empty() {
            SurfaceRegion::Full
        } else {
            SurfaceRegion::Clipped(ClipRegion {
                bounds: self.surface_bounds,
                holes,
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct CompositionState {
    pub applied: SurfaceRegion,
    pub baseline: Option<FrameInputs>,
    pub dirty: bool,
    failed: Option<FrameInputs>,
}

impl CompositionState {
    fn mark_clean(&mut self, inputs: FrameInputs) {
        self.baseline = Some(inputs);
        self.failed = None;
        self.dirty = false;
    }
}

/// Keeps the surface's visible region equal to its bounds minus every
/// visible overlay panel, touching the OS only when the inputs change.
pub struct RegionCompositor<S: EmbeddedSurface> {
    surface: S,
    state: CompositionState,
}

impl<S: EmbeddedSurface> RegionCompositor<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: CompositionState::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn applied_region(&self) -> &SurfaceRegion {
        &self.state.applied
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    /// Call once per frame with the current layout.
    pub fn notify_frame(&mut self, host_bounds: Rect, surface_bounds: Rect, panels: &[OverlayPanel]) {
        let inputs = FrameInputs::capture(host_bounds, surface_bounds, panels);
        if self.state.baseline.as_ref() != Some(&inputs) {
            self.state.dirty = true;
        }
        if !self.state.dirty {
            return;
        }
        // Same inputs already failed once; wait for something to move.
        if self.state.failed.as_ref() == Some(&inputs) {
            return;
        }

        let target = inputs.target_region();
        if target == self.state.applied {
            self.state.mark_clean(inputs);
            return;
        }

        match self.surface.set_region(&target) {
            Ok(()) => {
                tracing::debug!(
                    holes = match &target {
                        SurfaceRegion::Full => 0,
                        SurfaceRegion::Clipped(clip) => clip.holes.len(),
                    },
                    "surface region applied"
                );
                self.state.applied = target;
                self.state.mark_clean(inputs);
            }
            Err(err) => {
                tracing::warn!(?err, "failed to apply surface region; keeping previous");
                self.state.failed = Some(inputs);
            }
        }
    }

    /// Put the surface back to its unclipped region.
    pub fn shutdown(&mut self) {
        if self.state.applied == SurfaceRegion::Full {
            return;
        }
        match self.surface.set_region(&SurfaceRegion::Full) {
            Ok(()) => {
                self.state.applied = SurfaceRegion::Full;
                self.state.baseline = None;
                self.state.dirty = true;
            }
            Err(err) => tracing::warn!(?err, "failed to restore surface region"),
        }
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
