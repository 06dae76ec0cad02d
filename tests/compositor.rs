use webframe::compositor::{
    EmbeddedSurface, OverlayPanel, PanelKind, RegionCompositor, SurfaceRegion,
};
use webframe::geometry::Rect;

#[derive(Default)]
struct RecordingSurface {
    applied: Vec<SurfaceRegion>,
    calls: usize,
    fail: bool,
}

impl EmbeddedSurface for RecordingSurface {
    fn set_region(&mut self, region: &SurfaceRegion) -> anyhow::Result<()> {
        self.calls += 1;
        if self.fail {
            anyhow::bail!("region rejected");
        }
        self.applied.push(region.clone());
        Ok(())
    }
}

const HOST: Rect = Rect::new(0, 0, 800, 600);
const SURFACE: Rect = Rect::new(0, 0, 800, 600);

fn panel(kind: PanelKind, bounds: Rect, visible: bool) -> OverlayPanel {
    OverlayPanel {
        kind,
        bounds,
        visible,
    }
}

fn settings_at(bounds: Rect) -> [OverlayPanel; 2] {
    [
        panel(PanelKind::Settings, bounds, true),
        OverlayPanel::hidden(PanelKind::Screenshot),
    ]
}

fn hidden() -> [OverlayPanel; 2] {
    [
        OverlayPanel::hidden(PanelKind::Settings),
        OverlayPanel::hidden(PanelKind::Screenshot),
    ]
}

#[test]
fn no_panels_means_no_clipping() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    for _ in 0..10 {
        comp.notify_frame(HOST, SURFACE, &hidden());
    }
    assert_eq!(comp.surface().calls, 0);
    assert_eq!(comp.applied_region(), &SurfaceRegion::Full);
    assert!(!comp.is_dirty());
}

#[test]
fn panel_is_punched_out_once() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    let panels = settings_at(Rect::new(100, 100, 400, 300));
    for _ in 0..20 {
        comp.notify_frame(HOST, SURFACE, &panels);
    }
    assert_eq!(comp.surface().calls, 1);

    let SurfaceRegion::Clipped(clip) = comp.applied_region() else {
        panic!("expected clipped region");
    };
    let region = clip.to_region();
    assert!(!region.contains(200, 200));
    assert!(region.contains(50, 50));
    assert!(region.contains(400, 300));
    assert_eq!(region.area(), 800 * 600 - 300 * 200);
}

#[test]
fn hiding_every_panel_restores_full_surface() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.notify_frame(HOST, SURFACE, &settings_at(Rect::new(100, 100, 400, 300)));
    comp.notify_frame(HOST, SURFACE, &hidden());
    comp.notify_frame(HOST, SURFACE, &hidden());

    let surface = comp.surface();
    assert_eq!(surface.calls, 2);
    assert_eq!(surface.applied.last(), Some(&SurfaceRegion::Full));
}

#[test]
fn moving_a_panel_reapplies() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.notify_frame(HOST, SURFACE, &settings_at(Rect::new(100, 100, 400, 300)));
    comp.notify_frame(HOST, SURFACE, &settings_at(Rect::new(120, 100, 420, 300)));
    assert_eq!(comp.surface().calls, 2);
}

#[test]
fn hidden_panel_bounds_do_not_matter() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    let mut panels = hidden();
    comp.notify_frame(HOST, SURFACE, &panels);
    panels[1].bounds = Rect::new(10, 10, 50, 50);
    comp.notify_frame(HOST, SURFACE, &panels);
    assert_eq!(comp.surface().calls, 0);
    assert!(!comp.is_dirty());
}

#[test]
fn panels_are_shifted_into_surface_coordinates() {
    let surface = Rect::new(0, 0, 800, 572);
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.notify_frame(HOST, surface, &settings_at(Rect::new(300, 33, 800, 600)));

    let SurfaceRegion::Clipped(clip) = comp.applied_region() else {
        panic!("expected clipped region");
    };
    assert_eq!(clip.bounds, surface);
    assert_eq!(clip.holes, vec![Rect::new(300, 5, 800, 572)]);
}

#[test]
fn panel_outside_surface_leaves_it_whole() {
    let surface = Rect::new(0, 0, 800, 572);
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.notify_frame(HOST, surface, &settings_at(Rect::new(0, 0, 100, 20)));
    assert_eq!(comp.applied_region(), &SurfaceRegion::Full);
    assert_eq!(comp.surface().calls, 0);
}

#[test]
fn failed_apply_keeps_previous_region_until_inputs_change() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.notify_frame(HOST, SURFACE, &settings_at(Rect::new(100, 100, 400, 300)));
    let before = comp.applied_region().clone();

    comp.surface_mut().fail = true;
    let moved = settings_at(Rect::new(200, 100, 500, 300));
    for _ in 0..5 {
        comp.notify_frame(HOST, SURFACE, &moved);
    }
    assert_eq!(comp.surface().calls, 2);
    assert_eq!(comp.applied_region(), &before);
    assert!(comp.is_dirty());

    comp.surface_mut().fail = false;
    let moved_again = settings_at(Rect::new(210, 100, 510, 300));
    comp.notify_frame(HOST, SURFACE, &moved_again);
    assert_eq!(comp.surface().calls, 3);
    assert!(!comp.is_dirty());
    assert_ne!(comp.applied_region(), &before);
}

#[test]
fn shutdown_unclips_surface() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    comp.shutdown();
    assert_eq!(comp.surface().calls, 0);

    comp.notify_frame(HOST, SURFACE, &settings_at(Rect::new(100, 100, 400, 300)));
    comp.shutdown();
    let surface = comp.into_surface();
    assert_eq!(surface.calls, 2);
    assert_eq!(surface.applied.last(), Some(&SurfaceRegion::Full));
}

#[test]
fn both_panels_punch_separate_holes() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    let settings = Rect::new(500, 0, 800, 600);
    let screenshot = Rect::new(100, 50, 400, 300);
    let panels = [
        panel(PanelKind::Settings, settings, true),
        panel(PanelKind::Screenshot, screenshot, true),
    ];
    for _ in 0..3 {
        comp.notify_frame(HOST, SURFACE, &panels);
    }
    assert_eq!(comp.surface().calls, 1);

    let SurfaceRegion::Clipped(clip) = comp.applied_region() else {
        panic!("expected clipped region");
    };
    assert_eq!(clip.holes.len(), 2);
    let region = clip.to_region();
    assert!(!region.contains(650, 300));
    assert!(!region.contains(200, 200));
    assert!(region.contains(450, 200));
    assert!(region.contains(50, 500));
    assert!(region.contains(200, 400));
    assert_eq!(
        region.area(),
        800 * 600 - settings.width() as i64 * settings.height() as i64
            - screenshot.width() as i64 * screenshot.height() as i64
    );
}

#[test]
fn resizing_surface_reapplies_once() {
    let mut comp = RegionCompositor::new(RecordingSurface::default());
    let panels = settings_at(Rect::new(100, 100, 400, 300));
    comp.notify_frame(HOST, SURFACE, &panels);
    assert_eq!(comp.surface().calls, 1);

    let resized = Rect::new(0, 0, 1024, 600);
    for _ in 0..5 {
        comp.notify_frame(HOST, resized, &panels);
    }
    assert_eq!(comp.surface().calls, 2);

    let SurfaceRegion::Clipped(clip) = comp.applied_region() else {
        panic!("expected clipped region");
    };
    assert_eq!(clip.bounds, resized);
    assert!(clip.to_region().contains(900, 200));
}
