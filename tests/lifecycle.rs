//! Scene lifecycle tests driven by a counting fake backend.

use std::cell::Cell;
use std::rc::Rc;

use climate_globe::{
    Category, Dataset, FrameData, FrameOutcome, GpuError, Mount, PointerEvent, RenderSurface,
    SceneGraph, SceneOptions, StarfieldConfig, SurfaceFactory, Vec2, ViewMode, Viewport,
};

#[derive(Default)]
struct Counters {
    live: Cell<i32>,
    created: Cell<u32>,
    draws: Cell<u32>,
    resizes: Cell<u32>,
}

struct FakeSurface {
    counters: Rc<Counters>,
}

impl RenderSurface for FakeSurface {
    fn resize(&mut self, viewport: Viewport) {
        assert!(viewport.is_drawable(), "resized to {:?}", viewport);
        self.counters.resizes.set(self.counters.resizes.get() + 1);
    }

    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), wgpu::SurfaceError> {
        assert!(frame.scene.is_complete());
        self.counters.draws.set(self.counters.draws.get() + 1);
        Ok(())
    }
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.counters.live.set(self.counters.live.get() - 1);
    }
}

struct FakeFactory {
    counters: Rc<Counters>,
    fail: bool,
}

impl SurfaceFactory for FakeFactory {
    type Surface = FakeSurface;

    fn create_surface(&mut self, _viewport: Viewport, _scene: &SceneGraph) -> Result<FakeSurface, GpuError> {
        if self.fail {
            return Err(GpuError::NoAdapter);
        }
        self.counters.live.set(self.counters.live.get() + 1);
        self.counters.created.set(self.counters.created.get() + 1);
        Ok(FakeSurface {
            counters: self.counters.clone(),
        })
    }
}

fn mount(viewport: Viewport) -> (Mount<FakeFactory>, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let factory = FakeFactory {
        counters: counters.clone(),
        fail: false,
    };
    (Mount::new(factory, viewport), counters)
}

fn options(mode: ViewMode) -> SceneOptions {
    SceneOptions::new()
        .with_mode(mode)
        .with_starfield(StarfieldConfig::new().with_count(32))
}

#[test]
fn test_activate_twice_leaves_one_surface() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));

    mount.activate(options(ViewMode::Ambient), &data).unwrap();
    mount.activate(options(ViewMode::Interactive), &data).unwrap();

    assert_eq!(counters.created.get(), 2);
    assert_eq!(counters.live.get(), 1);
    assert_eq!(mount.handle().map(|h| h.mode()), Some(ViewMode::Interactive));
}

#[test]
fn test_frames_stop_after_deactivate() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Interactive), &data).unwrap();

    for _ in 0..5 {
        assert_eq!(mount.frame(), FrameOutcome::Drawn);
    }
    assert_eq!(counters.draws.get(), 5);

    assert!(mount.deactivate());
    assert_eq!(counters.live.get(), 0);

    // Frames forced after teardown do nothing.
    for _ in 0..20 {
        assert_eq!(mount.frame(), FrameOutcome::Idle);
    }
    assert_eq!(counters.draws.get(), 5);
}

#[test]
fn test_deactivate_is_idempotent() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Ambient), &data).unwrap();

    assert!(mount.deactivate());
    assert!(!mount.deactivate());
    assert!(!mount.deactivate());
    assert_eq!(counters.live.get(), 0);
    assert_eq!(mount.listener_count(), 0);
}

#[test]
fn test_dropping_the_mount_releases_the_surface() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Ambient), &data).unwrap();
    assert_eq!(counters.live.get(), 1);

    drop(mount);
    assert_eq!(counters.live.get(), 0);
}

#[test]
fn test_failed_surface_leaves_nothing_behind() {
    let data = Dataset::reference();
    let counters = Rc::new(Counters::default());
    let mut mount = Mount::new(
        FakeFactory {
            counters: counters.clone(),
            fail: true,
        },
        Viewport::new(800, 600),
    );

    let err = mount.activate(options(ViewMode::Interactive), &data).err();
    assert!(matches!(err, Some(GpuError::NoAdapter)));
    assert!(!mount.is_active());
    assert_eq!(mount.listener_count(), 0);
    assert_eq!(mount.frame(), FrameOutcome::Idle);
    assert_eq!(counters.live.get(), 0);
}

#[test]
fn test_failed_reactivation_still_tears_down_previous() {
    let data = Dataset::reference();
    let counters = Rc::new(Counters::default());
    let mut mount = Mount::new(
        FakeFactory {
            counters: counters.clone(),
            fail: false,
        },
        Viewport::new(800, 600),
    );
    mount.activate(options(ViewMode::Ambient), &data).unwrap();

    mount.resize(Viewport::new(0, 600));
    let err = mount.activate(options(ViewMode::Ambient), &data).err();
    assert!(matches!(err, Some(GpuError::EmptyViewport)));
    assert_eq!(counters.live.get(), 0);
    assert!(!mount.is_active());
}

#[test]
fn test_zero_sized_resize_is_ignored() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Ambient), &data).unwrap();

    assert!(!mount.resize(Viewport::new(0, 0)));
    assert!(!mount.resize(Viewport::new(1024, 0)));
    assert_eq!(counters.resizes.get(), 0);
    assert_eq!(mount.handle().unwrap().camera().aspect, 800.0 / 600.0);

    assert!(mount.resize(Viewport::new(1000, 500)));
    assert_eq!(counters.resizes.get(), 1);
    assert_eq!(mount.handle().unwrap().camera().aspect, 2.0);
}

#[test]
fn test_zero_sized_container_is_not_drawn() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Interactive), &data).unwrap();
    assert_eq!(mount.frame(), FrameOutcome::Drawn);
    let rotation = *mount.handle().unwrap().rotation();

    mount.resize(Viewport::new(0, 0));
    for _ in 0..3 {
        assert_eq!(mount.frame(), FrameOutcome::Idle);
    }
    assert_eq!(counters.draws.get(), 1);
    assert_eq!(*mount.handle().unwrap().rotation(), rotation);
    assert!(mount.handle().unwrap().render_loop().is_running());

    // Drawing resumes once the container has an area again.
    assert!(mount.resize(Viewport::new(640, 480)));
    assert_eq!(mount.frame(), FrameOutcome::Drawn);
    assert_eq!(counters.draws.get(), 2);
}

#[test]
fn test_resize_after_deactivate_does_nothing() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Interactive), &data).unwrap();
    mount.deactivate();

    assert!(!mount.resize(Viewport::new(1000, 500)));
    assert_eq!(counters.resizes.get(), 0);
}

#[test]
fn test_drag_rotates_only_in_interactive_mode() {
    let data = Dataset::reference();
    let (mut mount, _counters) = mount(Viewport::new(800, 600));
    let down = PointerEvent::Down {
        position: Vec2::new(100.0, 100.0),
        on_surface: true,
    };
    let drag_to = PointerEvent::Move {
        position: Vec2::new(200.0, 100.0),
    };

    mount.activate(options(ViewMode::Ambient), &data).unwrap();
    mount.pointer(down);
    assert!(!mount.pointer(drag_to));
    assert_eq!(mount.handle().unwrap().rotation().target_y(), 0.0);

    mount.activate(options(ViewMode::Interactive), &data).unwrap();
    mount.pointer(down);
    assert!(mount.pointer(drag_to));
    let rotation = *mount.handle().unwrap().rotation();
    assert!((rotation.target_y() - 0.5).abs() < 1e-6);
    assert_eq!(rotation.current_y, 0.0);

    // Smoothing moves the current angle a tenth of the way per frame.
    mount.frame();
    let rotation = *mount.handle().unwrap().rotation();
    assert!(rotation.current_y > 0.05 && rotation.current_y < 0.06);

    mount.pointer(PointerEvent::Up);
    assert!(!mount.handle().unwrap().is_dragging());
}

#[test]
fn test_press_on_overlay_does_not_rotate() {
    let data = Dataset::reference();
    let (mut mount, _counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Interactive), &data).unwrap();

    mount.pointer(PointerEvent::Down {
        position: Vec2::new(10.0, 10.0),
        on_surface: false,
    });
    assert!(!mount.pointer(PointerEvent::Move {
        position: Vec2::new(400.0, 400.0),
    }));
    assert!(!mount.handle().unwrap().is_dragging());
}

#[test]
fn test_index_change_restyles_without_remount() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount
        .activate(
            options(ViewMode::Interactive).with_category(Some(Category::Cryosphere)),
            &data,
        )
        .unwrap();
    let id = mount.handle().unwrap().id();
    let full = mount.handle().unwrap().visuals().overlay_scale;
    assert!((full - 1.0).abs() < 1e-5);

    assert!(mount.select_index(&data, 4));
    let handle = mount.handle().unwrap();
    assert_eq!(handle.id(), id);
    assert!((handle.visuals().overlay_scale - 0.8).abs() < 1e-5);
    let caps = handle.scene().polar_caps.as_ref().unwrap();
    assert!((caps.transform.scale - 0.8).abs() < 1e-5);
    assert_eq!(counters.created.get(), 1);
}

#[test]
fn test_out_of_range_index_is_clamped() {
    let data = Dataset::reference();
    let (mut mount, _counters) = mount(Viewport::new(800, 600));
    mount
        .activate(
            options(ViewMode::Ambient).with_category(Some(Category::Atmosphere)),
            &data,
        )
        .unwrap();

    mount.select_index(&data, 1_000);
    assert_eq!(mount.handle().unwrap().index(), 4);
}

#[test]
fn test_missing_node_halts_the_loop() {
    let data = Dataset::reference();
    let (mut mount, counters) = mount(Viewport::new(800, 600));
    mount.activate(options(ViewMode::Interactive), &data).unwrap();
    assert_eq!(mount.frame(), FrameOutcome::Drawn);

    mount.handle_mut().unwrap().scene_mut().polar_caps = None;
    assert_eq!(mount.frame(), FrameOutcome::Halted);
    assert_eq!(mount.frame(), FrameOutcome::Idle);
    assert_eq!(counters.draws.get(), 1);
    assert!(mount.handle().unwrap().animation().is_none());
}
