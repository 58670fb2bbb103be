//! Windowed viewer that hosts a globe [`Mount`] in a winit window.
//!
//! # Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `Tab` | Toggle ambient / interactive |
//! | `1`-`4` | Atmosphere, ocean, cryosphere, land |
//! | `0` | Clear the category |
//! | `Left` / `Right` | Previous / next period |
//! | `Esc` | Quit |
//!
//! In interactive mode, drag with the left mouse button to rotate the globe.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::dataset::{Category, Dataset};
use crate::error::{GlobeError, GpuError};
use crate::gpu::WgpuFactory;
use crate::input::PointerInput;
use crate::lifecycle::{Mount, SceneOptions};
use crate::render_loop::FrameOutcome;
use crate::rotation::ViewMode;
use crate::starfield::StarfieldConfig;
use crate::viewport::Viewport;

/// A user request coming from the keyboard or the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMode,
    SelectCategory(Option<Category>),
    StepIndex(isize),
    SetIndex(usize),
    Exit,
}

impl Command {
    /// Map a pressed key to a command.
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Tab) => Some(Command::ToggleMode),
            Key::Named(NamedKey::ArrowLeft) => Some(Command::StepIndex(-1)),
            Key::Named(NamedKey::ArrowRight) => Some(Command::StepIndex(1)),
            Key::Named(NamedKey::Escape) => Some(Command::Exit),
            Key::Character(c) => match c.as_str() {
                "0" => Some(Command::SelectCategory(None)),
                "1" => Some(Command::SelectCategory(Some(Category::Atmosphere))),
                "2" => Some(Command::SelectCategory(Some(Category::Ocean))),
                "3" => Some(Command::SelectCategory(Some(Category::Cryosphere))),
                "4" => Some(Command::SelectCategory(Some(Category::Land))),
                _ => None,
            },
            _ => None,
        }
    }
}

/// What a command requires of the mounted scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Nothing,
    /// Mode or category changed: tear down and rebuild the scene.
    Remount,
    /// Only the index changed: rerun the data mapper.
    Restyle,
    Exit,
}

/// The viewer's current mode, category and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub mode: ViewMode,
    pub category: Option<Category>,
    pub index: usize,
}

impl Selection {
    pub fn apply(&mut self, command: Command, dataset: &Dataset) -> Change {
        match command {
            Command::ToggleMode => {
                self.mode = self.mode.toggled();
                Change::Remount
            }
            Command::SelectCategory(category) if category == self.category => Change::Nothing,
            Command::SelectCategory(category) => {
                self.category = category;
                Change::Remount
            }
            Command::StepIndex(delta) => {
                let max = dataset.max_index() as isize;
                let next = (self.index as isize).saturating_add(delta).clamp(0, max) as usize;
                self.set_index(next)
            }
            Command::SetIndex(index) => self.set_index(dataset.clamp_index(index)),
            Command::Exit => Change::Exit,
        }
    }

    fn set_index(&mut self, index: usize) -> Change {
        if index == self.index {
            Change::Nothing
        } else {
            self.index = index;
            Change::Restyle
        }
    }

    /// Window title for this selection.
    pub fn title(&self, base: &str, dataset: &Dataset) -> String {
        let mode = match self.mode {
            ViewMode::Ambient => "ambient",
            ViewMode::Interactive => "interactive",
        };
        match self.category {
            Some(category) => format!("{} [{}] {}", base, mode, dataset.summary(category, self.index)),
            None => format!(
                "{} [{}] {}",
                base,
                mode,
                dataset.period(dataset.clamp_index(self.index)).unwrap_or("")
            ),
        }
    }
}

/// Builder and entry point for the windowed globe.
pub struct Viewer {
    dataset: Dataset,
    selection: Selection,
    starfield: StarfieldConfig,
    title: String,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            dataset: Dataset::reference(),
            selection: Selection {
                mode: ViewMode::Ambient,
                category: None,
                index: 0,
            },
            starfield: StarfieldConfig::default(),
            title: "Climate Globe".to_string(),
        }
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.selection.mode = mode;
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.selection.category = category;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.selection.index = index;
        self
    }

    pub fn with_starfield(mut self, starfield: StarfieldConfig) -> Self {
        self.starfield = starfield;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(mut self) -> Result<(), GlobeError> {
        self.dataset.validate()?;
        self.selection.index = self.dataset.clamp_index(self.selection.index);

        let event_loop = EventLoop::new()?;
        // Frames are requested by the render loop while it runs.
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: Viewer,
    window: Option<Arc<Window>>,
    mount: Option<Mount<WgpuFactory>>,
    pointer: PointerInput,
    error: Option<GlobeError>,
}

impl App {
    fn new(config: Viewer) -> Self {
        Self {
            config,
            window: None,
            mount: None,
            pointer: PointerInput::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: GlobeError) {
        log::error!("{}", error);
        if let Some(mount) = &mut self.mount {
            mount.deactivate();
        }
        self.error = Some(error);
        event_loop.exit();
    }

    fn update_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.config.selection.title(&self.config.title, &self.config.dataset));
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Replace the live scene with one built from the current selection.
    fn remount(&mut self, event_loop: &ActiveEventLoop) {
        let Some(mount) = &mut self.mount else {
            return;
        };
        let selection = self.config.selection;
        let options = SceneOptions::new()
            .with_mode(selection.mode)
            .with_category(selection.category)
            .with_index(selection.index)
            .with_starfield(self.config.starfield);

        let activated = mount.activate(options, &self.config.dataset).map(|_| ());
        match activated {
            Ok(()) => {
                self.update_title();
                self.request_redraw();
            }
            Err(GpuError::EmptyViewport) => {
                log::warn!("Window has no drawable area yet, waiting for a resize");
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn apply(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match self.config.selection.apply(command, &self.config.dataset) {
            Change::Nothing => {}
            Change::Remount => {
                log::info!(
                    "Switching to {:?} / {:?}",
                    self.config.selection.mode,
                    self.config.selection.category
                );
                self.remount(event_loop);
            }
            Change::Restyle => {
                if let Some(mount) = &mut self.mount {
                    mount.select_index(&self.config.dataset, self.config.selection.index);
                }
                self.update_title();
                self.request_redraw();
            }
            Change::Exit => {
                if let Some(mount) = &mut self.mount {
                    mount.deactivate();
                }
                event_loop.exit();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(feature = "egui")]
        let commands = self.run_overlay();

        let Some(mount) = &mut self.mount else {
            return;
        };
        let outcome = mount.frame();
        match &outcome {
            FrameOutcome::Drawn | FrameOutcome::Idle => {}
            FrameOutcome::Halted => log::warn!("Render loop halted"),
            FrameOutcome::Failed(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(surface) = mount.surface_mut() {
                    surface.reconfigure();
                }
            }
            FrameOutcome::Failed(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                mount.deactivate();
                event_loop.exit();
                return;
            }
            FrameOutcome::Failed(e) => log::warn!("Render error: {:?}", e),
        }

        // A minimized window yields Idle; the next drawable resize requests a redraw.
        if outcome.wants_next_frame() {
            self.request_redraw();
        }

        #[cfg(feature = "egui")]
        {
            for command in commands {
                self.apply(command, event_loop);
            }
        }
    }

    #[cfg(feature = "egui")]
    fn run_overlay(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        let selection = self.config.selection;
        let dataset = &self.config.dataset;
        if let Some(surface) = self.mount.as_mut().and_then(|m| m.surface_mut()) {
            surface.run_overlay(|ctx| overlay::show(ctx, &selection, dataset, &mut commands));
        }
        commands
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        self.mount = Some(Mount::new(
            WgpuFactory::new(window.clone()),
            Viewport::from(window.inner_size()),
        ));
        self.window = Some(window);
        self.remount(event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = self
            .mount
            .as_mut()
            .and_then(|m| m.surface_mut())
            .is_some_and(|surface| surface.overlay_event(&event));
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                if let Some(mount) = &mut self.mount {
                    mount.deactivate();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let viewport = Viewport::from(size);
                let Some(mount) = &mut self.mount else {
                    return;
                };
                mount.resize(viewport);
                if !mount.is_active() && viewport.is_drawable() {
                    self.remount(event_loop);
                }
                self.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        ref logical_key,
                        ..
                    },
                ..
            } if !consumed => {
                if let Some(command) = Command::from_key(logical_key) {
                    self.apply(command, event_loop);
                }
            }
            WindowEvent::CursorMoved { .. } | WindowEvent::MouseInput { .. } => {
                if let Some(pointer) = self.pointer.translate(&event, !consumed) {
                    if let Some(mount) = &mut self.mount {
                        mount.pointer(pointer);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }

        #[cfg(feature = "egui")]
        {
            if consumed {
                self.request_redraw();
            }
        }
    }
}

#[cfg(feature = "egui")]
mod overlay {
    use super::{Command, Selection};
    use crate::dataset::{Category, Dataset};
    use crate::rotation::ViewMode;

    pub fn show(ctx: &egui::Context, selection: &Selection, dataset: &Dataset, commands: &mut Vec<Command>) {
        egui::Window::new("Climate")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let interactive = selection.mode == ViewMode::Interactive;
                if ui
                    .selectable_label(interactive, "Interactive")
                    .clicked()
                {
                    commands.push(Command::ToggleMode);
                }

                ui.separator();
                ui.horizontal_wrapped(|ui| {
                    if ui.selectable_label(selection.category.is_none(), "None").clicked() {
                        commands.push(Command::SelectCategory(None));
                    }
                    for category in Category::ALL {
                        let selected = selection.category == Some(category);
                        if ui.selectable_label(selected, category.label()).clicked() {
                            commands.push(Command::SelectCategory(Some(category)));
                        }
                    }
                });

                let mut index = selection.index;
                let period = dataset.period(index).unwrap_or("");
                if ui
                    .add(egui::Slider::new(&mut index, 0..=dataset.max_index()).text(period))
                    .changed()
                {
                    commands.push(Command::SetIndex(index));
                }

                if let Some(category) = selection.category {
                    ui.separator();
                    ui.label(dataset.summary(category, selection.index));
                }
            });
    }
}
