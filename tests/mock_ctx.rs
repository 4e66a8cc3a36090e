use eframe::egui;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockCtx {
    pub commands: Arc<Mutex<Vec<egui::ViewportCommand>>>,
    pub repaints: Arc<AtomicUsize>,
}

impl MockCtx {
    pub fn take(&self) -> Vec<egui::ViewportCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }
}

impl tarrow::gui::ViewportCtx for MockCtx {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand) {
        self.commands.lock().unwrap().push(cmd);
    }

    fn request_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::SeqCst);
    }
}
