pub mod alert;
pub mod controller;
pub mod dock;
pub mod drag;
pub mod geometry;
pub mod gui;
pub mod hotkey;
pub mod logging;
pub mod panel;
pub mod scheduler;
pub mod screens;
pub mod settings;
pub mod stats;
pub mod visibility;
pub mod worker;
