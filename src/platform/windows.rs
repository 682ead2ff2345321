use crate::platform::PlatformOps;
use std::process::Command;

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn shell(&self) -> (&'static str, &'static str) {
        ("cmd", "/C")
    }
    fn clear_program(&self) -> &'static str {
        "cls"
    }
    // `cls` is a cmd builtin, not a program.
    fn clear_screen(&self) {
        if let Err(e) = Command::new("cmd").args(["/C", "cls"]).status() {
            log::debug!("clearing the screen failed: {e}");
        }
    }
}
