use crate::platform::PlatformOps;

pub static UNIX_PLATFORM: Unix = Unix;

pub struct Unix;

impl PlatformOps for Unix {
    fn shell(&self) -> (&'static str, &'static str) {
        ("sh", "-c")
    }
    fn clear_program(&self) -> &'static str {
        "clear"
    }
}
