//! Ctrl-C routing. At a prompt an interrupt quits the program; while a child
//! process or an animation is in the foreground it is only recorded, and the
//! running operation decides what to do with it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct Interrupt {
    busy: AtomicUsize,
    pending: AtomicBool,
}

/// Marks a foreground operation; interrupts are recorded until it is dropped.
pub struct BusyGuard<'a> {
    interrupt: &'a Interrupt,
}

impl Interrupt {
    pub const fn new() -> Self {
        Self {
            busy: AtomicUsize::new(0),
            pending: AtomicBool::new(false),
        }
    }

    /// Called from the signal handler. Returns true when the program should quit.
    pub fn on_signal(&self) -> bool {
        if self.busy.load(Ordering::SeqCst) == 0 {
            return true;
        }
        self.pending.store(true, Ordering::SeqCst);
        false
    }

    pub fn busy(&self) -> BusyGuard<'_> {
        self.busy.fetch_add(1, Ordering::SeqCst);
        BusyGuard { interrupt: self }
    }

    /// Consume a recorded interrupt.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.interrupt.busy.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.interrupt.pending.store(false, Ordering::SeqCst);
        }
    }
}

pub static INTERRUPT: Interrupt = Interrupt::new();

pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        if INTERRUPT.on_signal() {
            // stderr only: stdout may be locked by the prompt
            eprintln!();
            std::process::exit(0);
        }
        log::debug!("interrupt recorded for the running operation");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_interrupt_quits() {
        let interrupt = Interrupt::new();
        assert!(interrupt.on_signal());
        assert!(!interrupt.take());
    }

    #[test]
    fn busy_interrupt_is_recorded_once() {
        let interrupt = Interrupt::new();
        let _guard = interrupt.busy();
        assert!(!interrupt.on_signal());
        assert!(interrupt.take());
        assert!(!interrupt.take());
    }

    #[test]
    fn leftover_interrupt_is_cleared_with_the_last_guard() {
        let interrupt = Interrupt::new();
        {
            let _outer = interrupt.busy();
            {
                let _inner = interrupt.busy();
                interrupt.on_signal();
            }
            assert!(interrupt.take());
            interrupt.on_signal();
        }
        assert!(!interrupt.take());
        assert!(interrupt.on_signal());
    }
}
