use crate::config::Config;
use crate::console::Console;

/// Everything a front end loop or a tool handler needs for one run: the
/// terminal and the live settings.
pub struct Session<'a> {
    pub console: Console<'a>,
    pub config: &'a mut Config,
}

impl<'a> Session<'a> {
    pub fn new(console: Console<'a>, config: &'a mut Config) -> Self {
        Self { console, config }
    }
}
