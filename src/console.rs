//! Line-oriented terminal I/O shared by the front end and every tool.

use std::io::{self, BufRead, Write};

pub mod color {
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const PURPLE: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const END: &str = "\x1b[0m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Error,
    Warn,
    Info,
    Tips,
    Play,
}

impl Icon {
    fn glyph(self) -> (&'static str, &'static str) {
        match self {
            Icon::Error => ("[!]", color::RED),
            Icon::Warn => ("/!\\", color::YELLOW),
            Icon::Info => ("(i)", color::BLUE),
            Icon::Tips => ("(?)", color::GREEN),
            Icon::Play => ("(>)", color::GREEN),
        }
    }
}

pub struct Console<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
    colors: bool,
}

impl<'a> Console<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a, colors: bool) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            colors,
        }
    }

    /// Console bound to the process stdin/stdout.
    pub fn stdio(colors: bool) -> Console<'static> {
        Console::new(io::stdin().lock(), io::stdout(), colors)
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    pub fn set_colors(&mut self, enabled: bool) {
        self.colors = enabled;
    }

    /// Wrap `text` in an ANSI color when colors are enabled.
    pub fn paint(&self, code: &str, text: &str) -> String {
        if self.colors {
            format!("{code}{text}{}", color::END)
        } else {
            text.to_string()
        }
    }

    // Write failures on the terminal are not actionable; they are dropped.
    fn emit(&mut self, text: &str, newline: bool) {
        let _ = if newline {
            writeln!(self.output, "{text}")
        } else {
            write!(self.output, "{text}")
        };
        let _ = self.output.flush();
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.emit(text.as_ref(), true);
    }

    pub fn blank(&mut self) {
        self.emit("", true);
    }

    pub fn print(&mut self, text: impl AsRef<str>) {
        self.emit(text.as_ref(), false);
    }

    pub fn icon(&self, icon: Icon) -> String {
        let (glyph, code) = icon.glyph();
        if self.colors {
            format!(" {}{code}{glyph}{} - ", color::BOLD, color::END)
        } else {
            format!(" {glyph} - ")
        }
    }

    pub fn notify(&mut self, icon: Icon, message: impl AsRef<str>) {
        let line = format!("{}{}", self.icon(icon), message.as_ref());
        self.emit(&line, true);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.notify(Icon::Error, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.notify(Icon::Warn, message);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.notify(Icon::Info, message);
    }

    pub fn tips(&mut self, message: impl AsRef<str>) {
        self.notify(Icon::Tips, message);
    }

    /// Print `prompt` and read one line. `None` means the input is closed.
    pub fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.emit(prompt, false);
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Yes/no question defaulting to "no".
    pub fn confirm(&mut self, question: &str) -> bool {
        match self.prompt(&format!("{question} [y/N] ")) {
            Ok(Some(answer)) => is_affirmative(&answer),
            _ => false,
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
