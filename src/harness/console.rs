use std::cell::RefCell;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use crossterm::style::Stylize;

use crate::model::config::ColorMode;

const FAIL_TAG: &str = "✗ TEST FAILED:";
const PASS_TAG: &str = "✓ TEST PASSED:";

/// Styling decision, made once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn resolve(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };
        Self { color }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored(&self) -> bool {
        self.color
    }

    pub fn fail_tag(&self) -> String {
        if self.color {
            FAIL_TAG.red().bold().to_string()
        } else {
            FAIL_TAG.to_string()
        }
    }

    pub fn pass_tag(&self) -> String {
        if self.color {
            PASS_TAG.green().bold().to_string()
        } else {
            PASS_TAG.to_string()
        }
    }
}

/// Shared handle to the harness output. Natives and the harness write
/// through clones of the same sink.
#[derive(Clone)]
pub struct Console {
    sink: Rc<RefCell<dyn Write>>,
    palette: Palette,
}

impl Console {
    pub fn stdout(palette: Palette) -> Self {
        Self::new(Rc::new(RefCell::new(io::stdout())), palette)
    }

    pub fn new(sink: Rc<RefCell<dyn Write>>, palette: Palette) -> Self {
        Self { sink, palette }
    }

    pub fn line(&self, text: impl Display) -> io::Result<()> {
        let mut sink = self.sink.borrow_mut();
        writeln!(sink, "{text}")?;
        sink.flush()
    }

    pub fn failure(&self, message: impl Display) -> io::Result<()> {
        self.line(format_args!("{} {message}", self.palette.fail_tag()))
    }

    pub fn pass(&self, message: impl Display) -> io::Result<()> {
        self.line(format_args!("{} {message}", self.palette.pass_tag()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Console writing into an in-memory buffer.
    pub fn capture(palette: Palette) -> (Console, Rc<RefCell<Vec<u8>>>) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let console = Console::new(buffer.clone(), palette);
        (console, buffer)
    }

    pub fn text(buffer: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8(buffer.borrow().clone()).expect("console output is utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{capture, text};
    use super::*;

    #[test]
    fn plain_palette_has_no_escapes() {
        let (console, buffer) = capture(Palette::plain());
        console.failure("Answer should be 42").unwrap();
        console.pass("done").unwrap();

        assert_eq!(
            text(&buffer),
            "✗ TEST FAILED: Answer should be 42\n✓ TEST PASSED: done\n"
        );
    }

    #[test]
    fn colored_palette_styles_tags_only() {
        let palette = Palette::resolve(ColorMode::Always);
        assert!(palette.colored());

        let (console, buffer) = capture(palette);
        console.pass("done").unwrap();
        let out = text(&buffer);

        assert!(out.contains('\u{1b}'));
        assert!(out.contains(PASS_TAG));
        assert!(out.ends_with(" done\n"));
    }

    #[test]
    fn never_disables_color() {
        assert!(!Palette::resolve(ColorMode::Never).colored());
    }
}
