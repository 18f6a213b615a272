//! Cleaning command output for display.
//!
//! Tools such as `lsblk` or a login shell may colorize their output or emit
//! title-setting sequences. Before such bytes are echoed to a terminal or
//! embedded in an error message they are run through a VTE parser and only
//! printable text survives.

use vte::{Params, Parser, Perform};

/// Strip escape sequences and stray control bytes.
///
/// Newlines and tabs are kept; carriage returns are dropped so that
/// `\r\n` output from remote sessions renders as plain lines.
pub fn sanitize(input: &[u8]) -> String {
    let mut text = TextOnly::default();
    let mut parser = Parser::new();
    parser.advance(&mut text, input);
    String::from_utf8_lossy(&text.0).into_owned()
}

/// Sanitize and fold to a single line, for log fields and one-line errors.
pub fn sanitize_line(input: &[u8]) -> String {
    sanitize(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
struct TextOnly(Vec<u8>);

impl Perform for TextOnly {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\t') {
            self.0.push(byte);
        }
    }

    fn hook(&mut self, _: &Params, _: &[u8], _: bool, _: char) {}

    fn put(&mut self, _: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _: &[&[u8]], _: bool) {}

    fn csi_dispatch(&mut self, _: &Params, _: &[u8], _: bool, _: char) {}

    fn esc_dispatch(&mut self, _: &[u8], _: bool, _: u8) {}
}
