//! Crossterm backend: a full-redraw render sink and the raw-mode guard.

use std::io::{self, Stdout, Write};

use bracket_terminal::prelude::RGB;
use crossterm::{
    QueueableCommand, cursor, execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal,
};

use super::{DisplayCell, Frame, Line, RenderSink, StyleTag, style_for};
use crate::error::SessionError;

/// Raw mode with a hidden cursor for as long as the guard lives.
///
/// Dropping it restores the terminal, which covers normal returns, early
/// `?` exits, interrupts and unwinding panics alike.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            ResetColor,
            SetAttribute(Attribute::Reset),
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Clears the screen and redraws the whole frame on every present.
pub struct TerminalSink {
    stdout: Stdout,
    buf: Vec<u8>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for TerminalSink {
    fn present(&mut self, frame: &Frame) -> Result<(), SessionError> {
        let columns = if frame.centered {
            terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
        } else {
            0
        };
        self.buf.clear();
        encode_frame_into(frame, columns, &mut self.buf)?;
        self.flush_buf()?;
        Ok(())
    }
}

/// Encodes a frame as crossterm commands. `columns` is the screen width used
/// to center lines; it is ignored for uncentered frames.
pub fn encode_frame_into(frame: &Frame, columns: usize, out: &mut Vec<u8>) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    for line in &frame.header {
        encode_line_into(line, frame.centered, columns, out)?;
    }
    for row in &frame.map {
        encode_row_into(row, out)?;
    }
    if !frame.map.is_empty() {
        out.queue(Print("\r\n"))?;
    }
    for line in &frame.footer {
        encode_line_into(line, frame.centered, columns, out)?;
    }
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn encode_line_into(
    line: &Line,
    centered: bool,
    columns: usize,
    out: &mut Vec<u8>,
) -> io::Result<()> {
    if centered {
        let width = line.plain_text().chars().count();
        let pad = columns.saturating_sub(width) / 2;
        if pad > 0 {
            out.queue(Print(" ".repeat(pad)))?;
        }
    }
    for span in &line.spans {
        apply_style_into(out, span.style)?;
        out.queue(Print(&span.text))?;
    }
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(Print("\r\n"))?;
    Ok(())
}

fn encode_row_into(row: &[DisplayCell], out: &mut Vec<u8>) -> io::Result<()> {
    let mut current: Option<StyleTag> = None;
    for cell in row {
        if current != Some(cell.style) {
            apply_style_into(out, cell.style)?;
            current = Some(cell.style);
        }
        out.queue(Print(cell.glyph))?;
    }
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(Print("\r\n"))?;
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, tag: StyleTag) -> io::Result<()> {
    let style = style_for(tag);
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(to_color(style.fg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    if style.italic {
        out.queue(SetAttribute(Attribute::Italic))?;
    }
    Ok(())
}

fn to_color(rgb: RGB) -> Color {
    Color::Rgb {
        r: (rgb.r.clamp(0.0, 1.0) * 255.0).round() as u8,
        g: (rgb.g.clamp(0.0, 1.0) * 255.0).round() as u8,
        b: (rgb.b.clamp(0.0, 1.0) * 255.0).round() as u8,
    }
}
