use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Color, Print, SetAttribute, SetForegroundColor},
};
use sevterm_core::metrics::{char_width, wrap_lines};
use sevterm_core::{Rect, TerminalScreen, Texture, IMAGE_SLOTS};
use tracing::trace;

use crate::input::CellMapper;

const FOREGROUND: Color = Color::Rgb {
    r: 0x7b,
    g: 0xd8,
    b: 0x8f,
};
const DIM: Color = Color::Rgb {
    r: 0x2f,
    g: 0x6b,
    b: 0x3c,
};

#[derive(Debug, Clone)]
pub struct ImageCell {
    pub slot: usize,
    pub column: u16,
    pub row: u16,
    pub columns: u16,
    pub rows: u16,
    pub texture: Arc<Texture>,
}

pub struct Painter {
    cells: CellMapper,
}

impl Painter {
    pub fn new(cells: CellMapper) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &CellMapper {
        &self.cells
    }

    pub fn paint<W: Write>(&self, out: &mut W, screen: &TerminalScreen) -> Result<Vec<ImageCell>> {
        let layout = screen.layout();
        let nodes = screen.nodes();
        let state = screen.navigation();
        let hover = screen.hover();

        crossterm::queue!(out, SetForegroundColor(FOREGROUND))?;

        let header = layout.header();
        let badge = screen.language().active_language().code();
        self.text(out, header, &nodes.header.text, true)?;
        if let Some((column, row, columns, _)) = self.cells.cells(header) {
            let at = column.saturating_add(columns.saturating_sub(badge.len() as u16 + 1));
            self.print_at(out, at, row, badge, false)?;
        }
        self.text(out, layout.folders_heading(), &nodes.folders_heading.text, false)?;

        for (index, label) in nodes.section_labels.iter().enumerate() {
            let Some(rect) = layout.section_box(index) else {
                continue;
            };
            self.frame(out, rect, hover.section == Some(index))?;
            let text = label.text.replace('\n', " ");
            self.text(out, inset(rect), &text, index == state.section)?;
        }

        let container = layout.entry_label_width();
        for (index, label) in nodes.entry_labels.iter().enumerate() {
            let Some(rect) = layout.entry_row(index) else {
                continue;
            };
            if label.text.is_empty() {
                continue;
            }
            self.frame(out, rect, hover.entry == Some(index))?;
            let skip = ((screen.config().marquee.margin - label.offset) / self.cells.scale_x())
                .max(0.0) as usize;
            let visible: String = label.text.chars().skip(skip).collect();
            let inner = Rect::new(rect.x + 15.0, rect.y + 25.0, container, self.cells.scale_y());
            self.text(out, inner, &visible, index == state.entry)?;
        }

        self.connector(out, screen)?;
        self.frame(out, layout.text_panel(), false)?;
        let images = self.body(out, screen)?;
        self.scrollbar(out, screen)?;

        crossterm::queue!(out, SetAttribute(Attribute::Reset))?;
        out.flush()?;
        Ok(images)
    }

    fn body<W: Write>(&self, out: &mut W, screen: &TerminalScreen) -> Result<Vec<ImageCell>> {
        let layout = screen.layout();
        let area = layout.text_area();
        let offset = screen.scroll().state().content_offset;
        let metrics = self.cells.metrics();
        let columns = metrics.columns(layout.word_wrap_width());

        for (line_index, line) in wrap_lines(&screen.nodes().body.text, columns)
            .iter()
            .enumerate()
        {
            let y = layout.content_to_scene_y(offset, line_index as f32 * metrics.line_height);
            if y < area.y || y + metrics.line_height > area.bottom() {
                continue;
            }
            let rect = Rect::new(area.x + 10.0, y, layout.word_wrap_width(), metrics.line_height);
            self.text(out, rect, line, false)?;
        }

        let mut images = Vec::new();
        for slot in 0..IMAGE_SLOTS {
            let node = &screen.nodes().images[slot];
            let (Some(placement), Some(texture)) = (node.placement, node.texture.as_ref()) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let rect = Rect::new(
                area.x + placement.x_center - placement.width / 2.0,
                layout.content_to_scene_y(offset, placement.top),
                placement.width,
                placement.height,
            );
            if rect.y < area.y || rect.bottom() > area.bottom() {
                continue;
            }
            if let Some((column, row, columns, rows)) = self.cells.cells(rect) {
                images.push(ImageCell {
                    slot,
                    column,
                    row,
                    columns,
                    rows,
                    texture: Arc::clone(texture),
                });
            }
        }
        trace!(images = images.len(), offset, "text panel painted");
        Ok(images)
    }

    fn scrollbar<W: Write>(&self, out: &mut W, screen: &TerminalScreen) -> Result<()> {
        let layout = screen.layout();
        let Some((column, top, _, rows)) = self.cells.cells(layout.scrollbar_track()) else {
            return Ok(());
        };
        let thumb = layout.thumb_rect(screen.scroll().state().thumb_offset);
        let thumb_top = self.cells.row(thumb.y);
        let thumb_bottom = self.cells.row(thumb.bottom()).max(thumb_top + 1);
        let color = if screen.scroll().is_thumb_held() {
            Color::White
        } else {
            FOREGROUND
        };
        for row in top..top.saturating_add(rows) {
            let in_thumb = (thumb_top..thumb_bottom).contains(&i32::from(row));
            let (glyph, fg) = if in_thumb { ("█", color) } else { ("│", DIM) };
            crossterm::queue!(
                out,
                cursor::MoveTo(column, row),
                SetForegroundColor(fg),
                Print(glyph)
            )?;
        }
        crossterm::queue!(out, SetForegroundColor(FOREGROUND))?;
        Ok(())
    }

    fn connector<W: Write>(&self, out: &mut W, screen: &TerminalScreen) -> Result<()> {
        let layout = screen.layout();
        let state = screen.navigation();
        let (Some(section), Some(entry)) = (
            layout.section_box(state.section),
            layout.entry_row(state.entry),
        ) else {
            return Ok(());
        };
        let x = (section.right() + entry.x) / 2.0;
        let start = entry.y + 35.0;
        let end = start + screen.connector_height();
        let column = self.cells.column(x).max(0) as u16;
        let (from, to) = (self.cells.row(start.min(end)), self.cells.row(start.max(end)));
        for row in from.max(0)..=to.min(i32::from(self.cells.rows()) - 1) {
            crossterm::queue!(out, cursor::MoveTo(column, row as u16), Print("┃"))?;
        }
        Ok(())
    }

    fn frame<W: Write>(&self, out: &mut W, rect: Rect, highlighted: bool) -> Result<()> {
        let Some((column, row, columns, rows)) = self.cells.cells(rect) else {
            return Ok(());
        };
        if columns < 2 || rows < 2 {
            return Ok(());
        }
        let color = if highlighted { FOREGROUND } else { DIM };
        let inner = "─".repeat(usize::from(columns - 2));
        let last = row + rows - 1;
        crossterm::queue!(
            out,
            SetForegroundColor(color),
            cursor::MoveTo(column, row),
            Print(format!("┌{inner}┐")),
            cursor::MoveTo(column, last),
            Print(format!("└{inner}┘"))
        )?;
        for y in row + 1..last {
            crossterm::queue!(
                out,
                cursor::MoveTo(column, y),
                Print("│"),
                cursor::MoveTo(column + columns - 1, y),
                Print("│")
            )?;
        }
        crossterm::queue!(out, SetForegroundColor(FOREGROUND))?;
        Ok(())
    }

    fn text<W: Write>(&self, out: &mut W, rect: Rect, text: &str, reverse: bool) -> Result<()> {
        let Some((column, row, columns, _)) = self.cells.cells(rect) else {
            return Ok(());
        };
        let first_line = text.lines().next().unwrap_or_default();
        self.print_at(out, column, row, &clip(first_line, usize::from(columns)), reverse)
    }

    fn print_at<W: Write>(
        &self,
        out: &mut W,
        column: u16,
        row: u16,
        text: &str,
        reverse: bool,
    ) -> Result<()> {
        if reverse {
            crossterm::queue!(
                out,
                cursor::MoveTo(column, row),
                SetAttribute(Attribute::Reverse),
                Print(text),
                SetAttribute(Attribute::NoReverse)
            )?;
        } else {
            crossterm::queue!(out, cursor::MoveTo(column, row), Print(text))?;
        }
        Ok(())
    }
}

fn inset(rect: Rect) -> Rect {
    Rect::new(rect.x + 10.0, rect.y + rect.height / 2.0 - 5.0, rect.width - 20.0, rect.height / 2.0)
}

fn clip(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|&c| {
            used += char_width(c);
            used <= width
        })
        .collect()
}
