use std::io::Write;

use anyhow::{bail, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crossterm::{
    cursor,
    terminal::{Clear, ClearType},
};
use png::{BitDepth, ColorType, Encoder};
use sevterm_core::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawParams {
    pub column: u16,
    pub row: u16,
    pub columns: u32,
    pub rows: u32,
}

impl DrawParams {
    pub fn clamped(column: u16, row: u16, columns: u32, rows: u32) -> Self {
        Self {
            column,
            row,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }
}

/// Draws textures with the kitty graphics protocol. Each image slot keeps its own
/// image id so redrawing a slot replaces the previous placement.
pub struct KittyRenderer<W: Write> {
    writer: W,
}

impl<W: Write> KittyRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn draw(&mut self, image_id: u32, texture: &Texture, params: DrawParams) -> Result<()> {
        let expected = texture.width as usize * texture.height as usize * 4;
        if texture.width == 0 || texture.height == 0 || texture.pixels.len() != expected {
            bail!(
                "texture {}x{} has {} bytes of pixel data",
                texture.width,
                texture.height,
                texture.pixels.len()
            );
        }

        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, texture.width, texture.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&texture.pixels)?;
        writer.finish()?;

        crossterm::queue!(self.writer, cursor::MoveTo(params.column, params.row))?;

        let encoded = BASE64.encode(&buffer);
        let mut chunks = encoded.as_bytes().chunks(4096).peekable();
        let mut first = true;

        while let Some(chunk) = chunks.next() {
            let more = chunks.peek().is_some();
            if first {
                write!(
                    self.writer,
                    "\u{1b}_Ga=T,f=100,C=1,q=2,i={},p=1,c={},r={},s={},v={},z=1,m={}",
                    image_id,
                    params.columns,
                    params.rows,
                    texture.width,
                    texture.height,
                    if more { 1 } else { 0 }
                )?;
                first = false;
            } else {
                write!(self.writer, "\u{1b}_Gm={},q=2", if more { 1 } else { 0 })?;
            }
            if !chunk.is_empty() {
                self.writer.write_all(b";")?;
                self.writer.write_all(chunk)?;
            }
            write!(self.writer, "\u{1b}\\")?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Shows an image that was already transmitted under `image_id` again,
    /// without resending its pixels.
    pub fn place(&mut self, image_id: u32, params: DrawParams) -> Result<()> {
        crossterm::queue!(self.writer, cursor::MoveTo(params.column, params.row))?;
        write!(
            self.writer,
            "\u{1b}_Ga=p,C=1,q=2,i={},p=1,c={},r={},z=1\u{1b}\\",
            image_id, params.columns, params.rows
        )?;
        Ok(())
    }

    pub fn clear_placements(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}_Ga=d,d=a,q=2\u{1b}\\")?;
        Ok(())
    }

    pub fn delete_all(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}_Ga=d,d=A,q=2\u{1b}\\")?;
        Ok(())
    }

    pub fn begin_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026h")?;
        Ok(())
    }

    pub fn end_sync_update(&mut self) -> Result<()> {
        write!(self.writer, "\u{1b}[?2026l")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        crossterm::queue!(
            &mut self.writer,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_emits_protocol_after_cursor_move() {
        let mut renderer = KittyRenderer::new(Vec::new());
        let texture = Texture {
            width: 1,
            height: 1,
            pixels: vec![255, 0, 0, 255],
        };

        renderer
            .draw(7, &texture, DrawParams::clamped(3, 4, 10, 0))
            .unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.starts_with("\u{1b}[5;4H"));
        assert!(output.contains("\u{1b}_Ga=T,f=100,C=1,q=2,i=7,p=1,c=10,r=1,s=1,v=1"));
        assert!(output.ends_with("\u{1b}\\"));
    }

    #[test]
    fn place_reuses_transmitted_image() {
        let mut renderer = KittyRenderer::new(Vec::new());
        renderer.clear_placements().unwrap();
        renderer
            .place(2, DrawParams::clamped(0, 1, 4, 3))
            .unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.starts_with("\u{1b}_Ga=d,d=a,q=2\u{1b}\\"));
        assert!(output.contains("\u{1b}[2;1H\u{1b}_Ga=p,C=1,q=2,i=2,p=1,c=4,r=3,z=1"));
    }

    #[test]
    fn draw_rejects_inconsistent_textures() {
        let mut renderer = KittyRenderer::new(Vec::new());
        let texture = Texture {
            width: 2,
            height: 2,
            pixels: vec![0; 3],
        };
        assert!(renderer
            .draw(1, &texture, DrawParams::clamped(0, 0, 1, 1))
            .is_err());
        assert!(renderer.writer().is_empty());
    }
}
