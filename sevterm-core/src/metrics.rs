pub trait TextMetrics: Send + Sync {
    fn label_width(&self, text: &str) -> f32;

    fn block_height(&self, text: &str, wrap_width: f32) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 12.0,
            line_height: 24.0,
        }
    }
}

impl MonospaceMetrics {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }

    pub fn columns(&self, wrap_width: f32) -> usize {
        if self.advance <= 0.0 || !wrap_width.is_finite() {
            return usize::MAX;
        }
        ((wrap_width / self.advance).floor() as usize).max(1)
    }

    pub fn wrap(&self, text: &str, wrap_width: f32) -> Vec<String> {
        wrap_lines(text, self.columns(wrap_width))
    }
}

impl TextMetrics for MonospaceMetrics {
    fn label_width(&self, text: &str) -> f32 {
        display_width(text) as f32 * self.advance
    }

    fn block_height(&self, text: &str, wrap_width: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.wrap(text, wrap_width).len() as f32 * self.line_height
    }
}

pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

pub fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut width = 0;
        for word in paragraph.split(' ') {
            let word_width = display_width(word);
            let gap = usize::from(!line.is_empty());
            if width + gap + word_width <= columns {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                width += gap + word_width;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0;
            }
            for c in word.chars() {
                let w = char_width(c);
                if width + w > columns && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    width = 0;
                }
                line.push(c);
                width += w;
            }
        }
        lines.push(line);
    }
    lines
}
