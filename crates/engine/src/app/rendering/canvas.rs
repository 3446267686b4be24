use super::{DrawCommand, RenderSink, SELECTION_OUTLINE_WIDTH_PX};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const SELECTED_HIGHLIGHT_COLOR: [u8; 4] = [80, 220, 255, 255];
const GLYPH_BORDER_COLOR: [u8; 4] = [8, 9, 12, 255];
const GLYPH_PALETTE: [[u8; 4]; 8] = [
    [232, 84, 84, 255],
    [240, 160, 64, 255],
    [236, 212, 80, 255],
    [112, 196, 92, 255],
    [72, 176, 176, 255],
    [84, 132, 228, 255],
    [156, 104, 220, 255],
    [220, 112, 176, 255],
];

/// Software rasterizer over an RGBA8 frame. Glyphs are drawn as color swatches
/// keyed by their text, so distinct emoji stay distinguishable without a font.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn fill_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, color: [u8; 4]) {
        let left = left.max(0);
        let top = top.max(0);
        let right = right.min(self.width as i32);
        let bottom = bottom.min(self.height as i32);
        for y in top..bottom {
            for x in left..right {
                write_pixel_rgba_clipped(self.frame, self.width as usize, x, y, color);
            }
        }
    }

    fn outline_rect(
        &mut self,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        thickness: i32,
        color: [u8; 4],
    ) {
        self.fill_rect(left, top, right, top + thickness, color);
        self.fill_rect(left, bottom - thickness, right, bottom, color);
        self.fill_rect(left, top, left + thickness, bottom, color);
        self.fill_rect(right - thickness, top, right, bottom, color);
    }
}

impl RenderSink for FrameCanvas<'_> {
    fn draw(&mut self, command: DrawCommand<'_>) {
        match command {
            DrawCommand::Clear => self.fill(CLEAR_COLOR),
            DrawCommand::Glyph {
                glyph,
                center_x,
                center_y,
                size,
            } => {
                let half = size / 2.0;
                let left = (center_x - half).round() as i32;
                let top = (center_y - half).round() as i32;
                let right = (center_x + half).round() as i32;
                let bottom = (center_y + half).round() as i32;
                self.fill_rect(left, top, right, bottom, glyph_color(glyph));
                self.outline_rect(left, top, right, bottom, 1, GLYPH_BORDER_COLOR);
            }
            DrawCommand::SelectionOutline {
                x,
                y,
                width,
                height,
            } => {
                let left = x.round() as i32;
                let top = y.round() as i32;
                self.outline_rect(
                    left,
                    top,
                    (x + width).round() as i32,
                    (y + height).round() as i32,
                    SELECTION_OUTLINE_WIDTH_PX,
                    SELECTED_HIGHLIGHT_COLOR,
                );
            }
        }
    }
}

fn glyph_color(glyph: &str) -> [u8; 4] {
    // FNV-1a
    let hash = glyph.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    });
    GLYPH_PALETTE[(hash % GLYPH_PALETTE.len() as u64) as usize]
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
