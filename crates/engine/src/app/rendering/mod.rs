mod canvas;
mod renderer;

pub use canvas::FrameCanvas;
pub use renderer::Renderer;

use crate::world::GameEngine;

pub const SELECTION_OUTLINE_WIDTH_PX: i32 = 2;

/// One drawing instruction. Coordinates are world pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand<'a> {
    Clear,
    Glyph {
        glyph: &'a str,
        center_x: f64,
        center_y: f64,
        size: f64,
    },
    SelectionOutline {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

pub trait RenderSink {
    fn draw(&mut self, command: DrawCommand<'_>);
}

/// Sink for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn draw(&mut self, _command: DrawCommand<'_>) {}
}

/// Clears, then draws every entity of every visible layer in layer order and,
/// within a layer, insertion order. Later entities paint over earlier ones.
pub fn render_world(engine: &GameEngine, sink: &mut dyn RenderSink) {
    sink.draw(DrawCommand::Clear);

    for layer in engine.layers().iter().filter(|layer| layer.visible) {
        for id in layer.entity_ids() {
            let Some(entity) = engine.entity(id) else {
                continue;
            };
            let (center_x, center_y) = entity.body.center();
            sink.draw(DrawCommand::Glyph {
                glyph: &entity.emoji,
                center_x,
                center_y,
                size: entity.body.height,
            });
            if entity.selected {
                sink.draw(DrawCommand::SelectionOutline {
                    x: entity.body.x,
                    y: entity.body.y,
                    width: entity.body.width,
                    height: entity.body.height,
                });
            }
        }
    }
}
