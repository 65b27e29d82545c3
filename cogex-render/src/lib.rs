pub mod font;
pub mod render;

pub use font::{FALLBACK_FONTS, find_system_font, load_font};
pub use render::{
    Anchor, Colors, FrameStats, FrameView, PhaseRenderer, RENDER_STAGES, Renderer, SkiaRenderer,
    StimulusView, TextStyle,
};
