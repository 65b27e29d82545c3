use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, bail};
use cogex_cache::{Atom, get_text, intern_text};
use cogex_core::Phase;
use cogex_timing::{FrameLog, FrameSummary, Timer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tiny_skia::{Pixmap, Rect};

pub const INSTRUCTION_PX: f32 = 28.0;
pub const STIMULUS_PX: f32 = 96.0;
pub const PROGRESS_PX: f32 = 24.0;
pub const BANNER_PX: f32 = 48.0;

const COMPONENT_SAMPLES: usize = 1000;

/// Stages timed separately on every frame.
pub const RENDER_STAGES: [&str; 3] = ["clear", "phase", "copy"];
const PROGRESS_POS: (f32, f32) = (20.0, 20.0);

/// Straight RGBA colours for the whole display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub background: [u8; 4],
    pub foreground: [u8; 4],
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            foreground: [0, 0, 0, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct StimulusView {
    pub label: String,
    /// `None` draws in the foreground colour.
    pub ink: Option<[u8; 4]>,
}

/// What one frame shows, taken from the session before drawing.
#[derive(Debug, Clone)]
pub struct FrameView<'a, P: Phase> {
    pub phase: P,
    pub instructions: &'a [String],
    pub stimulus: Option<StimulusView>,
    /// One-based trial number and total.
    pub progress: Option<(usize, usize)>,
}

type TextKey = (Atom, [u8; 4], u32);

struct TextCache {
    font: FontVec,
    map: HashMap<TextKey, Option<Arc<Pixmap>>>,
}

impl TextCache {
    fn new(font: FontVec) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, atom: Atom, style: TextStyle) -> Option<Arc<Pixmap>> {
        let key = (atom, style.color, style.size_px.to_bits());
        if let Some(p) = self.map.get(&key) {
            return p.clone();
        }
        let pm = render_text_pixmap(&key.0, style.size_px, &self.font, style.color).map(Arc::new);
        self.map.insert(key, pm.clone());
        pm
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Rasterizes `text` into a tight, premultiplied pixmap. `None` when no glyph
/// has an outline (empty or whitespace-only text).
pub fn render_text_pixmap(
    text: &str,
    font_size: f32,
    font: &FontVec,
    color: [u8; 4],
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    if outlines.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let data = pm.data_mut();

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i64;
            let iy = (y as f32 + b.min.y - min_y).floor() as i64;
            if ix < 0 || iy < 0 || ix >= w as i64 || iy >= h as i64 {
                return;
            }
            let i = (iy as usize * stride + ix as usize) * 4;
            blend_pixel(&mut data[i..i + 4], premultiply(color, cov));
        });
    }

    Some(pm)
}

/// Straight colour scaled by glyph coverage, premultiplied.
fn premultiply(color: [u8; 4], coverage: f32) -> [u8; 4] {
    let a = (coverage * color[3] as f32 / 255.0).clamp(0.0, 1.0);
    [
        (color[0] as f32 * a) as u8,
        (color[1] as f32 * a) as u8,
        (color[2] as f32 * a) as u8,
        (a * 255.0) as u8,
    ]
}

/// Porter-Duff over in premultiplied space: `dst = src + dst * (1 - src.a)`.
fn blend_pixel(dst: &mut [u8], src: [u8; 4]) {
    let inv = 255 - src[3] as u32;
    for c in 0..4 {
        let v = src[c] as u32 + (dst[c] as u32 * inv + 127) / 255;
        dst[c] = v.min(255) as u8;
    }
}

/// Integer pixel span of `rect` clipped to the canvas, `None` if empty.
fn pixel_span(rect: &Rect, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
    let x0 = rect.x().floor().max(0.0).min(width as f32) as usize;
    let y0 = rect.y().floor().max(0.0).min(height as f32) as usize;
    let x1 = (rect.x() + rect.width()).ceil().min(width as f32) as usize;
    let y1 = (rect.y() + rect.height()).ceil().min(height as f32) as usize;
    if x1 <= x0 || y1 <= y0 {
        None
    } else {
        Some((x0, y0, x1, y1))
    }
}

/// Merges rects on the same row that touch, so each copy covers a run once.
fn coalesce_dirty(rects: &mut Vec<Rect>) {
    rects.sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x())));
    let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
    for r in rects.drain(..) {
        if let Some(last) = out.last_mut() {
            let same_row =
                (r.y() - last.y()).abs() < 1.0 && (r.height() - last.height()).abs() < 1.0;
            let touching = r.x() <= last.x() + last.width() + 1.0;
            if same_row && touching {
                let nx = last.x().min(r.x());
                let nx2 = (last.x() + last.width()).max(r.x() + r.width());
                if let Some(merged) = Rect::from_xywh(nx, last.y(), nx2 - nx, last.height()) {
                    *last = merged;
                    continue;
                }
            }
        }
        out.push(r);
    }
    *rects = out;
}

fn anchor_origin(anchor: Anchor, pos: (f32, f32), size: (u32, u32)) -> (i32, i32) {
    match anchor {
        Anchor::Center => (
            (pos.0 - size.0 as f32 * 0.5).floor() as i32,
            (pos.1 - size.1 as f32 * 0.5).floor() as i32,
        ),
        Anchor::TopLeft => (pos.0.floor() as i32, pos.1.floor() as i32),
    }
}

fn solid_buffer(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    color
        .into_iter()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub clear: Duration,
    pub phase: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub dirty_count: usize,
}

pub trait Renderer {
    fn blit_text(&mut self, intern_id: usize, style: TextStyle, pos: (f32, f32), anchor: Anchor);
}

pub trait PhaseRenderer<P: Phase>: Renderer {
    fn render_phase(&mut self, view: &FrameView<'_, P>) -> Result<()>;
}

/// CPU renderer drawing into an offscreen canvas and copying only the
/// regions that changed into the presented frame buffer.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    colors: Colors,

    text_cache: TextCache,
    progress_total: usize,
    progress_interns: Vec<usize>,

    canvas: Pixmap,
    clear_buffer: Vec<u8>,
    dirty_regions: Vec<Rect>,
    first_frame: bool,

    component_frames: HashMap<&'static str, FrameLog>,
}

impl SkiaRenderer {
    pub fn new(
        width: u32,
        height: u32,
        font: FontVec,
        colors: Colors,
        max_trials: usize,
    ) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate a {width}x{height} canvas"))?;
        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            colors,
            text_cache: TextCache::new(font),
            progress_total: max_trials,
            progress_interns: Self::intern_progress_labels(max_trials),
            canvas,
            clear_buffer: solid_buffer(width, height, colors.background),
            dirty_regions: Vec::with_capacity(16),
            first_frame: true,
            component_frames: RENDER_STAGES
                .iter()
                .map(|&k| (k, FrameLog::new(COMPONENT_SAMPLES)))
                .collect(),
        };
        renderer.canvas.data_mut().copy_from_slice(&renderer.clear_buffer);
        Ok(renderer)
    }

    /// Rasterized label variants held by the glyph cache.
    pub fn cached_texts(&self) -> usize {
        self.text_cache.len()
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width, new_height)
            .with_context(|| format!("cannot allocate a {new_width}x{new_height} canvas"))?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        self.clear_buffer = solid_buffer(new_width, new_height, self.colors.background);
        self.canvas.data_mut().copy_from_slice(&self.clear_buffer);
        self.dirty_regions.clear();
        self.first_frame = true;
        Ok(())
    }

    /// Timing summary of one render stage, one of [`RENDER_STAGES`].
    pub fn component_summary(&self, name: &str) -> Option<FrameSummary> {
        self.component_frames.get(name).map(FrameLog::summary)
    }

    /// Progress labels for a session are known up front.
    fn intern_progress_labels(total: usize) -> Vec<usize> {
        (1..=total)
            .map(|current| intern_text(&format!("Trial: {current}/{total}")))
            .collect()
    }

    fn progress_intern(&self, current: usize, total: usize) -> usize {
        if total == self.progress_total {
            if let Some(id) = current.checked_sub(1).and_then(|i| self.progress_interns.get(i)) {
                return *id;
            }
        }
        intern_text(&format!("Trial: {current}/{total}"))
    }

    fn clear_regions(&mut self, dirty: &[Rect]) {
        let stride = self.width as usize * 4;
        let canvas_data = self.canvas.data_mut();
        for rect in dirty {
            let Some((x0, y0, x1, y1)) = pixel_span(rect, self.width, self.height) else {
                continue;
            };
            let row_len = (x1 - x0) * 4;
            for y in y0..y1 {
                let off = y * stride + x0 * 4;
                canvas_data[off..off + row_len]
                    .copy_from_slice(&self.clear_buffer[off..off + row_len]);
            }
        }
    }

    fn copy_dirty_region(&self, dirty: &Rect, frame_buffer: &mut [u8]) {
        let Some((x0, y0, x1, y1)) = pixel_span(dirty, self.width, self.height) else {
            return;
        };
        let bytes = (x1 - x0) * 4;
        let row_bytes = self.width as usize * 4;
        let canvas_data = self.canvas.data();
        for row in y0..y1 {
            let off = row * row_bytes + x0 * 4;
            frame_buffer[off..off + bytes].copy_from_slice(&canvas_data[off..off + bytes]);
        }
    }

    fn record_component(&mut self, name: &'static str, d: Duration) {
        if let Some(log) = self.component_frames.get_mut(name) {
            log.record(d);
        }
    }

    pub fn render_frame<P, T>(
        &mut self,
        view: &FrameView<'_, P>,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats>
    where
        P: Phase,
        T: Timer,
    {
        if frame_buffer.len() != self.clear_buffer.len() {
            bail!(
                "frame buffer holds {} bytes, canvas is {}x{}",
                frame_buffer.len(),
                self.width,
                self.height
            );
        }
        if self.first_frame {
            self.first_frame = false;
            self.canvas.data_mut().copy_from_slice(&self.clear_buffer);
            frame_buffer.copy_from_slice(&self.clear_buffer);
            self.dirty_regions.clear();
        }

        let old_dirty = std::mem::take(&mut self.dirty_regions);
        let t_clear = {
            let t = timer.now();
            self.clear_regions(&old_dirty);
            timer.elapsed(t)
        };

        let t_phase = {
            let t = timer.now();
            self.render_phase(view)?;
            timer.elapsed(t)
        };

        let mut present_rects = old_dirty;
        present_rects.extend_from_slice(&self.dirty_regions);
        coalesce_dirty(&mut present_rects);

        let t_copy = {
            let t = timer.now();
            for rect in &present_rects {
                self.copy_dirty_region(rect, frame_buffer);
            }
            timer.elapsed(t)
        };

        let total = t_clear + t_phase + t_copy;
        self.record_component("phase", t_phase);
        self.record_component("clear", t_clear);
        self.record_component("copy", t_copy);
        timer.record_frame(total);

        Ok(FrameStats {
            clear: t_clear,
            phase: t_phase,
            copy: t_copy,
            total,
            dirty_count: self.dirty_regions.len(),
        })
    }

    fn blit_pixmap(&mut self, pm: &Pixmap, origin: (i32, i32)) {
        let (w, h) = (pm.width() as i32, pm.height() as i32);
        let (cw, ch) = (self.width as i32, self.height as i32);
        let (x, y) = origin;

        if x + w <= 0 || y + h <= 0 || x >= cw || y >= ch {
            return;
        }

        let dst_x = x.max(0) as usize;
        let dst_y = y.max(0) as usize;
        let src_x = (-x).max(0) as usize;
        let src_y = (-y).max(0) as usize;
        let copy_w = (w as usize - src_x).min(cw as usize - dst_x);
        let copy_h = (h as usize - src_y).min(ch as usize - dst_y);

        let src_data = pm.data();
        let src_row_bytes = pm.width() as usize * 4;
        let dst_row_bytes = self.width as usize * 4;
        let dst_data = self.canvas.data_mut();

        let fully_opaque = (0..copy_h).all(|row| {
            let start = (src_y + row) * src_row_bytes + src_x * 4;
            src_data[start..start + copy_w * 4]
                .chunks_exact(4)
                .all(|px| px[3] == 255)
        });

        for row in 0..copy_h {
            let src_start = (src_y + row) * src_row_bytes + src_x * 4;
            let dst_start = (dst_y + row) * dst_row_bytes + dst_x * 4;
            let src_row = &src_data[src_start..src_start + copy_w * 4];
            let dst_row = &mut dst_data[dst_start..dst_start + copy_w * 4];
            if fully_opaque {
                dst_row.copy_from_slice(src_row);
            } else {
                for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                    blend_pixel(d, [s[0], s[1], s[2], s[3]]);
                }
            }
        }

        if let Some(rect) =
            Rect::from_xywh(dst_x as f32, dst_y as f32, copy_w as f32, copy_h as f32)
        {
            self.dirty_regions.push(rect);
        }
    }
}

impl Renderer for SkiaRenderer {
    fn blit_text(&mut self, intern_id: usize, style: TextStyle, pos: (f32, f32), anchor: Anchor) {
        let Some(atom) = get_text(intern_id) else {
            return;
        };
        let Some(pm) = self.text_cache.get_or_render(atom, style) else {
            return;
        };
        let origin = anchor_origin(anchor, pos, (pm.width(), pm.height()));
        self.blit_pixmap(&pm, origin);
    }
}

impl<P> PhaseRenderer<P> for SkiaRenderer
where
    P: Phase,
{
    fn render_phase(&mut self, view: &FrameView<'_, P>) -> Result<()> {
        let fg = self.colors.foreground;
        let phase = view.phase;

        if phase.is_awaiting_start() {
            let style = TextStyle {
                size_px: INSTRUCTION_PX,
                color: fg,
            };
            let x = self.width as f32 * 0.1;
            let mut y = self.height as f32 / 3.0;
            for line in view.instructions {
                self.blit_text(intern_text(line), style, (x, y), Anchor::TopLeft);
                y += INSTRUCTION_PX * 1.5;
            }
        } else if phase.shows_stimulus() {
            if let Some(stimulus) = &view.stimulus {
                let style = TextStyle {
                    size_px: STIMULUS_PX,
                    color: stimulus.ink.unwrap_or(fg),
                };
                self.blit_text(intern_text(&stimulus.label), style, self.center, Anchor::Center);
            }
            if let Some((current, total)) = view.progress {
                let style = TextStyle {
                    size_px: PROGRESS_PX,
                    color: fg,
                };
                let id = self.progress_intern(current, total);
                self.blit_text(id, style, PROGRESS_POS, Anchor::TopLeft);
            }
        } else if let Some(banner) = phase.banner() {
            let style = TextStyle {
                size_px: BANNER_PX,
                color: fg,
            };
            self.blit_text(intern_text(banner), style, self.center, Anchor::Center);
        }
        Ok(())
    }
}
