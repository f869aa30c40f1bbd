//! Spanflow CLI
//!
//! Lays out a text file (plus optional images) and prints the resulting
//! lines, dumps them as JSON, or renders them to a PNG.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to see layout
//! passes, and build with `--features layout-trace` for per-line tracing.

mod font_metrics;
mod renderer;

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use spanflow_common::image::LoadedImage;
use spanflow_layout::{
    Alignment, ApproximateMetrics, ColorValue, FloatSide, ImageId, LayoutResult, Point, Rect,
    SegmentKind, Size, SpanLayout,
};

use font_metrics::{FONT_SEARCH_PATHS, FontRegistry, FontdueMetrics, load_font_from_paths};
use renderer::Renderer;

/// Spanflow - lay out text with inline and floating images
#[derive(Parser, Debug)]
#[command(name = "spanflow")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the lines of a file wrapped at 320px
    spanflow notes.txt --width 320

    # Justify inline text and dump the layout as JSON
    spanflow --text 'the quick brown fox' --width 80 --align justify --json

    # Float an image left of the text and render a PNG
    spanflow notes.txt --width 400 --image logo.png:left --png out.png

    # Cut the rendering at 60px and end long lines with an ellipsis
    spanflow notes.txt --width 400 --png out.png --clip-height 60

    # Where do these points land?
    spanflow --text 'hello world' --hit 10,5 --hit 500,5
"#)]
struct Cli {
    /// Path to a UTF-8 text file to lay out
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Lay out this string instead of a file
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Maximum line width in pixels (unbounded when omitted)
    #[arg(long, value_name = "PX")]
    width: Option<f32>,

    /// Horizontal alignment: left, right, center or justify
    #[arg(long, default_value = "left")]
    align: Alignment,

    /// Font size in pixels
    #[arg(long, value_name = "PX", default_value = "16")]
    font_size: f32,

    /// Font file to measure and render with (default: first system font found)
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Fail on characters the font has no glyph for
    #[arg(long)]
    strict_glyphs: bool,

    /// Text color as a hex value or a color name
    #[arg(long, value_name = "COLOR", default_value = "black", value_parser = parse_color)]
    color: ColorValue,

    /// Image to add; `:left` or `:right` floats it, otherwise it follows the text
    #[arg(long = "image", value_name = "PATH[:left|right]")]
    images: Vec<ImageArg>,

    /// Select a byte range of the text, e.g. `3:9`
    #[arg(long, value_name = "START:END", value_parser = parse_range)]
    select: Option<Range<usize>>,

    /// Show the caret at this byte offset
    #[arg(long, value_name = "OFFSET")]
    cursor: Option<usize>,

    /// Hit-test a point, e.g. `12,5` (repeatable)
    #[arg(long = "hit", value_name = "X,Y", value_parser = parse_point)]
    hits: Vec<Point>,

    /// Print the layout result as JSON instead of the line listing
    #[arg(long)]
    json: bool,

    /// Render the layout to this PNG file
    #[arg(long, value_name = "FILE")]
    png: Option<PathBuf>,

    /// Clip the rendering to this height and end cut lines with an ellipsis
    #[arg(long, value_name = "PX", requires = "png")]
    clip_height: Option<f32>,
}

/// An `--image` argument: a path and an optional float side.
#[derive(Debug, Clone, PartialEq)]
struct ImageArg {
    path: PathBuf,
    float: Option<FloatSide>,
}

impl FromStr for ImageArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err("image path is empty".to_string());
        }
        // Only a recognized side after the last ':' is a float suffix, so
        // paths containing ':' still work.
        if let Some((path, side)) = value.rsplit_once(':')
            && let Ok(side) = FloatSide::from_str(side)
        {
            return Ok(Self {
                path: PathBuf::from(path),
                float: Some(side),
            });
        }
        Ok(Self {
            path: PathBuf::from(value),
            float: None,
        })
    }
}

fn parse_color(value: &str) -> Result<ColorValue, String> {
    ColorValue::parse(value).ok_or_else(|| format!("unrecognized color '{value}'"))
}

fn parse_range(value: &str) -> Result<Range<usize>, String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{value}'"))?;
    let start = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;
    Ok(start..end)
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let text = load_text(&cli)?;
    let images = cli
        .images
        .iter()
        .map(|arg| Ok((arg.clone(), load_image(&arg.path)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let font = match &cli.font {
        Some(path) => Some(
            load_font_from_paths(&[path])
                .with_context(|| format!("could not load font '{}'", path.display()))?,
        ),
        None => load_font_from_paths(FONT_SEARCH_PATHS),
    };

    if let Some(font) = font {
        run(&cli, &text, FontdueMetrics::new(font, cli.strict_glyphs), images)
    } else {
        log::warn!("no system font found, falling back to approximate metrics");
        run(&cli, &text, ApproximateMetrics::new(), images)
    }
}

/// Read the text to lay out from `--text` or the file argument.
fn load_text(cli: &Cli) -> anyhow::Result<String> {
    if let Some(ref text) = cli.text {
        Ok(text.clone())
    } else if let Some(ref path) = cli.path {
        std::fs::read_to_string(path)
            .with_context(|| format!("could not read '{}'", path.display()))
    } else {
        anyhow::bail!("nothing to lay out: pass a FILE or --text")
    }
}

/// Decode an image file into RGBA pixels.
fn load_image(path: &Path) -> anyhow::Result<LoadedImage> {
    let rgba = image::open(path)
        .with_context(|| format!("could not decode image '{}'", path.display()))?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    LoadedImage::new(w, h, rgba.into_raw())
        .with_context(|| format!("image '{}' has an invalid pixel buffer", path.display()))
}

/// Build the block, lay it out and produce the requested outputs.
fn run<M: FontRegistry>(
    cli: &Cli,
    text: &str,
    mut env: M,
    images: Vec<(ImageArg, LoadedImage)>,
) -> anyhow::Result<()> {
    let font = env.add_font(cli.font_size);

    let mut decoded = HashMap::new();
    let mut placed: Vec<(ImageId, Option<FloatSide>)> = Vec::new();
    for (arg, image) in images {
        let (width, height) = image.dimensions_f32();
        let handle = env.add_image(Size::new(width, height));
        let _ = decoded.insert(handle, image);
        placed.push((handle, arg.float));
    }

    let mut block = SpanLayout::new(env);
    block.set_align(cli.align);

    // Floats go first so the text flows beside them from the top; inline
    // images follow the text. Text has id 0, images are numbered from 1.
    let tagged: Vec<_> = placed.into_iter().zip(1..).collect();
    for &((image, side), id) in &tagged {
        if let Some(side) = side {
            block.add_floating_image(image, side, id);
        }
    }
    block.add_text(text, font, cli.color, 0);
    for &((image, side), id) in &tagged {
        if side.is_none() {
            block.add_image(image, 0.0, id);
        }
    }

    if let Some(ref range) = cli.select {
        block.set_selection_range(range.start, range.end);
    }
    if let Some(pos) = cli.cursor {
        block.set_cursor_pos(pos);
        block.show_cursor();
    }

    let max_width = cli.width.unwrap_or(f32::INFINITY);
    block.layout(max_width)?;

    let combined = block.combined_text().to_owned();
    let result = block.layout_result()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_lines(&combined, result);
    }

    for point in &cli.hits {
        let hit = block.hit_test(*point)?;
        println!(
            "{} ({}, {}) -> {} object={} offset={}",
            "hit".bold(),
            point.x,
            point.y,
            hit.kind.cyan(),
            hit.object_id,
            hit.offset
        );
    }

    if let Some(ref output) = cli.png {
        let size = block.size()?;
        let width = if max_width.is_finite() {
            max_width
        } else {
            size.width
        };
        let height = cli.clip_height.unwrap_or(size.height);

        let raster_font = block.env().raster_font().cloned();
        let font_sizes = HashMap::from([(font, cli.font_size)]);
        let mut renderer = Renderer::new(
            pixels(width),
            pixels(height),
            raster_font.as_ref(),
            font_sizes,
            decoded,
        );
        if cli.clip_height.is_some() {
            block.draw_layout_ellipsis(&mut renderer, Rect::new(0.0, 0.0, width, height))?;
        } else {
            block.draw_layout(&mut renderer)?;
        }
        renderer.save(output)?;
        println!("Image saved to: {}", output.display());
    }

    Ok(())
}

/// Whole pixels needed to cover `extent`, at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixels(extent: f32) -> u32 {
    extent.ceil().clamp(1.0, 16384.0) as u32
}

/// Print every line with its geometry and segments.
fn print_lines(text: &str, result: &LayoutResult) {
    println!(
        "{}",
        format!(
            "=== Layout ({:.1} x {:.1}, {} lines) ===",
            result.natural_width,
            result.height,
            result.lines.len()
        )
        .bold()
    );

    for float in &result.floats {
        let what = match float.kind {
            SegmentKind::Image { image } => format!("image {}", image.0),
            SegmentKind::Component { component } => format!("component {}", component.0),
            SegmentKind::Text { .. } => continue,
        };
        let r = float.rect;
        println!(
            "{}",
            format!(
                "float {} {what} at x={:.1} y={:.1} w={:.1} h={:.1}",
                float.side, r.x, r.y, r.width, r.height
            )
            .yellow()
        );
    }

    for (i, line) in result.lines.iter().enumerate() {
        let mut content = String::new();
        for segment in line.segments.iter().filter(|s| !s.collapsed) {
            match &segment.kind {
                SegmentKind::Text {
                    range, whitespace, ..
                } => {
                    let piece = &text[range.clone()];
                    if *whitespace {
                        let dots = "\u{b7}".repeat(piece.chars().count());
                        content.push_str(&dots.dimmed().to_string());
                    } else {
                        content.push_str(piece);
                    }
                }
                SegmentKind::Image { image } => {
                    content.push_str(&format!("[image {}]", image.0).cyan().to_string());
                }
                SegmentKind::Component { component } => {
                    content.push_str(&format!("[component {}]", component.0).magenta().to_string());
                }
            }
        }
        println!(
            "{} {} {}",
            format!("{i:>3}").bold(),
            format!(
                "top={:.1} h={:.1} w={:.1} band={:.1}+{:.1} {:?}",
                line.top, line.height, line.width, line.left, line.available, line.break_reason
            )
            .dimmed(),
            content
        );
    }
}
