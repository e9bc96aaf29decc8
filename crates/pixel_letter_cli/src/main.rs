use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use pixel_letter::{
    ansi_rows, CellShape, CellStyle, DisplayLayout, FontCatalog, GridSampler, GridSize,
    PixelRenderer, Preset, RenderOutput, RenderRequest, Rgb, TextBaseline, HEBREW_ALPHABET,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render letters and words as pixel grids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the grid to the terminal
    Preview(PreviewArgs),
    /// Render the grid and save it as pixel-letter-<text>.png
    Export(ExportArgs),
    /// Export every letter of the Hebrew alphabet
    Alphabet(AlphabetArgs),
    /// List the font families that can be requested with --font
    Fonts(FontArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Letter or word to render
    text: String,
    /// Print `#` and `.` instead of colored blocks
    #[arg(long, default_value_t = false)]
    plain: bool,
    /// Print the grid and its settings as JSON
    #[arg(long, default_value_t = false, conflicts_with = "plain")]
    json: bool,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Letter or word to render
    text: String,
    /// Directory the PNG is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct AlphabetArgs {
    /// Directory the PNGs are written to
    #[arg(short, long)]
    out_dir: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct FontArgs {
    #[command(flatten)]
    fonts: FontSettings,
}

#[derive(Parser, Debug, Clone)]
struct FontSettings {
    /// Additional directory to search for font files (repeatable)
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
    /// Skip the platform font directories and only use the bundled face plus --font-dir
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// Canvas, glyph size and grid preset
    #[arg(long, value_enum, default_value = "letter")]
    preset: PresetChoice,
    /// Font family list, most preferred first (defaults to the preset's list)
    #[arg(long)]
    font: Option<String>,
    /// Grid rows (defaults to the preset's)
    #[arg(long)]
    rows: Option<u32>,
    /// Grid columns (defaults to the preset's)
    #[arg(long)]
    cols: Option<u32>,
    /// Font size in pixels on the offscreen canvas
    #[arg(long, value_parser = parse_finite)]
    glyph_size: Option<f32>,
    /// Vertical anchor of the text
    #[arg(long, value_enum, default_value = "middle")]
    baseline: BaselineChoice,
    /// Shift of the anchor line in pixels
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    baseline_offset: Option<f32>,
    /// Coverage a cell must exceed to become active (0.0 - 1.0)
    #[arg(long, default_value_t = 0.0, value_parser = parse_threshold)]
    threshold: f32,
    /// Color of active cells
    #[arg(long, default_value = "#D946EF")]
    active_color: Rgb,
    /// Color of inactive cells
    #[arg(long, default_value = "white")]
    background_color: Rgb,
    /// Cell shape
    #[arg(long, value_enum, default_value = "square")]
    shape: ShapeChoice,
    #[command(flatten)]
    fonts: FontSettings,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PresetChoice {
    Letter,
    Word,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BaselineChoice {
    Middle,
    Top,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ShapeChoice {
    Square,
    Circle,
}

#[derive(Serialize)]
struct GridDocument<'a> {
    #[serde(flatten)]
    output: &'a RenderOutput,
    rows: Vec<Vec<bool>>,
    threshold: f32,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview(args),
        Commands::Export(args) => export(args),
        Commands::Alphabet(args) => alphabet(args),
        Commands::Fonts(args) => fonts(args),
    }
}

fn preview(args: PreviewArgs) -> Result<()> {
    let renderer = args.settings.to_renderer();
    let output = render(&renderer, &args.settings, &args.text)?;

    if args.json {
        let document = GridDocument {
            output: &output,
            rows: output.grid.rows().map(|row| row.to_vec()).collect(),
            threshold: renderer.sampler().coverage_threshold,
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if args.plain {
        for row in output.grid.text_rows("#", ".") {
            println!("{}", row);
        }
    } else {
        for row in ansi_rows(&output.grid, &output.style) {
            println!("{}", row);
        }
    }

    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let renderer = args.settings.to_renderer();
    let output = render(&renderer, &args.settings, &args.text)?;
    let path = output
        .export_png(&args.settings.layout(), &args.out_dir)
        .with_context(|| format!("failed to export {:?}", args.text))?;
    println!("{}", path.display());
    Ok(())
}

fn alphabet(args: AlphabetArgs) -> Result<()> {
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let renderer = args.settings.to_renderer();
    let layout = args.settings.layout();
    let progress = ProgressBar::new(HEBREW_ALPHABET.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    for letter in HEBREW_ALPHABET {
        let text = letter.to_string();
        progress.set_message(text.clone());
        let output = render(&renderer, &args.settings, &text)?;
        output
            .export_png(&layout, &args.out_dir)
            .with_context(|| format!("failed to export {:?}", text))?;
        progress.inc(1);
    }

    progress.finish_with_message(format!("letters written to {:?}", args.out_dir));
    Ok(())
}

fn fonts(args: FontArgs) -> Result<()> {
    for family in args.fonts.to_catalog().families() {
        println!("{}", family);
    }
    Ok(())
}

fn render(renderer: &PixelRenderer, settings: &RenderSettings, text: &str) -> Result<RenderOutput> {
    let request = settings.to_request(text);
    renderer
        .render(&request, settings.grid_size(), settings.to_style())
        .with_context(|| format!("failed to render {:?}", text))
}

fn parse_finite(value: &str) -> Result<f32, String> {
    let number: f32 = value.parse().map_err(|err| format!("{err}"))?;
    if !number.is_finite() {
        return Err(format!("{value} is not a finite number"));
    }
    Ok(number)
}

fn parse_threshold(value: &str) -> Result<f32, String> {
    let threshold = parse_finite(value)?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("{value} is not between 0.0 and 1.0"));
    }
    Ok(threshold)
}

impl FontSettings {
    fn to_catalog(&self) -> FontCatalog {
        let mut catalog =
            if self.no_system_fonts { FontCatalog::embedded() } else { FontCatalog::system() };
        for dir in &self.font_dirs {
            catalog.add_dir(dir);
        }
        info!("font catalog holds {} families", catalog.families().len());
        catalog
    }
}

impl RenderSettings {
    fn preset(&self) -> Preset {
        match self.preset {
            PresetChoice::Letter => Preset::Letter,
            PresetChoice::Word => Preset::Word,
        }
    }

    fn grid_size(&self) -> GridSize {
        let default = self.preset().grid_size();
        GridSize::new(self.rows.unwrap_or(default.rows), self.cols.unwrap_or(default.cols))
    }

    fn layout(&self) -> DisplayLayout {
        DisplayLayout::new(self.grid_size(), self.preset().display_width())
    }

    fn to_renderer(&self) -> PixelRenderer {
        let sampler = GridSampler::with_threshold(self.threshold);
        PixelRenderer::new(self.fonts.to_catalog()).with_sampler(sampler)
    }

    fn to_request(&self, text: &str) -> RenderRequest {
        let mut request = self.preset().request(text);
        if let Some(font) = &self.font {
            request.font_family = font.clone();
        }
        if let Some(size) = self.glyph_size {
            request.glyph_size_px = size.max(1.0);
        }
        request.text_baseline = self.baseline.to_baseline();
        if let Some(offset) = self.baseline_offset {
            request.baseline_offset_px = offset;
        }
        request
    }

    fn to_style(&self) -> CellStyle {
        CellStyle {
            active: self.active_color,
            background: self.background_color,
            shape: self.shape.to_shape(),
            ..CellStyle::default()
        }
    }
}

impl BaselineChoice {
    fn to_baseline(self) -> TextBaseline {
        match self {
            BaselineChoice::Middle => TextBaseline::Middle,
            BaselineChoice::Top => TextBaseline::Top,
        }
    }
}

impl ShapeChoice {
    fn to_shape(self) -> CellShape {
        match self {
            ShapeChoice::Square => CellShape::Square,
            ShapeChoice::Circle => CellShape::Circle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn word_preset_with_overrides() {
        let cli = Cli::parse_from([
            "pixel-letter",
            "preview",
            "שלום",
            "--preset",
            "word",
            "--rows",
            "12",
            "--baseline",
            "top",
            "--baseline-offset",
            "-40",
            "--shape",
            "circle",
            "--active-color",
            "#00ff00",
            "--no-system-fonts",
        ]);
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };

        assert_eq!(args.settings.grid_size(), GridSize::new(12, 30));
        let request = args.settings.to_request(&args.text);
        assert_eq!(request.text_baseline, TextBaseline::Top);
        assert_eq!(request.baseline_offset_px, -40.0);
        assert_eq!(request.canvas_width, 720);
        let style = args.settings.to_style();
        assert_eq!(style.shape, CellShape::Circle);
        assert_eq!(style.active, Rgb::new(0, 255, 0));
        assert_eq!(style.background, Rgb::WHITE);
    }

    #[test]
    fn thresholds_must_be_fractions() {
        for bad in ["NaN", "inf", "-0.5", "1.5", "half"] {
            let result =
                Cli::try_parse_from(["pixel-letter", "preview", "A", "--threshold", bad]);
            assert!(result.is_err(), "{bad} was accepted");
        }

        let cli = Cli::parse_from(["pixel-letter", "preview", "A", "--threshold", "0.5"]);
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.settings.threshold, 0.5);
        assert_eq!(args.settings.to_renderer().sampler().coverage_threshold, 0.5);
    }

    #[test]
    fn sizes_and_offsets_must_be_finite() {
        for (flag, bad) in [("--baseline-offset", "NaN"), ("--glyph-size", "inf")] {
            let result = Cli::try_parse_from(["pixel-letter", "preview", "A", flag, bad]);
            assert!(result.is_err(), "{flag} {bad} was accepted");
        }
    }

    #[test]
    fn bad_colors_are_rejected() {
        let result =
            Cli::try_parse_from(["pixel-letter", "preview", "A", "--active-color", "#12"]);
        assert!(result.is_err());
    }
}
