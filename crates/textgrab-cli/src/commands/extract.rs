//! Extract command - OCR one image of a folder into a text file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use textgrab_core::pipeline::{BaseNameMode, ListingOrder};
use textgrab_core::{
    Error, ExtractionRequest, ImageTextExtractor, Language, LanguageSet, Outcome, PureOcrEngine,
    TextgrabConfig,
};

use super::config::load_config;
use super::models::resolve_model_dir;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Folder containing the images
    #[arg(required = true)]
    folder: PathBuf,

    /// 1-based position of the image in the folder listing
    #[arg(short = 'n', long)]
    number: Option<usize>,

    /// Recognition language
    #[arg(short, long, value_enum)]
    language: Option<LanguageArg>,

    /// Recognize English and Russian together
    #[arg(long)]
    multilingual: bool,

    /// Minimum confidence (0.0 - 1.0) for a line to be kept
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Merge neighbouring lines into paragraphs
    #[arg(long)]
    paragraph: bool,

    /// How folder entries are ordered before counting
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// How the output file name is derived from the image name
    #[arg(long, value_enum)]
    base_name: Option<BaseNameArg>,

    /// Directory the text file is written to (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Also print the extracted lines
    #[arg(long)]
    print: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LanguageArg {
    /// English
    En,
    /// Russian
    Ru,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::En,
            LanguageArg::Ru => Language::Ru,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    /// Order returned by the filesystem
    Filesystem,
    /// Sorted by file name
    Alphabetical,
}

impl From<OrderArg> for ListingOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Filesystem => ListingOrder::Filesystem,
            OrderArg::Alphabetical => ListingOrder::Alphabetical,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BaseNameArg {
    /// Cut the file name at its first dot
    FirstDot,
    /// Remove only the last extension
    StripExtension,
}

impl From<BaseNameArg> for BaseNameMode {
    fn from(arg: BaseNameArg) -> Self {
        match arg {
            BaseNameArg::FirstDot => BaseNameMode::FirstDot,
            BaseNameArg::StripExtension => BaseNameMode::StripExtension,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let request = build_request(&args, &config);
    let languages = request.languages();

    info!(
        "Extracting entry {} of {} ({})",
        request.image_number(),
        request.folder().display(),
        languages
    );

    let extractor = ImageTextExtractor::new(request)?;
    let model_dir = resolve_model_dir(args.model_dir.clone(), &config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Locating image...");

    let result = extractor.run_with(|| {
        pb.set_message("Loading OCR models...");
        let missing: Vec<String> =
            PureOcrEngine::required_files(&config.models.detection_model, languages)
                .into_iter()
                .filter(|file| !model_dir.join(file).exists())
                .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "OCR models not found at {} (missing: {}).\n\n\
                 Run 'textgrab models download -s {}' to download them.",
                model_dir.display(),
                missing.join(", "),
                languages.script()
            )));
        }

        debug!("Using models from {}", model_dir.display());
        let engine = PureOcrEngine::from_dir(
            &model_dir,
            &config.models.detection_model,
            languages,
            &config.ocr,
        )?;

        info!(
            "Recognizing with the {} model ({})",
            engine.script(),
            engine.languages()
        );
        pb.set_message(format!("Recognizing text ({})...", engine.languages()));
        Ok(engine)
    });

    pb.finish_and_clear();
    let result = result?;

    match result.outcome {
        Outcome::Extracted => println!(
            "{} {} line(s) written to {}",
            style("✓").green(),
            result.lines.len(),
            result.output.display()
        ),
        Outcome::ImageNotFound => println!(
            "{} No entry {} in {}, placeholder written to {}",
            style("⚠").yellow(),
            extractor.request().image_number(),
            extractor.request().folder().display(),
            result.output.display()
        ),
        Outcome::NoDetections => println!(
            "{} No text detected, placeholder written to {}",
            style("⚠").yellow(),
            result.output.display()
        ),
        Outcome::BelowThreshold => println!(
            "{} {} detection(s) below threshold {}, placeholder written to {}",
            style("⚠").yellow(),
            result.detections,
            extractor.request().threshold(),
            result.output.display()
        ),
    }

    if args.print {
        for line in &result.lines {
            println!("{}", line);
        }
    }

    debug!("Total processing time: {}ms", result.processing_time_ms);

    Ok(())
}

/// Merge command line flags over the loaded configuration.
fn build_request(args: &ExtractArgs, config: &TextgrabConfig) -> ExtractionRequest {
    let mut request = ExtractionRequest::from_config(&args.folder, config);

    if let Some(number) = args.number {
        request = request.with_image_number(number);
    }
    if args.language.is_some() || args.multilingual {
        let language = args.language.map(Language::from).unwrap_or(config.ocr.language);
        let multilingual = args.multilingual || (args.language.is_none() && config.ocr.multilingual);
        request = request.with_languages(LanguageSet::new(language, multilingual));
    }
    if let Some(threshold) = args.threshold {
        request = request.with_threshold(threshold);
    }
    if args.paragraph {
        request = request.with_paragraph(true);
    }
    if let Some(order) = args.order {
        request = request.with_order(order.into());
    }
    if let Some(base_name) = args.base_name {
        request = request.with_base_name(base_name.into());
    }
    if let Some(output_dir) = &args.output_dir {
        request = request.with_output_dir(output_dir);
    }

    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ExtractArgs,
    }

    fn parse(argv: &[&str]) -> ExtractArgs {
        TestCli::parse_from(std::iter::once("textgrab").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = TextgrabConfig::default();
        config.input.image_number = 6;
        config.ocr.multilingual = true;

        let request = build_request(&parse(&["imgs"]), &config);

        assert_eq!(request.image_number(), 6);
        assert_eq!(request.languages(), LanguageSet::Multilingual);
        assert_eq!(request.threshold(), 0.25);
        assert!(!request.paragraph());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = TextgrabConfig::default();
        config.ocr.multilingual = true;

        let request = build_request(
            &parse(&[
                "imgs",
                "-n",
                "2",
                "-l",
                "ru",
                "-t",
                "0.5",
                "--order",
                "alphabetical",
                "--paragraph",
            ]),
            &config,
        );

        assert_eq!(request.image_number(), 2);
        assert_eq!(request.languages(), LanguageSet::Single(Language::Ru));
        assert_eq!(request.threshold(), 0.5);
        assert_eq!(request.order(), ListingOrder::Alphabetical);
        assert!(request.paragraph());
    }

    #[test]
    fn test_multilingual_flag() {
        let request = build_request(&parse(&["imgs", "--multilingual"]), &TextgrabConfig::default());
        assert_eq!(request.languages(), LanguageSet::Multilingual);
    }
}
