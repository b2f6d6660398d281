//! Models command - download and manage OCR models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use textgrab_core::{Script, TextgrabConfig};

use super::config::load_config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List model files per script
    List,

    /// Download models
    Download(DownloadArgs),

    /// Check model status
    Status(StatusArgs),

    /// Remove downloaded models
    Clean(CleanArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptArg {
    /// Latin alphabet (English)
    Latin,
    /// Cyrillic alphabet (Russian, or English + Russian)
    Cyrillic,
}

impl From<ScriptArg> for Script {
    fn from(arg: ScriptArg) -> Self {
        match arg {
            ScriptArg::Latin => Script::Latin,
            ScriptArg::Cyrillic => Script::Cyrillic,
        }
    }
}

#[derive(Args)]
struct DownloadArgs {
    /// Script to download recognition models for
    #[arg(short, long, value_enum, default_value = "latin")]
    script: ScriptArg,

    /// Base URL model files are fetched from (default: models.download_url)
    #[arg(long)]
    url: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Check specific script only
    #[arg(short, long, value_enum)]
    script: Option<ScriptArg>,
}

#[derive(Args)]
struct CleanArgs {
    /// Clean specific script only
    #[arg(short, long, value_enum)]
    script: Option<ScriptArg>,

    /// Clean all models, including the shared detector
    #[arg(long)]
    all: bool,
}

/// A model file and what it is for.
struct ModelInfo {
    filename: String,
    description: &'static str,
}

/// Files needed to recognize `script`: the shared detector plus the
/// script's recognizer and dictionary.
fn script_models(script: Script, config: &TextgrabConfig) -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            filename: config.models.detection_model.clone(),
            description: "text detection (shared)",
        },
        ModelInfo {
            filename: script.recognition_model().to_string(),
            description: "text recognition",
        },
        ModelInfo {
            filename: script.dictionary().to_string(),
            description: "character dictionary",
        },
    ]
}

/// Per-user model directory.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("textgrab")
        .join("models")
}

/// Model directory from the command line, the config file, or the default.
pub fn resolve_model_dir(explicit: Option<PathBuf>, config: &TextgrabConfig) -> PathBuf {
    explicit
        .or_else(|| config.models.model_dir.clone())
        .unwrap_or_else(default_model_dir)
}

fn selected_scripts(script: Option<ScriptArg>) -> Vec<Script> {
    match script {
        Some(s) => vec![s.into()],
        None => Script::ALL.to_vec(),
    }
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::List => list_models(&config),
        ModelsCommand::Download(download_args) => download_models(download_args, &config).await,
        ModelsCommand::Status(status_args) => check_status(status_args.script, &config),
        ModelsCommand::Clean(clean_args) => clean_models(clean_args, &config),
    }
}

fn list_models(config: &TextgrabConfig) -> anyhow::Result<()> {
    println!("{}", style("Recognition Scripts").bold());
    println!();

    for script in Script::ALL {
        let languages = match script {
            Script::Latin => "en",
            Script::Cyrillic => "ru, en+ru",
        };

        println!(
            "{} {}",
            style(format!("▸ {}", script)).bold().cyan(),
            style(format!("- languages: {}", languages)).dim()
        );

        for model in script_models(script, config) {
            println!("    {:<20}  {}", model.filename, model.description);
        }
        println!();
    }

    println!("Commands:");
    println!("  textgrab models download -s latin       Download English models");
    println!("  textgrab models download -s cyrillic    Download Russian / multilingual models");

    Ok(())
}

async fn download_models(args: DownloadArgs, config: &TextgrabConfig) -> anyhow::Result<()> {
    let script: Script = args.script.into();

    let Some(base_url) = args.url.or_else(|| config.models.download_url.clone()) else {
        anyhow::bail!(
            "No download source configured.\n\n\
             Pass --url <BASE_URL> or run 'textgrab config set models.download_url <BASE_URL>'."
        );
    };

    let output_dir = resolve_model_dir(args.output, config);
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading {} models to {}",
        style("ℹ").blue(),
        style(script.to_string()).cyan().bold(),
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("textgrab-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for model in script_models(script, config) {
        let path = output_dir.join(&model.filename);

        if path.exists() && !args.force && fs::metadata(&path)?.len() > 0 {
            println!(
                "  {} {} (already exists, {})",
                style("✓").green(),
                model.filename,
                format_size(fs::metadata(&path)?.len())
            );
            skip_count += 1;
            continue;
        }

        let url = format!("{}/{}", base_url.trim_end_matches('/'), model.filename);

        let pb = multi_progress.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.clone());

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!(
            "{} {} models downloaded successfully!",
            style("✓").green().bold(),
            script
        );
        if skip_count > 0 {
            println!("   {} downloaded, {} already present", success_count, skip_count);
        }
    } else {
        println!("{} Download completed with errors", style("⚠").yellow().bold());
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: textgrab models download -s {} --force", script);
    }

    println!();
    print_status(script, &output_dir, config)?;

    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    // Stream into a temp file so an interrupted download never looks complete
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn check_status(script: Option<ScriptArg>, config: &TextgrabConfig) -> anyhow::Result<()> {
    let model_dir = resolve_model_dir(None, config);

    println!("{}", style("Model Status").bold());
    println!("Model directory: {}", model_dir.display());
    println!();

    for script in selected_scripts(script) {
        print_status(script, &model_dir, config)?;
    }

    Ok(())
}

fn print_status(script: Script, model_dir: &Path, config: &TextgrabConfig) -> anyhow::Result<()> {
    println!("{}", style(format!("▸ {}", script)).bold());

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in script_models(script, config) {
        let path = model_dir.join(&model.filename);
        let size = if path.exists() { fs::metadata(&path)?.len() } else { 0 };

        let (status, size_str) = if size > 0 {
            total_size += size;
            (style("✓").green(), format_size(size))
        } else if path.exists() {
            all_present = false;
            (style("⚠").yellow(), "empty".to_string())
        } else {
            all_present = false;
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, model.filename, size_str);
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'textgrab models download -s {}' to download",
            style("⚠").yellow(),
            script
        );
    }
    println!();

    Ok(())
}

fn clean_models(args: CleanArgs, config: &TextgrabConfig) -> anyhow::Result<()> {
    if !args.all && args.script.is_none() {
        println!(
            "{} Specify --all to remove all models or -s <script> for a specific script",
            style("ℹ").blue()
        );
        return Ok(());
    }

    let model_dir = resolve_model_dir(None, config);
    if !model_dir.exists() {
        println!("{} No model files to remove.", style("ℹ").blue());
        return Ok(());
    }

    let scripts = if args.all {
        Script::ALL.to_vec()
    } else {
        selected_scripts(args.script)
    };

    // The detector is shared between scripts; only --all removes it
    let mut files: Vec<String> = Vec::new();
    for script in scripts {
        files.push(script.recognition_model().to_string());
        files.push(script.dictionary().to_string());
    }
    if args.all {
        files.push(config.models.detection_model.clone());
    }

    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for filename in files {
        let path = model_dir.join(&filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), filename);
        }
    }

    // Leftovers from interrupted downloads
    if let Ok(entries) = fs::read_dir(&model_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tmp").unwrap_or(false) {
                let _ = fs::remove_file(&path);
            }
        }
    }

    if total_removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2_000), "2.0KB");
        assert_eq!(format_size(7_500_000), "7.5MB");
    }

    #[test]
    fn test_resolve_model_dir_precedence() {
        let mut config = TextgrabConfig::default();
        config.models.model_dir = Some(PathBuf::from("from-config"));

        assert_eq!(
            resolve_model_dir(Some(PathBuf::from("from-flag")), &config),
            PathBuf::from("from-flag")
        );
        assert_eq!(resolve_model_dir(None, &config), PathBuf::from("from-config"));
        assert_eq!(
            resolve_model_dir(None, &TextgrabConfig::default()),
            default_model_dir()
        );
    }

    #[test]
    fn test_script_models() {
        let files: Vec<String> = script_models(Script::Cyrillic, &TextgrabConfig::default())
            .into_iter()
            .map(|m| m.filename)
            .collect();
        assert_eq!(files, vec!["det.onnx", "cyrillic_rec.onnx", "cyrillic_dict.txt"]);
    }
}
