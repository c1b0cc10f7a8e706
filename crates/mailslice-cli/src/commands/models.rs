//! Models command - locate, install and check OCR model files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use mailslice_core::models::config::ModelConfig;

use super::{default_model_dir, load_config, resolve_model_dir};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status(DirArgs),

    /// Copy model files from a directory into the default model directory
    Install(InstallArgs),

    /// Remove model files from the default model directory
    Clean,

    /// Show the model directory that would be used
    Path(DirArgs),
}

#[derive(Args)]
struct DirArgs {
    /// Model directory to inspect instead of the resolved one
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Args)]
struct InstallArgs {
    /// Directory holding the detection, recognition and dictionary files
    #[arg(required = true)]
    from: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::Status(dir) => {
            let model_dir = resolve_model_dir(dir.model_dir.as_deref(), &config);
            check_status(&model_dir, &config.models)
        }
        ModelsCommand::Install(install) => install_models(install, &config.models),
        ModelsCommand::Clean => clean_models(&config.models),
        ModelsCommand::Path(dir) => {
            let model_dir = resolve_model_dir(dir.model_dir.as_deref(), &config);
            println!("{}", model_dir.display());
            Ok(())
        }
    }
}

fn file_names(models: &ModelConfig) -> [&str; 3] {
    [
        models.detection_model.as_str(),
        models.recognition_model.as_str(),
        models.dictionary.as_str(),
    ]
}

fn check_status(model_dir: &Path, models: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("Directory: {}", style(model_dir.display()).cyan());
    println!();

    let mut total_size: u64 = 0;

    for name in file_names(models) {
        let path = model_dir.join(name);
        let (status, size_str) = if path.exists() {
            let size = fs::metadata(&path)?.len();
            total_size += size;
            if size > 0 {
                (style("✓").green(), format_size(size))
            } else {
                (style("⚠").yellow(), "empty".to_string())
            }
        } else {
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, name, size_str);
    }

    println!();
    if models.present_in(model_dir) {
        println!(
            "{} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "{} Run 'mailslice models install <DIR>' or pass --model-dir",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn install_models(args: InstallArgs, models: &ModelConfig) -> anyhow::Result<()> {
    if !models.present_in(&args.from) {
        anyhow::bail!(
            "{} does not contain {}",
            args.from.display(),
            file_names(models).join(", ")
        );
    }

    let target = default_model_dir();
    fs::create_dir_all(&target)?;

    for name in file_names(models) {
        let destination = target.join(name);
        if destination.exists() && !args.force {
            println!(
                "  {} {} already installed (use --force to overwrite)",
                style("ℹ").blue(),
                name
            );
            continue;
        }
        let size = fs::copy(args.from.join(name), &destination)?;
        println!(
            "  {} Installed {} ({})",
            style("✓").green(),
            name,
            format_size(size)
        );
    }

    println!();
    println!(
        "{} Models available at {}",
        style("✓").green(),
        target.display()
    );
    Ok(())
}

fn clean_models(models: &ModelConfig) -> anyhow::Result<()> {
    let model_dir = default_model_dir();
    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for name in file_names(models) {
        let path = model_dir.join(name);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), name);
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
        assert_eq!(format_size(2_500), "2.5KB");
        assert_eq!(format_size(10_400_000), "10.4MB");
    }
}
