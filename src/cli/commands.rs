use crate::api::{run_api_server, ApiConfig};
use crate::core::{extract as extract_region, Orientation, RangeDescriptor};
use crate::docx::extract_text;
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{csv_to_xlsx, XlsxDocument};
use crate::output::{to_csv, JsonEnvelope};
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output encoding of an extracted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Fail unless the file has the given extension (case-insensitive)
fn require_extension(file: &Path, extension: &str) -> BridgeResult<()> {
    let matches = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if matches {
        Ok(())
    } else {
        Err(BridgeError::UnsupportedFile(format!(
            "Only *.{} files are supported.",
            extension
        )))
    }
}

/// Write to a file, or to stdout when no path is given
fn emit(output: Option<&Path>, content: &[u8]) -> BridgeResult<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{}", "✅ Done!".bold().green());
            println!("   Output: {}\n", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> BridgeResult<()> {
    require_extension(&file, "xlsx")?;
    let document = XlsxDocument::from_bytes(fs::read(&file)?)?;
    let entries = document.sheet_entries();

    println!("{}", "📊 SheetBridge - Sheets".bold().green());
    println!("   File: {}\n", file.display());
    for entry in &entries {
        println!("   {:>3}  {}", entry.index, entry.name.bright_blue());
    }
    println!("\n   Total: {}", entries.len());
    Ok(())
}

/// Execute the extract command
pub fn extract(
    file: PathBuf,
    range: String,
    sheet: Option<String>,
    orientation: Orientation,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> BridgeResult<()> {
    require_extension(&file, "xlsx")?;
    let mut document = XlsxDocument::from_bytes(fs::read(&file)?)?;
    let worksheet = document.worksheet(sheet.as_deref())?;
    let range = RangeDescriptor::parse(&range)?;
    let dataset = extract_region(&worksheet, &range, orientation)?;

    if output.is_some() {
        println!("{}", "📊 SheetBridge - Extract".bold().green());
        println!("   File:        {}", file.display());
        println!("   Sheet:       {}", worksheet.name().bright_blue());
        println!("   Range:       {} ({})", range, orientation);
        println!(
            "   Extracted:   {} rows × {} columns\n",
            dataset.row_count(),
            dataset.col_count()
        );
    }

    let content = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&JsonEnvelope::new(dataset))
                .map_err(|e| BridgeError::Internal(format!("Failed to encode JSON: {}", e)))?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => to_csv(&dataset),
    };
    emit(output.as_deref(), content.as_bytes())
}

/// Execute the from-csv command
pub fn from_csv(input: PathBuf, output: Option<PathBuf>) -> BridgeResult<()> {
    require_extension(&input, "csv")?;
    let sheet_name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    let output = output.unwrap_or_else(|| input.with_extension("xlsx"));

    println!("{}", "📊 SheetBridge - CSV to Excel".bold().green());
    println!("   Input:  {}", input.display());

    let workbook = csv_to_xlsx(&fs::read(&input)?, &sheet_name)?;
    emit(Some(&output), &workbook)
}

/// Execute the docx command
pub fn docx(input: PathBuf, output: Option<PathBuf>) -> BridgeResult<()> {
    require_extension(&input, "docx")?;
    let text = extract_text(&fs::read(&input)?)?;

    if output.is_some() {
        println!("{}", "📄 SheetBridge - Document Text".bold().green());
        println!("   Input:  {}", input.display());
    }
    emit(output.as_deref(), text.as_bytes())
}

/// Execute the serve command
pub fn serve(config: ApiConfig) -> BridgeResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime
        .block_on(run_api_server(config))
        .map_err(|e| BridgeError::Internal(e.to_string()))
}
