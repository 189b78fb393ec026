use clap::{Parser, Subcommand};
use sheetbridge::api::server::DEFAULT_MAX_UPLOAD_BYTES;
use sheetbridge::api::ApiConfig;
use sheetbridge::cli::{self, OutputFormat};
use sheetbridge::core::Orientation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Spreadsheet region extraction and document conversion")]
#[command(long_about = "SheetBridge - spreadsheet and document conversions

COMMANDS:
  sheets    - List the sheets of a workbook
  extract   - Extract a region of a sheet as JSON or CSV
  from-csv  - Convert a CSV file to .xlsx
  docx      - Extract the text of a Word document
  serve     - Start the HTTP API server

EXAMPLES:
  sheetbridge sheets book.xlsx
  sheetbridge extract book.xlsx --range A1:C1              # rows grow downward
  sheetbridge extract book.xlsx --range A1:A3 --orientation landscape --format csv
  sheetbridge from-csv orders.csv                         # writes orders.xlsx
  sheetbridge serve --port 3000")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Path to the .xlsx file
        file: PathBuf,
    },

    #[command(long_about = "Extract a rectangular region of a worksheet.

The range names the header band (e.g. A1:C1). In portrait mode the band is a
single row and data rows are read downward until the first blank row. In
landscape mode the band is a single column and data columns are read to the
right until the first blank column.")]
    /// Extract a region of a sheet as JSON or CSV
    Extract {
        /// Path to the .xlsx file
        file: PathBuf,

        /// Range expression, e.g. A1:C1
        #[arg(short, long)]
        range: String,

        /// Sheet name (defaults to the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Scan orientation: portrait or landscape
        #[arg(long)]
        orientation: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a CSV file to .xlsx
    FromCsv {
        /// Path to the .csv file
        input: PathBuf,

        /// Output file (defaults to the input name with .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the text of a Word document
    Docx {
        /// Path to the .docx file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBRIDGE_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "SHEETBRIDGE_PORT")]
        port: u16,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "SHEETBRIDGE_MAX_UPLOAD_BYTES")]
        max_upload_bytes: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { file } => cli::sheets(file)?,

        Commands::Extract {
            file,
            range,
            sheet,
            orientation,
            format,
            output,
        } => {
            let orientation = Orientation::from_param(orientation.as_deref())?;
            cli::extract(file, range, sheet, orientation, format, output)?
        }

        Commands::FromCsv { input, output } => cli::from_csv(input, output)?,

        Commands::Docx { input, output } => cli::docx(input, output)?,

        Commands::Serve {
            host,
            port,
            max_upload_bytes,
        } => cli::serve(ApiConfig {
            host,
            port,
            max_upload_bytes,
        })?,
    }

    Ok(())
}
