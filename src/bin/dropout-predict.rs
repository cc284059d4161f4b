//! Run the dropout predictor over a CSV file of student records.

use std::path::PathBuf;
use std::process::ExitCode;

use dropout_predictor::artifacts;
use dropout_predictor::config::{self, PredictorSettings};
use dropout_predictor::logging;
use dropout_predictor::pipeline::assemble::{Preview, ResultTable};
use dropout_predictor::pipeline::export::write_csv_file;
use dropout_predictor::pipeline::{Pipeline, PipelineError};
use dropout_predictor::table::csv_io::read_csv_path;

const EXIT_FAILURE: u8 = 1;
const EXIT_REJECTED: u8 = 2;

#[derive(Debug, Clone)]
struct CliOptions {
    input: PathBuf,
    model: Option<PathBuf>,
    scaler: Option<PathBuf>,
    out: Option<PathBuf>,
    preview: Option<usize>,
}

enum RunError {
    Rejected(String),
    Failed(String),
}

impl From<String> for RunError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

fn main() -> ExitCode {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Rejected(message)) => {
            eprintln!("{message}");
            ExitCode::from(EXIT_REJECTED)
        }
        Err(RunError::Failed(message)) => {
            eprintln!("{message}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run() -> Result<(), RunError> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let paths = resolve_paths(&options, &settings)?;
    let fitted = artifacts::shared(&paths).map_err(|err| format!("Model failed to load: {err}"))?;
    let table = read_csv_path(&options.input).map_err(|err| err.to_string())?;

    let result = Pipeline::new(fitted).run(&table).map_err(|err| match err {
        PipelineError::Rejected(reason) => RunError::Rejected(format!(
            "File does not have the expected columns ({reason}). Check the data format."
        )),
        invalid @ PipelineError::InvalidData(_) => {
            RunError::Rejected(format!("{invalid}. Check the data format."))
        }
        failed @ PipelineError::Failed(_) => RunError::Failed(failed.to_string()),
    })?;

    print_summary(&result);
    let limit = options.preview.unwrap_or(settings.preview_rows);
    print_preview(&result.preview(&dropout_predictor::schema::STUDENT_FEATURES, limit));

    let out = options
        .out
        .unwrap_or_else(|| PathBuf::from(&settings.export_file_name));
    write_csv_file(&result, &out).map_err(|err| err.to_string())?;
    println!();
    println!("Full results written to {}", out.display());
    Ok(())
}

fn resolve_paths(
    options: &CliOptions,
    settings: &PredictorSettings,
) -> Result<artifacts::ArtifactPaths, String> {
    let mut paths = settings.artifact_paths().map_err(|err| err.to_string())?;
    if let Some(model) = &options.model {
        paths.model = model.clone();
    }
    if let Some(scaler) = &options.scaler {
        paths.scaler = scaler.clone();
    }
    Ok(paths)
}

fn print_summary(result: &ResultTable) {
    let summary = result.summary();
    println!("Total students:     {}", summary.total_rows);
    println!("Potential dropouts: {}", summary.dropout_count);
    if summary.unknown_count > 0 {
        println!("Unknown class code: {}", summary.unknown_count);
    }
}

fn print_preview(preview: &Preview) {
    if preview.rows.is_empty() {
        return;
    }
    println!();
    println!("Preview (first {} rows):", preview.rows.len());
    println!("{}", preview.columns.join(","));
    for row in &preview.rows {
        println!("{}", row.join(","));
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut input: Option<PathBuf> = None;
    let mut model: Option<PathBuf> = None;
    let mut scaler: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut preview: Option<usize> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                input = Some(PathBuf::from(value));
            }
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model = Some(PathBuf::from(value));
            }
            "--scaler" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--scaler requires a value".to_string())?;
                scaler = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out = Some(PathBuf::from(value));
            }
            "--preview" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--preview requires a value".to_string())?;
                preview = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --preview value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let input = input.ok_or_else(|| "--input is required".to_string())?;
    Ok(CliOptions {
        input,
        model,
        scaler,
        out,
        preview,
    })
}

fn help_text() -> String {
    [
        "dropout-predict",
        "",
        "Usage:",
        "  dropout-predict --input <students.csv> [options]",
        "",
        "Options:",
        "  --model <model.json>    Classifier artifact (default: from config.toml).",
        "  --scaler <scaler.json>  Scaler artifact (default: from config.toml).",
        "  --out <file.csv>        Export path (default: hasil_prediksi.csv).",
        "  --preview <n>           Rows to preview (default: 100).",
    ]
    .join("\n")
}
