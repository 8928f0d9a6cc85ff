//! One conversion run: image → OCR text → rows → CSV (+ debug artifacts).

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::RunConfig;
use crate::config::ToolConfig;
use crate::export::{self, write_csv, write_debug_artifacts};
use crate::ocr::ocr_table_image;
use crate::table::{Row, parse_table};

/// Runs the whole conversion for a validated configuration.
pub fn run(run: &RunConfig) -> Result<()> {
    let config = ToolConfig::load(run.config.as_deref());

    log_banner(run);

    if !run.input.exists() {
        bail!("Input file not found: {}", run.input.display());
    }

    let text = ocr_table_image(&run.input, &config)?;
    let rows = export_rows(run, &config, &text)?;

    if run.debug {
        export::print_preview(&rows);
    }

    info!("Done. Review the CSV before publishing.");
    Ok(())
}

fn log_banner(run: &RunConfig) {
    info!("PNG → CSV migration tool");
    info!("Type:   {}", run.table_type);
    info!("Input:  {}", run.input.display());
    info!("Output: {}", run.output.display());
    if !run.event_id.is_empty() {
        info!("Event:  {}", run.event_id);
    }
    info!("Debug:  {}", run.debug);
}

/// Parses recognized text and writes the CSV plus, with `--debug`, the debug artifacts.
pub fn export_rows(run: &RunConfig, config: &ToolConfig, text: &str) -> Result<Vec<Row>> {
    info!("Parsing table data...");
    let rows = parse_table(text, run.table_type, &run.event_id)?;
    info!("Parsed {} rows", rows.len());

    write_csv(&run.output, run.table_type.headers(), &rows)
        .with_context(|| format!("Failed to write CSV: {}", run.output.display()))?;
    info!("CSV written: {}", run.output.display());

    if run.debug {
        let artifacts = write_debug_artifacts(&config.debug_dir(), &run.input, text, &rows)?;
        info!("OCR text: {}", artifacts.ocr_text.display());
        info!("Parsed JSON: {}", artifacts.parsed_json.display());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableType;
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_config(dir: &Path, table_type: TableType, event_id: &str, debug: bool) -> RunConfig {
        RunConfig {
            table_type,
            event_id: event_id.to_string(),
            input: dir.join("s6_r01_mainR.png"),
            output: dir.join("out").join("result.csv"),
            debug,
            config: None,
        }
    }

    #[test]
    fn test_race_text_to_csv() {
        let dir = tempdir().unwrap();
        let run = run_config(dir.path(), TableType::Race, "s6_r01_main", false);
        let text = "POS DRIVER TEAM TIME PTS\n\
                    1 44 L.Hamilton MERCEDES 1:32.456 +0.000 25\n\
                    garbage line\n\
                    2 Max Verstappen Red Bull +1.234 18\n";

        let rows = export_rows(&run, &ToolConfig::default(), text).unwrap();
        assert_eq!(rows.len(), 2);

        let csv = std::fs::read_to_string(&run.output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TableType::Race.headers().join(","));
        assert!(lines[1].starts_with("s6_r01_main,1,"));
        assert!(lines[2].starts_with("s6_r01_main,2,"));
    }

    #[test]
    fn test_empty_text_writes_header_only() {
        let dir = tempdir().unwrap();
        let run = run_config(dir.path(), TableType::ConstructorsStandings, "", false);

        let rows = export_rows(&run, &ToolConfig::default(), "no table here\n").unwrap();
        assert!(rows.is_empty());

        let csv = std::fs::read_to_string(&run.output).unwrap();
        assert_eq!(csv, format!("{}\n", TableType::ConstructorsStandings.headers().join(",")));
    }

    #[test]
    fn test_debug_writes_artifacts_to_configured_dir() {
        let dir = tempdir().unwrap();
        let run = run_config(dir.path(), TableType::DriversStandings, "", true);
        let config = ToolConfig {
            debug_dir: Some(dir.path().join("debug")),
            ..ToolConfig::default()
        };

        let text = "1 Charles Leclerc FERRARI 120 3 5\n";
        export_rows(&run, &config, text).unwrap();

        let ocr = std::fs::read_to_string(dir.path().join("debug/s6_r01_mainR.ocr.txt")).unwrap();
        assert_eq!(ocr, text);
        assert!(dir.path().join("debug/s6_r01_mainR.parsed.json").is_file());
    }

    #[test]
    fn test_missing_input_fails_before_writing() {
        let dir = tempdir().unwrap();
        let run = run_config(dir.path(), TableType::Race, "s1_r01", false);

        let err = super::run(&run).unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
        assert!(!run.output.exists());
    }

    #[test]
    fn test_banner_reports_debug_flag() {
        let dir = tempdir().unwrap();
        let run = run_config(dir.path(), TableType::Race, "s6_r01_main", true);

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || log_banner(&run));

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Type:   race"));
        assert!(output.contains("Event:  s6_r01_main"));
        assert!(output.contains("Debug:  true"));
    }
}
