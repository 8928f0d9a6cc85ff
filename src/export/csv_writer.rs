//! CSV writer for parsed table rows.
//!
//! The whole file is rendered in memory first and then written through a
//! temporary file in the destination directory, so a failed write never
//! leaves a half-written CSV behind.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::table::Row;

/// Quotes a field if it contains a comma, double quote or newline.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Renders a header line plus one line per row, always ending in a newline.
///
/// Values are looked up by header name; missing fields are written empty.
pub fn render_csv(headers: &[&str], rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));

    for row in rows {
        let values: Vec<Cow<'_, str>> = headers.iter().map(|h| escape_field(row.get(h))).collect();
        lines.push(values.join(","));
    }

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

/// Writes rows to `path`, creating parent directories as needed.
pub fn write_csv(path: &Path, headers: &[&str], rows: &[Row]) -> Result<()> {
    let csv = render_csv(headers, rows);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut file = temp_csv_file(dir)?;
    file.write_all(csv.as_bytes())
        .context("Failed to write CSV data")?;

    // A replaced CSV keeps the permissions it had
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }
    file.persist(path)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    Ok(())
}

/// Temporary file next to the destination, created with regular file permissions.
///
/// On Unix the mode is 0666 filtered by the process umask, like a plain
/// `fs::write`, instead of the owner-only default of temporary files.
fn temp_csv_file(dir: &Path) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".png-to-csv").suffix(".tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    builder
        .tempfile_in(dir)
        .context("Failed to create temporary CSV file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{
        CONSTRUCTORS_STANDINGS_HEADERS, DRIVERS_STANDINGS_HEADERS, RACE_HEADERS, TableType,
    };
    use tempfile::tempdir;

    fn race_row(driver: &str) -> Row {
        let mut row = Row::new(TableType::Race);
        row.set("event_id", "s6_r01_main");
        row.set("position", "1");
        row.set("driver_name", driver);
        row.set("team", "MERCEDES");
        row.set("points", "25");
        row.set("status", "Finished");
        row
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field(""), "");
        assert_eq!(escape_field("Doe, John"), "\"Doe, John\"");
        assert_eq!(escape_field("The \"Rocket\""), "\"The \"\"Rocket\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_line_matches_schema() {
        for (table_type, expected) in [
            (TableType::Race, RACE_HEADERS),
            (TableType::DriversStandings, DRIVERS_STANDINGS_HEADERS),
            (TableType::ConstructorsStandings, CONSTRUCTORS_STANDINGS_HEADERS),
        ] {
            let csv = render_csv(table_type.headers(), &[]);
            assert_eq!(csv, format!("{}\n", expected.join(",")));
        }
    }

    #[test]
    fn test_render_rows_in_header_order() {
        let csv = render_csv(RACE_HEADERS, &[race_row("L.Hamilton")]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "s6_r01_main,1,,L.Hamilton,MERCEDES,,,,,,,,,,,,25,Finished,,"
        );
        assert_eq!(lines[1].split(',').count(), RACE_HEADERS.len());
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_escaped_values_survive_csv_reader() {
        let awkward = ["Doe, John", "The \"Rocket\"", "line\nbreak", "a,\"b\"\nc"];
        let rows: Vec<Row> = awkward.iter().map(|name| race_row(name)).collect();
        let csv = render_csv(RACE_HEADERS, &rows);

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), RACE_HEADERS);

        let name_idx = RACE_HEADERS.iter().position(|h| *h == "driver_name").unwrap();
        let parsed: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[name_idx].to_string())
            .collect();
        assert_eq!(parsed, awkward);
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("nested").join("out").join("race.csv");

        write_csv(&csv_path, RACE_HEADERS, &[race_row("L.Hamilton")]).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert!(content.starts_with("event_id,position,"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_write_csv_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("standings.csv");
        std::fs::write(&csv_path, "stale\n").unwrap();

        write_csv(&csv_path, DRIVERS_STANDINGS_HEADERS, &[]).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content, format!("{}\n", DRIVERS_STANDINGS_HEADERS.join(",")));
        // Only the CSV itself is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_csv_uses_regular_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.csv");
        std::fs::write(&plain, "x\n").unwrap();
        let csv_path = dir.path().join("race.csv");

        write_csv(&csv_path, RACE_HEADERS, &[race_row("L.Hamilton")]).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&csv_path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_csv_keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("standings.csv");
        std::fs::write(&csv_path, "stale\n").unwrap();
        std::fs::set_permissions(&csv_path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_csv(&csv_path, DRIVERS_STANDINGS_HEADERS, &[]).unwrap();

        let mode = std::fs::metadata(&csv_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
