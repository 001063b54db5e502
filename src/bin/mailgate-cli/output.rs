use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailgate_lib::ValidationVerdict;

pub fn write_reports(rows: &[ValidationVerdict], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(rows: &[ValidationVerdict]) -> bool {
    rows.iter().any(|row| !row.is_valid)
}

fn write_human(rows: &[ValidationVerdict]) -> Result<()> {
    for row in rows {
        if row.is_valid {
            println!("[OK]    {} :: {}", row.email, row.message);
        } else {
            println!("[INVALID] {} :: {}", row.email, row.message);
        }
    }
    Ok(())
}

fn write_json(rows: &[ValidationVerdict], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

fn write_ndjson(rows: &[ValidationVerdict], cli: &Cli) -> Result<()> {
    let buf = ndjson_bytes(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, &buf)?;
    } else {
        print!("{}", String::from_utf8_lossy(&buf));
    }
    Ok(())
}

fn ndjson_bytes(rows: &[ValidationVerdict]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for row in rows {
        let line = serde_json::to_string(row)?;
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
    }
    Ok(buf)
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[ValidationVerdict], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv_rows(&mut wtr, rows)?;
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        write_csv_rows(&mut wtr, rows)?;
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(feature = "with-csv")]
fn write_csv_rows<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[ValidationVerdict],
) -> Result<()> {
    wtr.write_record(["email", "is_valid", "message"])?;
    for row in rows {
        let valid = if row.is_valid { "true" } else { "false" };
        wtr.write_record([row.email.as_str(), valid, row.message.as_str()])?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[ValidationVerdict], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", Path::new(&tmp).display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ValidationVerdict> {
        vec![
            ValidationVerdict::valid("a@example.com"),
            ValidationVerdict::new("b@mailinator.com", false, "Domain is disposable."),
        ]
    }

    #[test]
    fn ndjson_is_one_object_per_line() {
        let bytes = ndjson_bytes(&rows()).expect("ndjson");
        let text = String::from_utf8(bytes).expect("utf8");
        let text = text.trim_end();
        insta::assert_snapshot!(text, @r#"
        {"email":"a@example.com","is_valid":true,"message":"Email is valid."}
        {"email":"b@mailinator.com","is_valid":false,"message":"Domain is disposable."}
        "#);
    }

    #[test]
    fn invalid_rows_are_detected() {
        assert!(any_invalid(&rows()));
        assert!(!any_invalid(&rows()[..1]));
    }

    #[test]
    fn atomic_write_replaces_target() {
        let dir = std::env::temp_dir().join(format!("mailgate-out-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("tmp dir");
        let target = dir.join("report.json");
        write_all_atomically(&target, b"first").expect("write");
        write_all_atomically(&target, b"second").expect("rewrite");
        assert_eq!(std::fs::read(&target).expect("read"), b"second");
        assert!(!dir.join("report.json.tmp").exists());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
