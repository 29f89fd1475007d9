use anyhow::Context;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::types::{Payload, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

/// Relative path of a record inside the archive. Raw payloads keep their
/// bare name, structured ones get the format's extension.
pub fn archive_path(record: &Record, format: Format) -> anyhow::Result<PathBuf> {
    let name = Path::new(&record.name);
    let safe = name
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if record.name.is_empty() || !safe {
        anyhow::bail!("Record name '{}' is not a relative archive path", record.name);
    }
    Ok(match record.payload {
        Payload::Raw(_) => name.to_path_buf(),
        _ => PathBuf::from(format!("{}.{}", record.name, format.extension())),
    })
}

pub fn render(record: &Record, format: Format) -> anyhow::Result<String> {
    if let Payload::Raw(raw) = &record.payload {
        return Ok(raw.clone());
    }
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&record.payload)?,
        Format::Yaml => serde_yaml::to_string(&record.payload)?,
    };
    Ok(rendered)
}

/// Write every record below `dir`. Fails before touching the filesystem if
/// two records share a name.
pub fn write_archive(dir: &Path, records: &[Record], format: Format) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.name.as_str()) {
            anyhow::bail!("Duplicate record name '{}'", record.name);
        }
    }

    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let path = dir.join(archive_path(record, format)?);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, render(record, format)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Print records as a YAML stream, one document per record.
pub fn write_stream(out: &mut impl Write, records: &[Record]) -> anyhow::Result<()> {
    for record in records {
        writeln!(out, "---")?;
        writeln!(out, "# {}", record.name)?;
        out.write_all(serde_yaml::to_string(&record.payload)?.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
