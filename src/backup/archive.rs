// notionbackup/src/backup/archive.rs
use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::info;
use walkdir::WalkDir;

/// Archive path for a run directory: `<parent>/notion_backup_<run name>.tar.gz`.
pub fn archive_path_for(run_dir: &Path) -> Result<PathBuf> {
    let run_name = run_dir
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid backup directory name")?;
    let parent = run_dir.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!("notion_backup_{}.tar.gz", run_name)))
}

/// Packs `run_dir` into a GZipped TAR next to it.
///
/// Entries are stored under the run directory's own name, so unpacking
/// recreates `<timestamp>/pages.json` and friends.
pub fn create_tar_gz_archive(run_dir: &Path) -> Result<PathBuf> {
    if !run_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Source for archival is not a directory: {}",
            run_dir.display()
        ));
    }

    let archive_dest_path = archive_path_for(run_dir)?;
    let root_name = run_dir.file_name().context("Invalid backup directory name")?;

    info!(
        "Creating tar.gz archive from {} to {}",
        run_dir.display(),
        archive_dest_path.display()
    );

    let archive_file = File::create(&archive_dest_path).with_context(|| {
        format!(
            "Failed to create archive file: {}",
            archive_dest_path.display()
        )
    })?;
    let enc = GzEncoder::new(archive_file, Compression::default());
    let mut tar_builder = Builder::new(enc);

    for entry in WalkDir::new(run_dir).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", run_dir.display()))?;
        let path = entry.path();
        let relative = path.strip_prefix(run_dir).with_context(|| {
            format!(
                "Failed to strip prefix {} from {}",
                run_dir.display(),
                path.display()
            )
        })?;
        let name = Path::new(root_name).join(relative);

        if entry.file_type().is_dir() {
            tar_builder.append_dir(&name, path).with_context(|| {
                format!("Failed to append directory {} to archive", path.display())
            })?;
        } else if entry.file_type().is_file() {
            tar_builder.append_path_with_name(path, &name).with_context(|| {
                format!(
                    "Failed to append file {} as {} to archive",
                    path.display(),
                    name.display()
                )
            })?;
        }
    }

    let encoder = tar_builder.into_inner().with_context(|| {
        format!(
            "Failed to get inner encoder from tar builder for archive: {}",
            archive_dest_path.display()
        )
    })?;
    encoder.finish().with_context(|| {
        format!(
            "Failed to finish Gzip encoding for archive: {}",
            archive_dest_path.display()
        )
    })?;

    info!(
        "Tar.gz archive created successfully at {}",
        archive_dest_path.display()
    );
    Ok(archive_dest_path)
}
