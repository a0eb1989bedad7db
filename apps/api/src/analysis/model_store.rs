// Locates the sentence embedding model on disk, downloading it from
// Hugging Face on first start when allowed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Hugging Face repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Local file names inside the model directory.
pub const EMBEDDING_MODEL_FILE: &str = "model.onnx";
pub const EMBEDDING_TOKENIZER_FILE: &str = "tokenizer.json";

/// (remote path, local file name)
const EMBEDDING_FILES: &[(&str, &str)] = &[
    ("tokenizer.json", EMBEDDING_TOKENIZER_FILE),
    ("onnx/model.onnx", EMBEDDING_MODEL_FILE),
];

/// Check whether both required embedding model files exist.
pub fn embedding_files_present(dir: &Path) -> bool {
    EMBEDDING_FILES
        .iter()
        .all(|(_, local)| dir.join(local).exists())
}

/// Make sure the model files are in `dir`, fetching missing ones if
/// `auto_download` is set. Existing files are never re-downloaded.
pub async fn ensure_embedding_model(dir: &Path, auto_download: bool) -> Result<()> {
    if embedding_files_present(dir) {
        info!("Embedding model found in {}", dir.display());
        return Ok(());
    }

    if !auto_download {
        anyhow::bail!(
            "Embedding model files missing from {} and MODEL_AUTO_DOWNLOAD is disabled",
            dir.display()
        );
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let client = reqwest::Client::new();
    for (remote, local) in EMBEDDING_FILES {
        let dest = dir.join(local);
        if dest.exists() {
            continue;
        }
        download_file(&client, &format!("{EMBEDDING_HF_URL}/{remote}"), &dest).await?;
    }

    Ok(())
}

async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {url}");

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    write_via_part_file(dest, &bytes)?;

    info!("Downloaded {} ({} bytes) to {}", url, bytes.len(), dest.display());
    Ok(())
}

/// Writes to `<dest>.part` and renames it over `dest`, so an interrupted
/// write never leaves a truncated file at the final path.
fn write_via_part_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    let part = part_path(dest);

    std::fs::write(&part, bytes).with_context(|| format!("Failed to write {}", part.display()))?;
    std::fs::rename(&part, dest).with_context(|| {
        format!("Failed to move {} to {}", part.display(), dest.display())
    })?;

    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
