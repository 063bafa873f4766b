use anyhow::{Context, Result};
use eventhub_models::{EventDraft, SelectedFile};
use std::path::Path;

/// Read a draft from TOML. Dates are RFC 3339 strings, e.g.
/// `startDate = "2024-06-01T09:00:00Z"`.
pub fn load_draft(path: &Path) -> Result<EventDraft> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    let draft: EventDraft = toml::from_str(&raw)
        .with_context(|| format!("failed to parse draft {}", path.display()))?;
    Ok(draft)
}

/// Attach the image at `path` to `draft`.
pub async fn attach_image(draft: &mut EventDraft, path: &Path, limit: Option<u64>) -> Result<()> {
    let file = SelectedFile::from_path(path, limit)
        .await
        .with_context(|| format!("failed to load image {}", path.display()))?;
    tracing::debug!(?file, "image attached");
    draft.image = Some(file);
    Ok(())
}
