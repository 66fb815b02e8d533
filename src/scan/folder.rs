use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Result, ScanError};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

fn is_card_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
}

/// Lists the card photos directly inside `folder`, sorted by file name
///
/// ### Errors
///
/// * `ScanError::FolderNotFound` if `folder` does not exist or is not a directory
/// * `ScanError::NoImages` if it holds no image files
pub async fn list_card_images(folder: &Path) -> Result<Vec<PathBuf>> {
    match tokio::fs::metadata(folder).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(ScanError::FolderNotFound(folder.display().to_string())),
    }

    let mut images = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_card_image(&path) {
            continue;
        }
        // Follows symlinks; dangling links are skipped
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => images.push(path),
            _ => debug!("Skipping {:?}: not a regular file", path),
        }
    }

    if images.is_empty() {
        return Err(ScanError::NoImages);
    }

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} image files in {:?}", images.len(), folder);
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_lists_images_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "c.jpeg", "notes.txt", "d.gif", "e.BMP", "f.webp"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        fs::write(dir.path().join("nested.jpg").join("inner.jpg"), b"x").unwrap();

        let images = list_card_images(dir.path()).await.unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.jpeg", "d.gif", "e.BMP"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_follows_symlinked_images() {
        let photos = tempdir().unwrap();
        let original = photos.path().join("original.jpg");
        fs::write(&original, b"x").unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(&original, dir.path().join("linked.jpg")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("dangling.jpg")).unwrap();

        let images = list_card_images(dir.path()).await.unwrap();
        assert_eq!(images, vec![dir.path().join("linked.jpg")]);
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = list_card_images(&missing).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Folder not found: {}", missing.display()));
    }

    #[tokio::test]
    async fn test_file_is_not_a_folder() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("card.jpg");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            list_card_images(&file).await,
            Err(ScanError::FolderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_folder_without_images() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();

        let err = list_card_images(dir.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "No image files found in the specified folder");
    }
}
