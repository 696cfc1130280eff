use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;
use tune_a_video_core::VideoArtifact;
use uuid::Uuid;

/// URL prefix under which the store's directory is served.
pub const VIDEOS_ROUTE: &str = "/videos";

/// The directory of videos the server hands out.
#[derive(Debug, Clone)]
pub struct VideoStore {
    root: PathBuf,
}

fn is_url_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl VideoStore {
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Make `artifact` reachable over HTTP and return its URL.
    ///
    /// Files already in the store keep their name; anything else is copied in.
    pub fn publish(&self, artifact: &VideoArtifact) -> io::Result<String> {
        let source = artifact.path.canonicalize()?;
        let in_store = source.parent() == Some(self.root.as_path());
        let existing_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| is_url_safe(name));

        let name = match existing_name {
            Some(name) if in_store => name.to_string(),
            _ => {
                let extension = source
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .filter(|ext| is_url_safe(ext))
                    .unwrap_or("mp4");
                let name = format!("{}.{extension}", Uuid::new_v4());
                fs::copy(&source, self.root.join(&name))?;
                debug!(from = %source.display(), %name, "copied video into store");
                name
            }
        };
        Ok(format!("{VIDEOS_ROUTE}/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn videos_inside_the_store_keep_their_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = VideoStore::new(dir.path())?;
        let path = store.root().join("abc-123.mp4");
        fs::write(&path, b"video")?;

        let url = store.publish(&VideoArtifact { path })?;
        assert_eq!(url, "/videos/abc-123.mp4");
        Ok(())
    }

    #[test]
    fn outside_videos_are_copied_in() -> anyhow::Result<()> {
        let store_dir = tempfile::tempdir()?;
        let other_dir = tempfile::tempdir()?;
        let store = VideoStore::new(store_dir.path())?;
        let path = other_dir.path().join("my video.webm");
        fs::write(&path, b"video")?;

        let url = store.publish(&VideoArtifact { path })?;
        let name = url.strip_prefix("/videos/").unwrap();
        assert!(name.ends_with(".webm"));
        assert_eq!(fs::read(store.root().join(name))?, b"video");
        Ok(())
    }

    #[test]
    fn missing_video_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = VideoStore::new(dir.path())?;
        assert!(store
            .publish(&VideoArtifact {
                path: dir.path().join("nope.mp4")
            })
            .is_err());
        Ok(())
    }
}
