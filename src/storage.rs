//! Object bucket on the local filesystem, addressed by relative paths and
//! published under a public URL prefix.

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};
use url::Url;

use crate::config::settings;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Bucket {
    root: PathBuf,
    public_base: Url,
}

impl Bucket {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> anyhow::Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let base = if public_base.ends_with('/') {
            public_base.to_string()
        } else {
            format!("{public_base}/")
        };
        Ok(Self {
            root: root.into(),
            public_base: Url::parse(&base)?,
        })
    }

    pub fn from_settings() -> anyhow::Result<Self> {
        let s = settings();
        Self::new(&s.storage_root, &s.public_base_url)
    }

    /// Write `bytes` at `path`. Without `upsert` an existing object is a
    /// `Conflict`.
    pub async fn upload(&self, path: &str, bytes: &[u8], upsert: bool) -> AppResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut opts = fs::OpenOptions::new();
        opts.write(true);
        if upsert {
            opts.create(true).truncate(true);
        } else {
            opts.create_new(true);
        }

        let mut file = match opts.open(&target).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::Conflict(format!("object {path} already exists")))
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound("object")),
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, path: &str) -> AppResult<String> {
        self.public_base
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| AppError::Validation(format!("bad object path: {e}")))
    }

    /// Map an object path into the bucket root, refusing anything that could
    /// escape it.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let rel = Path::new(path);
        let clean = !path.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(AppError::Validation(format!("bad object path: {path}")));
        }
        Ok(self.root.join(rel))
    }
}

/// `avatars/<email, non-alphanumerics as _>_<unix ms>.<ext>`
pub fn avatar_path(email: &str, ext: &str, unix_ms: i64) -> String {
    let sanitized: String = email
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("avatars/{sanitized}_{unix_ms}.{}", clean_ext(ext))
}

/// `team-logos/team_<name, whitespace runs and non-alphanumerics as _>_<unix ms>.<ext>`
pub fn team_logo_path(team_name: &str, ext: &str, unix_ms: i64) -> String {
    let name = team_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_");
    format!("team-logos/team_{name}_{unix_ms}.{}", clean_ext(ext))
}

fn clean_ext(ext: &str) -> String {
    let ext: String = ext
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if ext.is_empty() {
        "bin".into()
    } else {
        ext.to_ascii_lowercase()
    }
}

/// Best-effort content type for serving stored images.
pub fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_bucket() -> Bucket {
        let dir = std::env::temp_dir().join(format!("bucket-{}", Uuid::new_v4()));
        Bucket::new(dir, "http://cdn.test/media").unwrap()
    }

    #[test]
    fn avatar_paths_are_sanitized() {
        assert_eq!(
            avatar_path("k.l+rahul@mail.com", ".PNG", 1700),
            "avatars/k_l_rahul_mail_com_1700.png"
        );
    }

    #[test]
    fn logo_paths_collapse_whitespace() {
        assert_eq!(
            team_logo_path("Royal  Challengers Bengaluru", "jpg", 5),
            "team-logos/team_Royal_Challengers_Bengaluru_5.jpg"
        );
    }

    #[test]
    fn logo_paths_drop_url_metacharacters() {
        let b = scratch_bucket();
        let path = team_logo_path("Kings #11 / XI?", "png", 9);
        assert_eq!(path, "team-logos/team_Kings__11___XI__9.png");
        assert_eq!(
            b.public_url(&path).unwrap(),
            "http://cdn.test/media/team-logos/team_Kings__11___XI__9.png"
        );
    }

    #[test]
    fn public_url_keeps_prefix() {
        let b = scratch_bucket();
        assert_eq!(
            b.public_url("avatars/a_1.png").unwrap(),
            "http://cdn.test/media/avatars/a_1.png"
        );
    }

    #[tokio::test]
    async fn upload_without_upsert_refuses_overwrite() {
        let b = scratch_bucket();
        b.upload("team-logos/x.png", b"one", false).await.unwrap();
        let again = b.upload("team-logos/x.png", b"two", false).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));

        b.upload("team-logos/x.png", b"three", true).await.unwrap();
        assert_eq!(b.read("team-logos/x.png").await.unwrap(), b"three");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let b = scratch_bucket();
        let res = b.upload("../escape.png", b"x", true).await;
        assert!(matches!(res, Err(AppError::Validation(_))));
        assert!(matches!(b.read("/etc/passwd").await, Err(AppError::Validation(_))));
    }
}
