use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// コンテキストディレクトリの中身に、生成済みのDockerfileテキストを
    /// `Dockerfile` エントリとして注入する。Dockerfileはディスクに置かず、
    /// 生成されたテキストをそのままビルドに渡す。
    pub fn create_context(context_path: &Path, dockerfile: &str) -> BuildResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            // コンテキストディレクトリを再帰的に追加
            tar.append_dir_all(".", context_path)
                .map_err(BuildError::Io)?;

            // 生成したDockerfileを "Dockerfile" として注入
            let dockerfile_bytes = dockerfile.as_bytes();
            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile").map_err(|e| {
                BuildError::BuildFailed(format!("Failed to set Dockerfile path: {}", e))
            })?;
            header.set_size(dockerfile_bytes.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();

            tar.append(&header, dockerfile_bytes).map_err(BuildError::Io)?;

            tar.finish().map_err(BuildError::Io)?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "ビルドコンテキストが大きすぎます（{}MB）。\
                 .dockerignoreで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_create_context_injects_dockerfile() {
        let temp_dir = tempdir().unwrap();

        // コンテキストに入るべきファイル
        fs::write(temp_dir.path().join("get-deps.sh"), "#!/bin/sh\nexit 0\n").unwrap();

        let dockerfile = "FROM alpine:latest\nRUN echo test\n";
        let archive = ContextBuilder::create_context(temp_dir.path(), dockerfile).unwrap();
        assert!(!archive.is_empty());

        // 展開してDockerfileの中身が注入したテキストと一致するか確認
        let extract_dir = tempdir().unwrap();
        let mut reader = std::io::Cursor::new(archive);
        let decoder = flate2::read::GzDecoder::new(&mut reader);
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        let mut content = String::new();
        fs::File::open(extract_dir.path().join("Dockerfile"))
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, dockerfile);

        // コンテキストディレクトリのファイルも含まれること
        assert!(extract_dir.path().join("get-deps.sh").exists());
    }

    #[test]
    fn test_create_context_empty_dir() {
        let temp_dir = tempdir().unwrap();

        let result = ContextBuilder::create_context(temp_dir.path(), "FROM alpine\n");
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_context_overrides_existing_dockerfile() {
        let temp_dir = tempdir().unwrap();

        // 既存のDockerfileよりも注入したテキストが優先される
        fs::write(temp_dir.path().join("Dockerfile"), "FROM debian\n").unwrap();

        let archive =
            ContextBuilder::create_context(temp_dir.path(), "FROM alpine:latest\n").unwrap();

        let extract_dir = tempdir().unwrap();
        let mut reader = std::io::Cursor::new(archive);
        let decoder = flate2::read::GzDecoder::new(&mut reader);
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        let content = fs::read_to_string(extract_dir.path().join("Dockerfile")).unwrap();
        assert_eq!(content, "FROM alpine:latest\n");
    }
}
