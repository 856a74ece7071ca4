use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::image::BuildImageOptions;
use colored::Colorize;
use futures_util::stream::StreamExt;

pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// 生成済みDockerfileを含むコンテキストからイメージをビルド
    ///
    /// コンテキストアーカイブには `Dockerfile` エントリが注入済みである
    /// こと（ContextBuilder::create_context が保証する）。
    pub async fn build_image(
        &self,
        context_data: Vec<u8>,
        tag: &str,
        no_cache: bool,
    ) -> BuildResult<()> {
        tracing::info!("Building image: {}", tag);

        let options = BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            nocache: no_cache,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            pull: true,    // ベースイメージを常にpull
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        // ビルドストリームの開始
        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        // ビルド進捗の表示
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => {
                    self.handle_build_output(output)?;
                }
                Err(e) => {
                    return Err(BuildError::DockerConnection(e));
                }
            }
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }

    /// ビルド出力の処理
    fn handle_build_output(&self, output: bollard::models::BuildInfo) -> BuildResult<()> {
        if let Some(stream) = output.stream {
            // ビルドステップの出力
            print!("{}", stream);
        }

        if let Some(error) = output.error {
            return Err(BuildError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BuildError::BuildFailed(error_msg));
        }

        if let Some(status) = output.status {
            // ステータスメッセージ（pull等）
            println!("{}", status.cyan());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Docker接続が必要なため、通常のテストではスキップ
    async fn test_build_from_generated_dockerfile() {
        let docker = Docker::connect_with_local_defaults().unwrap();
        let builder = ImageBuilder::new(docker);

        use crate::context::ContextBuilder;
        use std::fs;
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("get-deps.sh"), "#!/bin/sh\nexit 0\n").unwrap();

        let dockerfile = "FROM alpine:latest\nCMD echo 'test'\n";
        let context_data = ContextBuilder::create_context(temp_dir.path(), dockerfile).unwrap();

        let result = builder
            .build_image(context_data, "buildenv-test:latest", false)
            .await;

        assert!(result.is_ok());

        // クリーンアップ
        builder
            .docker
            .remove_image(
                "buildenv-test:latest",
                None::<bollard::query_parameters::RemoveImageOptions>,
                None,
            )
            .await
            .ok();
    }
}
