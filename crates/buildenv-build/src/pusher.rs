//! イメージプッシュ処理
//!
//! ビルドしたビルダーイメージをターゲットレジストリにプッシュします。

use crate::auth::RegistryAuth;
use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::models::PushImageInfo;
use colored::Colorize;
use futures_util::StreamExt;
use std::io::Write;

/// イメージプッシュを実行するハンドラ
///
/// 認証情報の解決に使うレジストリはコマンドラインで明示的に渡された
/// ものなので、イメージ名からの推測はせず構築時に受け取る。
pub struct ImagePusher {
    docker: Docker,
    auth: RegistryAuth,
    registry: String,
}

impl ImagePusher {
    /// 新しい ImagePusher を作成
    pub fn new(docker: Docker, registry: impl Into<String>) -> Self {
        Self {
            docker,
            auth: RegistryAuth::new(),
            registry: registry.into(),
        }
    }

    /// 認証情報マネージャーを指定して作成
    pub fn with_auth(docker: Docker, auth: RegistryAuth, registry: impl Into<String>) -> Self {
        Self {
            docker,
            auth,
            registry: registry.into(),
        }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// # Arguments
    /// * `image` - イメージ名（レジストリ込み、タグなし）
    /// * `tag` - イメージタグ
    ///
    /// # Returns
    /// プッシュ成功時は完全なイメージ名を返す
    pub async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
        let full_image = format!("{}:{}", image, tag);

        validate_tag(tag)?;

        // 認証情報を取得
        let credentials = self.auth.get_credentials(&self.registry)?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        println!("  → {}", full_image.cyan());

        // プッシュを実行
        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), credentials);

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else {
                        self.handle_progress(&info, &mut last_status);
                    }
                }
                Err(e) => {
                    return Err(BuildError::PushFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        // 最終行の改行
        println!();

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed { message: err });
        }

        Ok(full_image)
    }

    /// プッシュ進捗を表示
    fn handle_progress(&self, info: &PushImageInfo, last_status: &mut String) {
        if let Some(status) = &info.status {
            let progress = info.progress.as_deref().unwrap_or("");

            match status.as_str() {
                "Pushing" => {
                    print!("\r  ↑ {} {}     ", status, progress);
                    std::io::stdout().flush().ok();
                }
                "Pushed" => {
                    println!("\r  {} Pushed                    ", "✓".green());
                }
                "Layer already exists" => {
                    println!("\r  {} Layer already exists      ", "✓".green());
                }
                "Preparing" | "Waiting" => {
                    // 準備中は表示をスキップ（ノイズ軽減）
                }
                _ => {
                    if status != last_status {
                        println!("\r  ℹ {}                    ", status);
                        *last_status = status.clone();
                    }
                }
            }
        }
    }
}

/// タグのバリデーション
///
/// Docker タグの制約:
/// - 128文字以下
/// - 英数字、ピリオド、ハイフン、アンダースコアのみ
/// - 先頭はピリオドまたはハイフンではない
fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    for c in tag.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
            return Err(BuildError::InvalidTag {
                tag: format!("Invalid character '{}' in tag: {}", c, tag),
            });
        }
    }

    Ok(())
}

/// イメージ名とタグを分離
///
/// レジストリのポート番号とタグを取り違えないよう、最後の `/` より
/// 後ろに現れる `:` だけをタグ区切りとして扱う。ビルダーイメージの
/// タグは `8` や `2023` のような数字だけの形になるため、数字タグを
/// ポート番号とみなす推測は使えない。
///
/// # Examples
/// - `localhost:5000/kumocorp/builder-for-rockylinux:8`
///   -> `("localhost:5000/kumocorp/builder-for-rockylinux", "8")`
/// - `ghcr.io/org/app` -> `("ghcr.io/org/app", "latest")`
/// - `localhost:5000/app` -> `("localhost:5000/app", "latest")`
pub fn split_image_tag(image: &str) -> (String, String) {
    let repo_start = image.rfind('/').map(|pos| pos + 1).unwrap_or(0);

    if let Some(pos) = image[repo_start..].rfind(':') {
        let pos = repo_start + pos;
        (image[..pos].to_string(), image[pos + 1..].to_string())
    } else {
        (image.to_string(), "latest".to_string())
    }
}
