//! ベースイメージカタログ
//!
//! ビルダーイメージの元になるベースイメージの一覧と、
//! ディストリビューションファミリーごとの差分を定義します。

use crate::error::{CatalogError, Result};

/// ビルダーイメージのタグに使う固定ネームスペース
pub const REGISTRY_NAMESPACE: &str = "kumocorp";

/// ディストリビューションファミリー
///
/// Dockerfile生成時のコマンド列の差分をバリアントごとに保持する。
/// ファミリー判定をイメージ名の部分一致に頼らないため、
/// カタログの各エントリが自分のファミリーを明示的に持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    /// apt ベース。doc_packages はそのバージョンだけに追加するパッケージ
    Ubuntu {
        doc_packages: &'static [&'static str],
    },
    /// dnf ベース
    Rocky,
    /// yum ベース。allow_erasing は gnupg2 導入時の競合解消フラグ
    AmazonLinux { allow_erasing: bool },
}

/// カタログの1エントリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageEntry {
    /// ベースイメージ名（例: "ubuntu:22.04"）
    pub id: &'static str,
    pub family: DistroFamily,
}

impl ImageEntry {
    /// レジストリ修飾タグを計算
    ///
    /// # Examples
    /// - registry `myregistry:5000`, id `ubuntu:20.04`
    ///   -> `myregistry:5000/kumocorp/builder-for-ubuntu:20.04`
    pub fn builder_tag(&self, registry: &str) -> String {
        format!("{}/{}/builder-for-{}", registry, REGISTRY_NAMESPACE, self.id)
    }
}

/// ビルド対象のベースイメージ一覧（宣言順に処理される）
pub const CATALOG: &[ImageEntry] = &[
    ImageEntry {
        id: "ubuntu:20.04",
        family: DistroFamily::Ubuntu { doc_packages: &[] },
    },
    ImageEntry {
        id: "ubuntu:22.04",
        family: DistroFamily::Ubuntu {
            doc_packages: &["podman"],
        },
    },
    ImageEntry {
        id: "rockylinux:8",
        family: DistroFamily::Rocky,
    },
    ImageEntry {
        id: "rockylinux:9",
        family: DistroFamily::Rocky,
    },
    ImageEntry {
        id: "amazonlinux:2",
        family: DistroFamily::AmazonLinux {
            allow_erasing: false,
        },
    },
    ImageEntry {
        id: "amazonlinux:2023",
        family: DistroFamily::AmazonLinux {
            allow_erasing: true,
        },
    },
];

/// イメージ名でカタログを検索
pub fn find_image(id: &str) -> Option<&'static ImageEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// 処理対象のイメージ集合を決定
///
/// 指定がなければカタログ全体を宣言順で返す。
/// 指定があればカタログに含まれることを検証し、含まれなければ
/// ビルドを一切始めずにエラーを返す。
pub fn select_images(requested: Option<&str>) -> Result<Vec<&'static ImageEntry>> {
    match requested {
        None => Ok(CATALOG.iter().collect()),
        Some(id) => find_image(id)
            .map(|entry| vec![entry])
            .ok_or_else(|| CatalogError::InvalidImageName(id.to_string())),
    }
}
