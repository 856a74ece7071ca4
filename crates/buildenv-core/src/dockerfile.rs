//! Dockerfile生成
//!
//! ベースイメージごとにビルダーイメージのDockerfileテキストを組み立てます。
//! 共通のツールチェーン導入コマンド列に、ファミリーごとの前処理・後処理を
//! 足し合わせ、` && ` で連結して RUN 命令にまとめます。

use crate::catalog::{DistroFamily, ImageEntry};

/// 1エントリ分のDockerfileテキストを生成
pub fn render(entry: &ImageEntry) -> String {
    let mut text = header(entry.id);

    match entry.family {
        DistroFamily::Ubuntu { doc_packages } => {
            let commands = ubuntu_commands(doc_packages);
            text.push_str("ENV DEBIAN_FRONTEND=noninteractive\n");
            // docker-clean を消して apt のキャッシュをマウントに残す
            text.push_str("RUN rm -f /etc/apt/apt.conf.d/docker-clean\n");
            text.push_str(&format!(
                "RUN --mount=type=cache,target=/var/cache/apt {}\n",
                join_run(&commands)
            ));
        }
        DistroFamily::Rocky => {
            text.push_str(&format!("RUN {}\n", join_run(&rocky_commands())));
        }
        DistroFamily::AmazonLinux { allow_erasing } => {
            text.push_str(&format!(
                "RUN {}\n",
                join_run(&amazonlinux_commands(allow_erasing))
            ));
        }
    }

    text
}

/// ヘッダ部: ベースイメージ指定、作業ディレクトリ、依存導入スクリプトの
/// コピー、OCIメタデータラベル
fn header(id: &str) -> String {
    format!(
        "FROM {id}\n\
         \n\
         WORKDIR /tmp\n\
         COPY ./get-deps.sh .\n\
         LABEL org.opencontainers.image.source=https://github.com/KumoCorp/kumomta\n\
         LABEL org.opencontainers.image.description=\"Build environment for CI\"\n\
         LABEL org.opencontainers.image.licenses=\"Apache\"\n"
    )
}

/// 途中のコマンドが失敗したらその命令全体を失敗させる
fn join_run(commands: &[String]) -> String {
    commands.join(" && ")
}

/// 全ファミリー共通のツールチェーン導入コマンド列
///
/// rustupのブートストラップ、依存導入スクリプトの実行、
/// nextestバイナリの展開、sccacheの導入。
fn toolchain_commands() -> Vec<String> {
    [
        "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y",
        ". $HOME/.cargo/env",
        "/tmp/get-deps.sh",
        "curl -LsSf https://get.nexte.st/latest/linux | tar zxf - -C /usr/local/bin",
        "cargo install --locked sccache --no-default-features --features s3",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn ubuntu_commands(doc_packages: &[&str]) -> Vec<String> {
    let mut packages = vec!["ca-certificates", "curl", "git", "jq", "pip"];
    packages.extend_from_slice(doc_packages);

    let mut commands = vec![
        "echo 'debconf debconf/frontend select Noninteractive' | debconf-set-selections"
            .to_string(),
        "apt update".to_string(),
        format!(
            "apt install -yqq --no-install-recommends {}",
            packages.join(" ")
        ),
    ];
    commands.extend(toolchain_commands());
    commands.push("cargo install --locked gelatyx".to_string());
    commands.push("pip3 install --quiet black".to_string());
    commands.extend(github_cli_commands());
    commands
}

/// GitHub CLI のサードパーティリポジトリを登録して gh を導入
fn github_cli_commands() -> Vec<String> {
    [
        "curl -fsSL https://cli.github.com/packages/githubcli-archive-keyring.gpg | gpg --dearmor -o /usr/share/keyrings/githubcli-archive-keyring.gpg",
        "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/usr/share/keyrings/githubcli-archive-keyring.gpg] https://cli.github.com/packages stable main\" | tee /etc/apt/sources.list.d/github-cli.list > /dev/null",
        "apt update",
        "apt install -yqq --no-install-recommends gh",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn rocky_commands() -> Vec<String> {
    let mut commands = vec![
        "dnf install -y git rpm-sign gnupg2".to_string(),
        // curl-minimal 入りのイメージでは curl の上書き導入が失敗する
        "command -v curl || dnf install -y curl".to_string(),
    ];
    commands.extend(toolchain_commands());
    commands
}

fn amazonlinux_commands(allow_erasing: bool) -> Vec<String> {
    let gpg_bootstrap = if allow_erasing {
        "yum install -y gnupg2 --allowerasing"
    } else {
        "yum install -y gnupg2"
    };

    let mut commands = vec![
        gpg_bootstrap.to_string(),
        "yum install -y git rpm-sign".to_string(),
        // curl-minimal 入りのイメージでは curl の上書き導入が失敗する
        "command -v curl || yum install -y curl".to_string(),
    ];
    commands.extend(toolchain_commands());
    commands
}
