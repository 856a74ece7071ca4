mod build;
mod docker;

use clap::Parser;

#[derive(Parser)]
#[command(name = "buildenv")]
#[command(
    about = "CIビルド用のビルダーイメージを生成・ビルドしてレジストリにプッシュ",
    long_about = None
)]
struct Cli {
    /// プッシュ先レジストリ (host[:port])
    #[arg(env = "BUILDENV_REGISTRY")]
    registry: String,

    /// ビルド対象のベースイメージ（省略時はカタログ全体）
    image: Option<String>,

    /// ビルドのみ行い、レジストリへのプッシュをスキップ
    #[arg(long)]
    no_push: bool,

    /// Dockerのビルドキャッシュを使用しない
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // イメージ名の検証はDocker接続より先に行い、
    // 不正な指定ではビルドを一切始めない
    let images = buildenv_core::select_images(cli.image.as_deref())?;

    build::handle_build_command(&cli.registry, &images, !cli.no_push, cli.no_cache).await
}
