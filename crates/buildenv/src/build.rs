use crate::docker;
use buildenv_build::{ContextBuilder, ImageBuilder, ImagePusher, split_image_tag};
use buildenv_core::{ImageEntry, dockerfile};
use colored::Colorize;

/// 1イメージ分の処理結果
struct BakeOutcome {
    id: &'static str,
    tag: String,
    result: Result<(), String>,
}

/// ビルドコマンドを処理
///
/// 選択されたイメージを宣言順に1つずつ処理する。失敗したイメージが
/// あってもバッチ全体は止めず、残りを継続して最後にサマリーで報告する。
/// 終了コードは個々のビルド・プッシュの成否を反映しない。
pub async fn handle_build_command(
    registry: &str,
    images: &[&'static ImageEntry],
    push: bool,
    no_cache: bool,
) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("ビルド対象イメージ ({} 個):", images.len()).bold()
    );
    for entry in images {
        println!("  • {}", entry.id.cyan());
    }

    // Docker接続
    println!();
    println!("{}", "Dockerに接続中...".blue());
    let docker_conn = docker::init_docker_with_error_handling().await?;

    let builder = ImageBuilder::new(docker_conn.clone());
    let pusher = push.then(|| ImagePusher::new(docker_conn.clone(), registry));

    // ビルドコンテキストはカレントディレクトリ
    let context_dir = std::env::current_dir()?;
    if !context_dir.join("get-deps.sh").exists() {
        tracing::warn!(
            "get-deps.sh が {} に見つかりません。COPY ステップで失敗します",
            context_dir.display()
        );
    }

    let mut outcomes: Vec<BakeOutcome> = Vec::new();

    for entry in images {
        let tag = entry.builder_tag(registry);

        println!();
        println!(
            "{}",
            format!("🔨 {} をビルド中...", entry.id).green().bold()
        );

        // Dockerfileを生成して表示してからビルドに渡す
        let dockerfile_text = dockerfile::render(entry);
        println!("{}", dockerfile_text);

        let result = bake_image(
            &builder,
            pusher.as_ref(),
            &context_dir,
            &dockerfile_text,
            &tag,
            no_cache,
        )
        .await;

        if let Err(message) = &result {
            eprintln!("  {} {}", "✗".red().bold(), message);
        }

        outcomes.push(BakeOutcome {
            id: entry.id,
            tag,
            result,
        });
    }

    print_summary(&outcomes);

    Ok(())
}

/// 1イメージ分のビルドとプッシュ
async fn bake_image(
    builder: &ImageBuilder,
    pusher: Option<&ImagePusher>,
    context_dir: &std::path::Path,
    dockerfile_text: &str,
    tag: &str,
    no_cache: bool,
) -> Result<(), String> {
    let context = ContextBuilder::create_context(context_dir, dockerfile_text)
        .map_err(|e| format!("コンテキスト作成エラー: {}", e))?;

    builder
        .build_image(context, tag, no_cache)
        .await
        .map_err(|e| format!("ビルドエラー: {}", e))?;

    // ビルド成功の確認行。後続のプッシュの成否とは独立
    println!("Created {}", tag);

    if let Some(pusher) = pusher {
        let (image, tag_part) = split_image_tag(tag);
        let pushed = pusher
            .push(&image, &tag_part)
            .await
            .map_err(|e| format!("プッシュエラー: {}", e))?;
        println!("  {} {}", "✓".green(), pushed.cyan());
    }

    Ok(())
}

/// 結果サマリーを表示
fn print_summary(outcomes: &[BakeOutcome]) {
    println!();
    println!("{}", "結果サマリー:".bold());

    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => {
                println!("  {} {}: {}", "✓".green(), outcome.id, outcome.tag.cyan());
            }
            Err(message) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), outcome.id, message);
            }
        }
    }

    if failed > 0 {
        println!();
        println!(
            "{}",
            format!("{} 個のイメージで失敗しました", failed).yellow()
        );
    }
}
