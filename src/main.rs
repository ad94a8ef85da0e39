#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizbank::run().await {
        eprintln!("quizbank fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
