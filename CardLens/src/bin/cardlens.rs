fn main() -> anyhow::Result<()> {
    cardlens::cli::run_cli()
}
