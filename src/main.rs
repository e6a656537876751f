fn main() -> anyhow::Result<()> {
    ledger_tool::cli::run_cli()
}
