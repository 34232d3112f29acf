fn main() -> anyhow::Result<()> {
    swapsort_cli::main()
}
