fn main() -> anyhow::Result<()> {
    maestro::run()
}
