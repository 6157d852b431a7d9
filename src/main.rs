fn main() -> anyhow::Result<()> {
    watchtime_lib::run()
}
