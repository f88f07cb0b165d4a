fn main() -> anyhow::Result<()> {
    showroom::run(showroom::Settings::default())
}
