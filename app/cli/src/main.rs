//! FILENAME: app/cli/src/main.rs
fn main() -> anyhow::Result<()> {
    app_lib::run()
}
