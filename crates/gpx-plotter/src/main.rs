// The binary uses the library, not duplicate modules
fn main() -> anyhow::Result<()> {
    gpx_plotter::run()
}
