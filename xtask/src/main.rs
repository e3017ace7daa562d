/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle kp-chorus-flanger --release
///
/// This compiles the plugin as a cdylib and packages the CLAP and VST3
/// bundles under `target/bundled/`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
