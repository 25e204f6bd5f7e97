fn main() {
    guidelens_core::logging::init();

    if let Err(error) = guidelens_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
