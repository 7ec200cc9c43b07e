fn main() {
    sleek_engine::logging::init();

    if let Err(error) = sleek_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
