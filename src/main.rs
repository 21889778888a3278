fn main() {
    #[cfg(feature = "cli")]
    diffprep::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("diffprep: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
