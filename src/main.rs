fn main() {
    if let Err(err) = energy_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
