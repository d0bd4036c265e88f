fn main() {
    if let Err(err) = clearlane_csv::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
