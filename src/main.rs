// Runs the background reminder worker against the on-disk store

fn main() {
    if let Err(e) = remindo_lib::run() {
        eprintln!("remindo: {}", e);
        std::process::exit(1);
    }
}
