#[tokio::main]
async fn main() {
    if let Err(e) = donorlink::run().await {
        eprintln!("donorlink: {e}");
        std::process::exit(1);
    }
}
