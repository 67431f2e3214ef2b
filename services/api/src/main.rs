use riskalloc_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("riskalloc error: {err}");
        std::process::exit(1);
    }
}
