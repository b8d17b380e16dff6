#[tokio::main]
async fn main() {
    let code = salonbook::app::startup::startup().await;
    std::process::exit(code);
}
