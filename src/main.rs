use std::env;

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = required_growth::api::run_http_server(port).await {
                log::error!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("solve") => {
            raw_args.remove(1);
            match required_growth::api::run_cli(raw_args) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            }
        }
        _ => {
            eprintln!("Usage: required-growth serve [port] | required-growth solve --help");
            std::process::exit(1);
        }
    }
}
