use clap::Parser;
use heliflight_web_lib::{HostOptions, init_logging, run, window_conf};

#[macroquad::main(window_conf)]
async fn main() {
    init_logging();
    let options = HostOptions::parse();
    run(options).await;
}
