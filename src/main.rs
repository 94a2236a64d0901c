use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use rust_realtime_chat::config;
use rust_realtime_chat::remote::{RealtimeFeed, RestStore};
use rust_realtime_chat::sync::Synchronizer;
use rust_realtime_chat::ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "rust_realtime_chat",
    version,
    about = "Realtime chat client over a shared remote message log"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let remote_config = config::load_config(&cli.config);

    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Synchronizer
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Synchronizer -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy Synchronizer (Chạy ngầm)
    let store = Arc::new(RestStore::new(&remote_config));
    let feed = Arc::new(RealtimeFeed::new(&remote_config));
    tokio::spawn(async move {
        Synchronizer::new(event_tx, cmd_rx, store, feed).run().await;
        log::info!("Synchronizer task finished");
    });

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Realtime Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            Ok(Box::new(ChatApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )
}
