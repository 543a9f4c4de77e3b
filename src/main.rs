#![forbid(unsafe_code)]

use clap::Parser;
use pastechat_lib::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pastechat_lib::logger::init_tracing();
    pastechat_lib::run(Args::parse()).await
}
