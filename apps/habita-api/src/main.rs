use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = habita_api::Args::parse();
	habita_api::run(args).await
}
