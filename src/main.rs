use resp_lex::cli::Cli;
use resp_lex::config::Config;
use resp_lex::dump::TokenRecord;
use resp_lex::TokenReader;
use std::collections::BTreeMap;
use tokio::io::AsyncRead;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_sources(&cli)?;

    let mut src: Box<dyn AsyncRead + Unpin> = match &cli.input {
        Some(path) => {
            info!("Reading RESP stream from {}", path.display());
            Box::new(tokio::fs::File::open(path).await?)
        }
        None => Box::new(tokio::io::stdin()),
    };

    if let Err(e) = run(&config, &mut src).await {
        error!("Tokenizing failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn run<R>(config: &Config, src: &mut R) -> resp_lex::error::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = TokenReader::with_capacity(config.reader.chunk_size);
    reader.set_chunk_size(config.reader.chunk_size);

    let mut counts = BTreeMap::new();
    while let Some(token) = reader.read_token(src).await? {
        let record = TokenRecord::new(&token, config.output.preview_limit);
        println!("{}", record.render(config.output.format)?);
        *counts.entry(format!("{:?}", token.kind)).or_insert(0u64) += 1;
    }

    info!(
        "Stream complete: {} bytes, {} tokens {:?}",
        reader.offset(),
        counts.values().sum::<u64>(),
        counts
    );
    Ok(())
}
