use colored::Colorize;
use oerc_server::{OercServer, SiteConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Config => cmd_config(config),
    }
}

/// Config file (or defaults) with `OERC_*` environment overrides applied.
fn load_config(cli: &Cli) -> anyhow::Result<SiteConfig> {
    Ok(SiteConfig::load(cli.config.as_deref())?)
}

fn cmd_serve(mut config: SiteConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    let storage = match &config.data_dir {
        Some(dir) => dir.display().to_string(),
        None => "in memory".into(),
    };
    println!("{} OERC site on {}", "✓".green().bold(), config.bind_addr.to_string().bold());
    println!("  Storage: {}", storage.cyan());
    println!("  Mail: {:?}", config.mail.provider);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = OercServer::new(config)?;
        server.serve().await
    })?;
    Ok(())
}

fn cmd_config(config: SiteConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
