//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{FigmaApi, FigmaClient, parse_figma_url};
use crate::config::{Config, TokenKind};
use crate::error::Result;

/// Run the init command
///
/// Prompts for a token and a default file, checks both against the API, and
/// saves the config. Existing cache settings are preserved.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to figcache!".bold().green());
    println!("Let's set up access to your Figma file.\n");

    let theme = ColorfulTheme::default();

    let token: String = Password::with_theme(&theme)
        .with_prompt("Enter your Figma access token")
        .interact()?;

    let kinds = ["Personal access token", "OAuth token"];
    let token_kind = match Select::with_theme(&theme)
        .with_prompt("Token type")
        .items(&kinds)
        .default(0)
        .interact()?
    {
        1 => TokenKind::Oauth,
        _ => TokenKind::Personal,
    };

    let file_input: String = Input::with_theme(&theme)
        .with_prompt("Default file (key or Figma URL)")
        .interact_text()?;
    let file_key = if file_input.trim().starts_with("http") {
        parse_figma_url(&file_input)?.file_key
    } else {
        file_input.trim().to_string()
    };

    println!("\n{}", "Checking access...".cyan());
    let client = FigmaClient::with_host(token.clone(), token_kind, opts.api_host.clone())?;
    let file = client.get_file(&file_key).await?;
    println!("{} Found file: {}", "✓".green(), file.name.bold());

    let mut config = Config::load_or_default_at(opts.config_ref())?;
    config.token = Some(token);
    config.token_kind = token_kind;
    config.file_key = Some(file_key);
    if opts.api_host.is_some() {
        config.api_host = opts.api_host.clone();
    }
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "figcache status".cyan());
    println!("  {} - Show file pages", "figcache file".cyan());
    println!("  {} - Inspect a node", "figcache node get <NODE>".cyan());

    Ok(())
}
