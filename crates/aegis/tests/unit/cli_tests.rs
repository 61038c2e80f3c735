//! CLI tests: argument parsing and the configuration check

use aegis::cli::{Cli, Command, cli_context, run};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_parse_login_with_config() {
    let cli = Cli::try_parse_from([
        "aegis",
        "login",
        "--username",
        "alice",
        "-p",
        "secret",
        "--config",
        "/etc/aegis/aegis.toml",
    ])
    .unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("/etc/aegis/aegis.toml")));
    assert_eq!(
        cli.command,
        Command::Login {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    );
}

#[test]
fn test_parse_config_before_subcommand() {
    let cli = Cli::try_parse_from(["aegis", "-c", "local.toml", "health"]).unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("local.toml")));
    assert_eq!(cli.command, Command::Health);
}

#[test]
fn test_parse_check_config_without_path() {
    let cli = Cli::try_parse_from(["aegis", "check-config"]).unwrap();

    assert_eq!(cli.config, None);
    assert_eq!(cli.command, Command::CheckConfig);
}

#[test]
fn test_login_requires_credentials() {
    assert!(Cli::try_parse_from(["aegis", "login", "--username", "alice"]).is_err());
    assert!(Cli::try_parse_from(["aegis"]).is_err());
}

#[test]
fn test_cli_context_identifies_the_client() {
    let context = cli_context();

    assert_eq!(context.ip_address.as_deref(), Some("127.0.0.1"));
    let agent = context.user_agent.as_deref().unwrap();
    assert!(agent.starts_with("aegis-cli/"));
    assert_eq!(context.headers.get("user-agent").map(String::as_str), Some(agent));
}

#[tokio::test]
async fn test_check_config_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aegis.toml");
    std::fs::write(
        &path,
        r#"
[[providers]]
name = "accounts"
kind = "local"
"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from(["aegis", "check-config", "--config", path.to_str().unwrap()])
        .unwrap();
    run(cli).await.unwrap();
}

#[tokio::test]
async fn test_check_config_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aegis.toml");
    std::fs::write(&path, "[health]\ncheck_interval_ms = 100\ntimeout_ms = 500\n").unwrap();

    let cli = Cli::try_parse_from(["aegis", "check-config", "--config", path.to_str().unwrap()])
        .unwrap();
    let err = run(cli).await.unwrap_err();
    assert!(format!("{err:#}").contains("must be smaller than the check interval"));
}
