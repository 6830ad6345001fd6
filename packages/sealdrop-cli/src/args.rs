//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Relay used when neither `--server` nor `SEALDROP_SERVER` is given.
pub const DEFAULT_SERVER: &str = "http://localhost:8080";

#[derive(Debug, Parser)]
#[command(name = "sealdrop", version, about = "Share a password-sealed secret that burns after reading")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a message locally and upload the envelope
    Seal {
        /// Relay base URL
        #[arg(long, default_value = DEFAULT_SERVER, env = "SEALDROP_SERVER")]
        server: String,

        /// Lifetime: 5min, 30min, 1hour, 6hour or 1day
        #[arg(short, long, default_value = "1day")]
        expiry: String,

        /// Burn the secret after the first fetch
        #[arg(long)]
        read_once: bool,

        /// Password the receiver will need
        #[arg(short, long, env = "SEALDROP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Message to seal; read from stdin when omitted
        message: Option<String>,
    },

    /// Download an envelope and decrypt it
    Open {
        /// Relay base URL
        #[arg(long, default_value = DEFAULT_SERVER, env = "SEALDROP_SERVER")]
        server: String,

        #[arg(short, long, env = "SEALDROP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Secret id printed by `seal`
        id: String,
    },

    /// Encrypt offline and print the envelope
    Encrypt {
        #[arg(short, long, default_value = "1day")]
        expiry: String,

        #[arg(short, long, env = "SEALDROP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Message to seal; read from stdin when omitted
        message: Option<String>,
    },

    /// Decrypt an envelope offline and print the message
    Decrypt {
        #[arg(short, long, env = "SEALDROP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Envelope string; read from stdin when omitted
        envelope: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_args() {
        let cli = Cli::try_parse_from([
            "sealdrop",
            "seal",
            "--server",
            "https://relay.example",
            "--expiry",
            "5min",
            "--read-once",
            "-p",
            "hunter2",
            "hello",
        ])
        .unwrap();

        match cli.command {
            Command::Seal {
                server,
                expiry,
                read_once,
                password,
                message,
            } => {
                assert_eq!(server, "https://relay.example");
                assert_eq!(expiry, "5min");
                assert!(read_once);
                assert_eq!(password, "hunter2");
                assert_eq!(message.as_deref(), Some("hello"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_open_requires_id() {
        assert!(Cli::try_parse_from(["sealdrop", "open", "-p", "pw"]).is_err());
    }

    #[test]
    fn test_decrypt_envelope_optional() {
        let cli = Cli::try_parse_from(["sealdrop", "decrypt", "-p", "pw"]).unwrap();
        assert!(matches!(cli.command, Command::Decrypt { envelope: None, .. }));
    }
}
