//! SealDrop command-line client.
//!
//! Seals messages locally with a password, stores the envelope on a relay
//! and opens envelopes fetched by id. Plaintext and password never leave
//! this process.

mod args;
mod client;

use std::io::{self, Read};

use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use sealdrop_core::api::CreateSecretRequest;
use sealdrop_core::{time, Error as CodecError, ExpiryOption};

use args::{Cli, Command};
use client::RelayClient;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    match Cli::parse().command {
        Command::Seal {
            server,
            expiry,
            read_once,
            password,
            message,
        } => {
            let option = parse_expiry(&expiry)?;
            let message = message_or_stdin(message)?;
            let envelope = seal_message(&message, &password, &option)?;

            let client = RelayClient::new(&server);
            let id = client
                .create(&CreateSecretRequest {
                    encrypted_payload: envelope,
                    expiry_option: Some(option),
                    read_once,
                })
                .await?;

            println!("{id}");
            eprintln!("Share: {}", client.secret_url(&id));
        }
        Command::Open {
            server,
            password,
            id,
        } => {
            let secret = RelayClient::new(&server).fetch(&id).await?;
            if secret.metadata.read_once {
                eprintln!("This secret was read-once and is now gone from the relay.");
            }
            println!("{}", open_message(&secret.encrypted_payload, &password, time::now_millis())?);
        }
        Command::Encrypt {
            expiry,
            password,
            message,
        } => {
            let option = parse_expiry(&expiry)?;
            let message = message_or_stdin(message)?;
            println!("{}", seal_message(&message, &password, &option)?);
        }
        Command::Decrypt { password, envelope } => {
            let envelope = message_or_stdin(envelope)?;
            println!("{}", open_message(envelope.trim(), &password, time::now_millis())?);
        }
    }

    Ok(())
}

fn parse_expiry(value: &str) -> Result<ExpiryOption> {
    let option = ExpiryOption::parse(value);
    if !option.is_recognized() {
        let known: Vec<String> = ExpiryOption::KNOWN.iter().map(ToString::to_string).collect();
        bail!("Unknown expiry '{value}', expected one of: {}", known.join(", "));
    }
    Ok(option)
}

/// Encrypt with the sealed expiry set to now plus the option's duration.
fn seal_message(message: &str, password: &str, option: &ExpiryOption) -> Result<String> {
    let expiry = time::millis_from_now(option.duration_secs());
    sealdrop_core::encrypt(message, password, Some(expiry)).wrap_err("Failed to seal message")
}

/// Decrypt and refuse messages whose sealed expiry has passed.
fn open_message(envelope: &str, password: &str, now: i64) -> Result<String> {
    let record = match sealdrop_core::decrypt(envelope, password) {
        Ok(record) => record,
        Err(CodecError::AuthenticationFailed) => {
            bail!("Wrong password, or the secret was tampered with")
        }
        Err(e) => return Err(e).wrap_err("Failed to open secret"),
    };

    if record.is_expired_at(now) {
        bail!("This secret has expired");
    }
    Ok(record.message)
}

fn message_or_stdin(arg: Option<String>) -> Result<String> {
    if let Some(value) = arg {
        return Ok(value);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .wrap_err("Failed to read from stdin")?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_then_open() {
        let envelope = seal_message("meet at noon", "pw", &ExpiryOption::FiveMinutes).unwrap();
        let message = open_message(&envelope, "pw", time::now_millis()).unwrap();
        assert_eq!(message, "meet at noon");
    }

    #[test]
    fn test_open_rejects_expired() {
        let envelope = seal_message("late", "pw", &ExpiryOption::FiveMinutes).unwrap();
        let later = time::now_millis() + 6 * 60 * 1000;
        let err = open_message(&envelope, "pw", later).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_open_wrong_password() {
        let envelope = seal_message("x", "pw", &ExpiryOption::OneDay).unwrap();
        let err = open_message(&envelope, "nope", time::now_millis()).unwrap_err();
        assert!(err.to_string().contains("Wrong password"));
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("6hour").unwrap(), ExpiryOption::SixHours);
        assert!(parse_expiry("2weeks").is_err());
    }
}
