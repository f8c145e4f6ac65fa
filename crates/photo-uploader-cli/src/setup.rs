//! Interactive first-run prompts for the `auth` command.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};

use photo_uploader_core::CredentialRecord;

/// Ask for every record field. The ID token is filled in by authentication.
pub fn prompt_record() -> Result<CredentialRecord> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let client_id = prompt_required(&mut input, "Enter Cognito Client ID: ")?;
    let username = prompt_required(&mut input, "Enter Cognito Username: ")?;
    let password = rpassword::prompt_password("Enter Cognito Password: ")
        .context("Failed to read password")?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    let api_endpoint = prompt_required(&mut input, "Enter API Endpoint: ")?;
    let cloudfront_domain = prompt_line(
        &mut input,
        "Enter CloudFront Domain (eg. abcdef.cloudfront.net, blank to skip): ",
    )?;

    Ok(CredentialRecord {
        client_id,
        username,
        password,
        api_endpoint,
        id_token: String::new(),
        cloudfront_domain: Some(cloudfront_domain).filter(|d| !d.is_empty()),
    })
}

fn prompt_line(input: &mut impl BufRead, prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Err(anyhow!("Input ended before setup was complete"));
    }
    Ok(line.trim().to_string())
}

fn prompt_required(input: &mut impl BufRead, prompt: &str) -> Result<String> {
    let value = prompt_line(input, prompt)?;
    if value.is_empty() {
        bail!("{} must not be empty", prompt.trim_start_matches("Enter ").trim_end_matches(": "));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_line_trims_input() {
        let mut input = Cursor::new("  client-123 \n");
        assert_eq!(prompt_line(&mut input, "> ").unwrap(), "client-123");
    }

    #[test]
    fn test_prompt_required_rejects_blank() {
        let mut input = Cursor::new("\n");
        let err = prompt_required(&mut input, "Enter API Endpoint: ").unwrap_err();
        assert_eq!(err.to_string(), "API Endpoint must not be empty");
    }

    #[test]
    fn test_prompt_line_eof_is_error() {
        let mut input = Cursor::new("");
        assert!(prompt_line(&mut input, "> ").is_err());
    }
}
