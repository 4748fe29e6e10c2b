use std::io::{self, BufRead, IsTerminal, Read};
use std::path::Path;

use dialoguer::{Input, Select};
use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use capsule_core::storage::ContentType;
use capsule_core::{parse_unlock_time, seal, SealRequest};

use crate::app::App;
use crate::cli::{Cli, CreateArgs};
use crate::errors::{classify, CliError};
use crate::passwords::new_capsule_password;
use crate::ui::{badge, kv, Badge, UiContext};

pub fn handle_create(cli: &Cli, args: &CreateArgs) -> anyhow::Result<()> {
    let ui = UiContext::from_env(false, cli.quiet);
    let interactive = !args.no_input && ui.is_interactive();
    let app = App::resolve(cli)?;
    let mut store = app.open_store()?;

    let title = match &args.title {
        Some(value) => value.clone(),
        None if interactive => prompt_line("Title")?,
        None => return Err(CliError::invalid_input("--title is required").into()),
    };
    if title.trim().is_empty() {
        return Err(CliError::invalid_input("Capsule title cannot be empty").into());
    }

    let unlock_input = match &args.unlock {
        Some(value) => value.clone(),
        None if interactive => prompt_line("Unlock in (e.g. 2h, 3d or 2030-01-01 09:00)")?,
        None => return Err(CliError::invalid_input("--unlock is required").into()),
    };
    let unlock_time = parse_unlock_time(&unlock_input).map_err(classify)?;

    let content_type = if interactive
        && args.title.is_none()
        && args.message.is_none()
        && args.file.is_none()
    {
        prompt_content_type(args.content_type.into())?
    } else {
        args.content_type.into()
    };

    let plaintext = read_content(args, content_type, interactive)?;
    let password = new_capsule_password(args.password_stdin, interactive)?;

    let id = seal(
        &mut store,
        &SealRequest {
            title: &title,
            unlock_time,
            content_type,
            plaintext: &plaintext,
            password: password.expose_secret(),
        },
        app.kdf_iterations(),
    )
    .map_err(classify)?;

    if ui.quiet {
        println!("{}", id);
    } else {
        ui.say(&badge(
            &ui,
            Badge::Locked,
            &format!("Sealed capsule #{} \"{}\"", id, title.trim()),
        ));
        ui.say(&kv(&ui, "Type", content_type.as_str()));
        ui.say(&kv(&ui, "Unlocks at", &unlock_time.to_rfc3339()));
    }
    Ok(())
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to read input: {}", e))
}

fn prompt_content_type(default: ContentType) -> anyhow::Result<ContentType> {
    let choices = [ContentType::Text, ContentType::Photo, ContentType::Video];
    let labels: Vec<&str> = choices.iter().map(|c| c.as_str()).collect();
    let default_index = choices.iter().position(|c| *c == default).unwrap_or(0);

    let selected = Select::new()
        .with_prompt("Type")
        .items(&labels)
        .default(default_index)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read input: {}", e))?;
    Ok(choices[selected])
}

/// Gather the plaintext: `--message`, `--file`, piped stdin or a prompt.
fn read_content(
    args: &CreateArgs,
    content_type: ContentType,
    interactive: bool,
) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    if let Some(message) = &args.message {
        if content_type != ContentType::Text {
            return Err(CliError::invalid_input(format!(
                "--message only applies to text capsules; use --file for {}",
                content_type
            ))
            .into());
        }
        return Ok(Zeroizing::new(message.clone().into_bytes()));
    }

    if let Some(path) = &args.file {
        return read_file(path);
    }

    match content_type {
        ContentType::Text => {
            if args.password_stdin {
                return Err(CliError::invalid_input(
                    "--password-stdin needs the message from --message or --file",
                )
                .into());
            }
            if !io::stdin().is_terminal() {
                let mut buffer = Zeroizing::new(Vec::new());
                io::stdin()
                    .read_to_end(&mut buffer)
                    .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
                return Ok(buffer);
            }
            if !interactive {
                return Err(CliError::invalid_input(
                    "No message provided; use --message, --file or pipe it via stdin",
                )
                .into());
            }
            eprintln!("Enter your message. Finish with a blank line:");
            read_until_blank_line(io::stdin().lock())
        }
        ContentType::Photo | ContentType::Video => {
            if !interactive {
                return Err(CliError::invalid_input(format!(
                    "--file is required for {} capsules",
                    content_type
                ))
                .into());
            }
            let path = prompt_line(&format!("Path to {} file", content_type))?;
            read_file(Path::new(path.trim()))
        }
    }
}

fn read_file(path: &Path) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    if !path.is_file() {
        return Err(CliError::not_found(
            format!("File not found: {}", path.display()),
            "Hint: Check the path passed to --file.",
        )
        .into());
    }
    std::fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

/// Read lines until an empty one (or EOF), joined with `\n`.
fn read_until_blank_line<R: BufRead>(reader: R) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    let mut lines: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| anyhow::anyhow!("Failed to read message: {}", e))?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    let text = Zeroizing::new(lines.join("\n"));
    Ok(Zeroizing::new(text.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_blank_line() {
        let input = b"first line\nsecond line\n\nignored\n";
        let text = read_until_blank_line(&input[..]).unwrap();
        assert_eq!(text.as_slice(), b"first line\nsecond line");
    }

    #[test]
    fn test_read_until_eof() {
        let text = read_until_blank_line(&b"only line"[..]).unwrap();
        assert_eq!(text.as_slice(), b"only line");
    }

    #[test]
    fn test_read_file_missing_is_not_found() {
        let err = read_file(Path::new("/definitely/not/here.jpg")).unwrap_err();
        assert_eq!(
            crate::errors::exit_code_for(&err),
            crate::constants::exit_codes::NOT_FOUND
        );
    }
}
