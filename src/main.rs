use anyhow::Result;
use clap::Parser;
mod auth;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bcunlock")]
#[command(
    version,
    about = "Decrypt a Boxcryptor-encrypted file offline, using a .bckey export and the account password."
)]
struct Cli {
    /// Path to the .bckey account key export
    key_file: PathBuf,

    /// Path to the encrypted .bc file
    encrypted_file: PathBuf,

    /// Path for the decrypted output (derived from the input when omitted;
    /// an existing file is never overwritten)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let password = auth::read_password()?;

    println!("decrypting '{}'", args.encrypted_file.display());

    let written = bcunlock::decrypt_file(
        &args.key_file,
        &args.encrypted_file,
        password,
        args.output.as_deref(),
    )?;

    println!(
        "successfully decrypted '{}', output: '{}'",
        args.encrypted_file.display(),
        written.display()
    );

    Ok(())
}
