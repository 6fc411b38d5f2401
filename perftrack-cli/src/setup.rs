use anyhow::Result;
use perftrack_core::time::parse_tz;
use std::io::{self, Write};

use crate::config::{config_path, init_config};
use crate::state::{Profile, profile_path, read_profile, write_profile};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn prompt_default(label: &str, default: &str) -> Result<String> {
    let s = prompt(&format!("{label} [{default}]"))?;
    Ok(if s.is_empty() { default.to_string() } else { s })
}

pub fn run_setup() -> Result<()> {
    println!("perftrack setup\n");

    // Re-running setup keeps the user id so existing records stay visible.
    let mut profile = read_profile()?.unwrap_or_else(|| Profile::new(""));

    profile.name = prompt_default("Your name", &profile.name)?;
    let department = prompt_default("Department (optional)", profile.department.as_deref().unwrap_or(""))?;
    profile.department = Some(department).filter(|d| !d.is_empty());

    loop {
        let tz = prompt_default("Timezone (IANA)", &profile.timezone)?;
        match parse_tz(&tz) {
            Ok(_) => {
                profile.timezone = tz;
                break;
            }
            Err(e) => println!("{e}"),
        }
    }

    write_profile(&profile)?;
    println!("\nWrote {}", profile_path()?.display());
    if !config_path()?.exists() {
        init_config()?;
    }

    println!("\nNext recommended steps:");
    println!("- perftrack import --file tasks.json   (bring in an existing task export)");
    println!("- perftrack achievement add --title ... --description ...");
    println!("- perftrack report --type monthly");

    Ok(())
}
