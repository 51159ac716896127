use anyhow::Result;

pub fn handle_version() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");

    println!("{} v{}", NAME, VERSION);
    println!("Checks: {}", navprobe::scenarios::catalogue().len());
    println!("Report format: Allure 2 (result JSON + attachments)");
    Ok(())
}
