use anyhow::Result;

use navprobe::scenarios;

pub fn handle_list() -> Result<()> {
    for scenario in scenarios::catalogue() {
        println!(
            "{:<32} {:<9} {}",
            scenario.meta.name, scenario.meta.severity, scenario.meta.title
        );
    }
    Ok(())
}
