//! Knowledge base command implementations

use anyhow::Result;
use niti_core::WisdomAdvisor;

use super::truncate;

/// List all principles in knowledge base order
pub fn cmd_principles(advisor: &WisdomAdvisor, json: bool) -> Result<()> {
    let knowledge = advisor.knowledge();

    if json {
        println!("{}", serde_json::to_string_pretty(knowledge.principles())?);
        return Ok(());
    }

    println!("📜 Principles ({}):\n", knowledge.principles().len());
    println!("{:<26} {:<36}  {}", "ID", "NAME", "SCENARIOS");
    println!("{}", "-".repeat(90));

    for principle in knowledge.principles() {
        let scenarios: Vec<&str> = principle
            .applicable_scenarios
            .iter()
            .map(|s| s.as_str())
            .collect();
        println!(
            "{:<26} {:<36}  {}",
            principle.id,
            truncate(&principle.name, 36),
            scenarios.join(", ")
        );
    }

    if let Some(path) = knowledge.source() {
        println!();
        println!("Loaded from: {}", path.display());
    }

    Ok(())
}
