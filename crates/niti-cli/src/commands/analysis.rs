//! Pipeline command implementations (context, wisdom, prompt)

use anyhow::Result;
use niti_core::{FinancialContext, NitiConfig, RankedWisdom, WisdomAdvisor, WisdomResult};

use super::analyze;
use crate::cli::DataArgs;

pub fn cmd_context(advisor: &WisdomAdvisor, data: &DataArgs, json: bool) -> Result<()> {
    let context = analyze(advisor, data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        print!("{}", format_context(&context, advisor.config()));
    }

    Ok(())
}

pub fn cmd_wisdom(advisor: &WisdomAdvisor, query: &str, data: &DataArgs, json: bool) -> Result<()> {
    let context = analyze(advisor, data)?;
    let wisdom = advisor.find_relevant_wisdom(&context, query);

    if json {
        let output = serde_json::json!({
            "context": context,
            "wisdom": wisdom,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_wisdom(&wisdom));
    }

    Ok(())
}

pub fn cmd_prompt(advisor: &WisdomAdvisor, query: &str, data: &DataArgs, json: bool) -> Result<()> {
    let context = analyze(advisor, data)?;
    let wisdom = advisor.find_relevant_wisdom(&context, query);

    if json {
        let messages = advisor.assembler().build_messages(query, &context, &wisdom);
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        println!("{}", advisor.build_prompt(query, &context, &wisdom));
    }

    Ok(())
}

/// Human-readable financial context
pub fn format_context(context: &FinancialContext, config: &NitiConfig) -> String {
    let patterns = &context.spending_patterns;
    let mut out = String::new();

    out.push_str("📊 Financial Context\n\n");
    out.push_str(&format!(
        "   Situation:         {}\n",
        context.current_situation.label()
    ));
    out.push_str(&format!(
        "   This month:        {}\n",
        config.money(patterns.monthly_expenses)
    ));
    out.push_str(&format!(
        "   Monthly average:   {}\n",
        config.money(patterns.monthly_average)
    ));
    out.push_str(&format!(
        "   Estimated income:  {}\n",
        config.money(patterns.estimated_income)
    ));
    if let Some(income) = patterns.monthly_income {
        out.push_str(&format!("   Monthly income:    {}\n", config.money(income)));
    }
    out.push_str(&format!(
        "   Savings rate:      {:.1}%\n",
        patterns.savings_rate * 100.0
    ));
    out.push_str(&format!("   Trend:             {}\n", patterns.spending_trend));
    if !patterns.top_categories.is_empty() {
        out.push_str(&format!(
            "   Top categories:    {}\n",
            patterns.top_categories.join(", ")
        ));
    }
    out.push_str(&format!(
        "   Goals:             {}\n",
        context.financial_goals.join(", ")
    ));
    out.push_str(&format!("   Risk profile:      {}\n", context.risk_profile));
    out.push_str(&format!("   Life stage:        {}\n", context.life_stage));

    out
}

/// Human-readable wisdom result
///
/// The personalized steps are grouped by the action plan's time horizons,
/// which partition the same advice list in order.
pub fn format_wisdom(wisdom: &WisdomResult) -> String {
    let primary = &wisdom.primary;
    let mut out = String::new();

    out.push_str(&format!(
        "🪔 {} (relevance {:.2})\n",
        primary.principle.name, primary.relevance_score
    ));
    out.push_str(&format!("   \"{}\"\n\n", primary.principle.short_text));
    out.push_str(&format!("{}\n\n", wisdom.guidance_text));

    let steps = &primary.actionable_steps;
    let plan = &wisdom.action_plan;
    let immediate_end = plan.immediate.len().min(steps.len());
    let short_end = (immediate_end + plan.short_term.len()).min(steps.len());
    let horizons = [
        ("Now", &steps[..immediate_end]),
        ("Next few months", &steps[immediate_end..short_end]),
        ("Long term", &steps[short_end..]),
    ];

    out.push_str("Action plan:\n");
    for (label, group) in horizons {
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("  {}:\n", label));
        for step in group {
            out.push_str(&format!("    - {}\n", step));
        }
    }

    if !wisdom.supporting.is_empty() {
        out.push_str("\nSupporting principles:\n");
        for w in &wisdom.supporting {
            out.push_str(&format_supporting(w));
        }
    }

    out.push_str(&format!("\nCultural note: {}\n", wisdom.cultural_note));
    if !wisdom.modern_parallels.is_empty() {
        out.push_str("Modern parallels:\n");
        for parallel in &wisdom.modern_parallels {
            out.push_str(&format!("  - {}\n", parallel));
        }
    }

    out
}

fn format_supporting(w: &RankedWisdom) -> String {
    format!(
        "  - {} ({:.2}): \"{}\"\n",
        w.principle.name, w.relevance_score, w.principle.short_text
    )
}
