use std::fmt::Write;

use super::DashboardSummary;
use crate::models::Opportunity;
use crate::sources::catalog::ChainDatasets;

/// "████████░░" for 0.8
pub fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence.clamp(0.0, 1.0) * 10.0) as usize).min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn chain_emoji(chain: &str) -> &'static str {
    match chain {
        "Ethereum" => "⚡",
        "Base" => "🔵",
        _ => "🌉",
    }
}

fn profit_emoji(profit_potential: f64) -> &'static str {
    if profit_potential > 0.5 {
        "🚀"
    } else if profit_potential > 0.1 {
        "💰"
    } else {
        "📈"
    }
}

/// Console dashboard: the top `top_n` opportunities, then the summary block.
pub fn render_dashboard(opportunities: &[Opportunity], summary: &DashboardSummary, top_n: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "🎯 ETH-BASE ALPHA HUNTER 🎯");
    let _ = writeln!(out, "{}", rule);

    if opportunities.is_empty() {
        let _ = writeln!(out, "🔍 No opportunities found. Markets are efficient right now...");
        return out;
    }

    let _ = writeln!(out, "📊 OPPORTUNITY BREAKDOWN:");
    let _ = writeln!(out, "   ⚡ Ethereum: {} opportunities", summary.ethereum);
    let _ = writeln!(out, "   🔵 Base: {} opportunities", summary.base);
    let _ = writeln!(out, "   🌉 Cross-Chain: {} opportunities", summary.cross_chain);
    let _ = writeln!(out, "\n🔥 TOP OPPORTUNITIES:");

    for (i, opp) in opportunities.iter().take(top_n).enumerate() {
        let _ = writeln!(
            out,
            "\n{:2}. {} {} {}",
            i + 1,
            opp.kind,
            chain_emoji(&opp.chain),
            profit_emoji(opp.profit_potential)
        );
        let _ = writeln!(out, "    🎯 Chain: {}", opp.chain);
        let _ = writeln!(
            out,
            "    📊 Confidence: {} {:.1}%",
            confidence_bar(opp.confidence),
            opp.confidence * 100.0
        );
        let _ = writeln!(out, "    💵 Profit: {:.1}%", opp.profit_potential * 100.0);
        let _ = writeln!(out, "    📝 {}", opp.description);
        let _ = writeln!(out, "    ⚡ {}", opp.action);
    }

    if opportunities.len() > top_n {
        let _ = writeln!(out, "\n   ... {} more", opportunities.len() - top_n);
    }

    let _ = writeln!(out, "\n💎 SUMMARY:");
    let _ = writeln!(out, "   🎯 Total Opportunities: {}", summary.total_opportunities);
    let _ = writeln!(out, "   📈 Average Confidence: {:.1}%", summary.avg_confidence * 100.0);
    let _ = writeln!(
        out,
        "   💰 Est. Profit (on ${:.0}): ${:.0}",
        summary.position_usd, summary.est_profit_usd
    );
    let _ = writeln!(out, "   ✅ High Confidence: {}", summary.high_confidence);

    out
}

/// Dataset listing for the `datasets` command and the hunt banner.
pub fn render_datasets(datasets: &ChainDatasets) -> String {
    let mut out = String::new();
    let (eth_protocols, base_protocols) = datasets.protocol_names(5);

    let _ = writeln!(out, "✅ Ethereum Mainnet: {} datasets", datasets.ethereum.len());
    let _ = writeln!(out, "✅ Base Mainnet: {} datasets", datasets.base.len());
    if datasets.other > 0 {
        let _ = writeln!(out, "   ({} datasets on other chains ignored)", datasets.other);
    }
    if !eth_protocols.is_empty() {
        let _ = writeln!(out, "🦄 ETH Protocols: {}", eth_protocols.join(", "));
    }
    if !base_protocols.is_empty() {
        let _ = writeln!(out, "🔵 Base Protocols: {}", base_protocols.join(", "));
    }

    out
}
