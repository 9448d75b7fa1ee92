//! Simulation report generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::distribution::{Distribution, JointDistribution, SymbolStats};
use crate::core::constants::REPORT_BAR_PERCENT_PER_BLOCK;
use crate::dice::SymbolFamily;

/// One symbol family's outcome distributions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyDistributions {
    pub filled: Distribution,
    pub hollow: Distribution,
    /// Filled plus hollow.
    pub combined: Distribution,
}

/// A family crossed with specials, in the three symbol variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointVariants {
    pub filled: JointDistribution,
    pub hollow: JointDistribution,
    pub combined: JointDistribution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RerollStats {
    /// Trials where the whole pool was rerolled.
    pub full_rerolls: u32,
    pub full_reroll_rate: f64,
    /// Dice rerolled by the selective pass, over all trials.
    pub dice_rerolled: u64,
    pub avg_dice_rerolled: f64,
}

/// Mean per-roll counts of the three filled symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub hits: f64,
    pub blocks: f64,
    pub specials: f64,
}

/// Aggregated results of a single-pool analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub trials: u32,
    pub seed: Option<u64>,
    pub timestamp: DateTime<Utc>,

    pub hits: FamilyDistributions,
    pub blocks: FamilyDistributions,
    pub specials: FamilyDistributions,

    pub hit_special: JointVariants,
    pub block_special: JointVariants,

    // Filled symbols only
    pub hit_stats: SymbolStats,
    pub block_stats: SymbolStats,
    pub special_stats: SymbolStats,

    // Before rerolls, effects and pipeline steps
    pub theoretical: Expectation,
    pub rerolls: RerollStats,
}

/// Aggregated results of attacker-versus-defender resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    pub trials: u32,
    pub seed: Option<u64>,
    pub timestamp: DateTime<Utc>,

    /// Wounds dealt by the attacker.
    pub wounds_attacker: Distribution,
    /// Wounds dealt by the defender.
    pub wounds_defender: Distribution,
    pub attacker_specials: Distribution,
    pub defender_specials: Distribution,

    pub attacker: Expectation,
    pub defender: Expectation,
    pub expected_wounds_attacker: f64,
    pub expected_wounds_defender: f64,

    // Percentages, from the attacker's side
    pub win_rate: f64,
    pub tie_rate: f64,
    pub loss_rate: f64,
}

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";

fn section(title: &str) -> String {
    let dashes = 63usize.saturating_sub(title.chars().count() + 4);
    format!("── {} {}\n", title, "─".repeat(dashes))
}

fn bar(percent: f64) -> String {
    "█".repeat((percent / REPORT_BAR_PERCENT_PER_BLOCK) as usize)
}

fn push_distribution(report: &mut String, dist: &Distribution) {
    if dist.is_empty() {
        report.push_str("  (no trials)\n");
        return;
    }
    report.push_str("  Value   Exactly   At least\n");
    for (value, pct) in dist.iter() {
        report.push_str(&format!(
            "  {:5}   {:>6.2}%   {:>6.2}%  {}\n",
            value,
            pct,
            dist.at_least(value),
            bar(pct)
        ));
    }
}

fn push_joint(report: &mut String, title: &str, joint: &JointDistribution) {
    report.push_str(&format!("  {}\n", title));
    for cell in joint.cells().filter(|c| c.percent >= 1.0) {
        report.push_str(&format!("    ({:2}, {:2})  {:>6.2}%\n", cell.x, cell.y, cell.percent));
    }
}

impl AnalysisReport {
    pub fn family(&self, family: SymbolFamily) -> &FamilyDistributions {
        match family {
            SymbolFamily::Hit => &self.hits,
            SymbolFamily::Block => &self.blocks,
            SymbolFamily::Special => &self.specials,
        }
    }

    pub fn stats(&self, family: SymbolFamily) -> SymbolStats {
        match family {
            SymbolFamily::Hit => self.hit_stats,
            SymbolFamily::Block => self.block_stats,
            SymbolFamily::Special => self.special_stats,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str(RULE);
        report.push_str("                    DICE POOL ANALYSIS\n");
        report.push_str(RULE);
        report.push('\n');

        report.push_str(&format!("Trials: {}", self.trials));
        if let Some(seed) = self.seed {
            report.push_str(&format!("  Seed: {}", seed));
        }
        report.push_str(&format!("  At: {}\n\n", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));

        report.push_str(&section("EXPECTATION"));
        report.push_str("  Symbol     Mean    Std Dev   Theoretical\n");
        let theoretical = [self.theoretical.hits, self.theoretical.blocks, self.theoretical.specials];
        for (family, expected) in SymbolFamily::ALL.into_iter().zip(theoretical) {
            let stats = self.stats(family);
            report.push_str(&format!(
                "  {:8} {:6.2}   {:6.2}     {:6.2}\n",
                family.name(),
                stats.mean,
                stats.std_dev,
                expected
            ));
        }
        report.push('\n');

        for family in SymbolFamily::ALL {
            let dists = self.family(family);
            report.push_str(&section(&format!("{} (FILLED)", family.name().to_uppercase())));
            push_distribution(&mut report, &dists.filled);
            if !dists.hollow.is_empty() && dists.hollow.max_value() != Some(0) {
                report.push_str(&section(&format!("{} (FILLED + HOLLOW)", family.name().to_uppercase())));
                push_distribution(&mut report, &dists.combined);
            }
            report.push('\n');
        }

        report.push_str(&section("JOINT (>= 1%)"));
        push_joint(&mut report, "Hits x Specials", &self.hit_special.filled);
        push_joint(&mut report, "Blocks x Specials", &self.block_special.filled);
        report.push('\n');

        if self.rerolls.full_rerolls > 0 || self.rerolls.dice_rerolled > 0 {
            report.push_str(&section("REROLLS"));
            report.push_str(&format!(
                "  Full rerolls:    {} ({:.1}%)\n",
                self.rerolls.full_rerolls, self.rerolls.full_reroll_rate
            ));
            report.push_str(&format!(
                "  Dice rerolled:   {} ({:.2} per roll)\n\n",
                self.rerolls.dice_rerolled, self.rerolls.avg_dice_rerolled
            ));
        }

        report.push_str(RULE);
        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl CombatReport {
    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str(RULE);
        report.push_str("                    COMBAT ANALYSIS\n");
        report.push_str(RULE);
        report.push('\n');

        report.push_str(&format!("Trials: {}", self.trials));
        if let Some(seed) = self.seed {
            report.push_str(&format!("  Seed: {}", seed));
        }
        report.push_str(&format!("  At: {}\n\n", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));

        report.push_str(&section("OUTCOME"));
        report.push_str(&format!("  Attacker wins: {:>6.2}% {}\n", self.win_rate, bar(self.win_rate)));
        report.push_str(&format!("  Tie:           {:>6.2}% {}\n", self.tie_rate, bar(self.tie_rate)));
        report.push_str(&format!("  Defender wins: {:>6.2}% {}\n\n", self.loss_rate, bar(self.loss_rate)));

        report.push_str(&section("EXPECTATION"));
        report.push_str("  Side        Hits   Blocks  Specials  Wounds dealt\n");
        report.push_str(&format!(
            "  Attacker  {:6.2}   {:6.2}    {:6.2}        {:6.2}\n",
            self.attacker.hits, self.attacker.blocks, self.attacker.specials, self.expected_wounds_attacker
        ));
        report.push_str(&format!(
            "  Defender  {:6.2}   {:6.2}    {:6.2}        {:6.2}\n\n",
            self.defender.hits, self.defender.blocks, self.defender.specials, self.expected_wounds_defender
        ));

        report.push_str(&section("WOUNDS DEALT BY ATTACKER"));
        push_distribution(&mut report, &self.wounds_attacker);
        report.push('\n');
        report.push_str(&section("WOUNDS DEALT BY DEFENDER"));
        push_distribution(&mut report, &self.wounds_defender);
        report.push('\n');
        report.push_str(&section("ATTACKER SPECIALS"));
        push_distribution(&mut report, &self.attacker_specials);
        report.push('\n');
        report.push_str(&section("DEFENDER SPECIALS"));
        push_distribution(&mut report, &self.defender_specials);
        report.push('\n');

        report.push_str(RULE);
        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
